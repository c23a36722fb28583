use std::sync::Arc;

use crate::arrays::batch::Batch;
use crate::arrays::sort::key_encode::SortKeys;

/// A logically sorted batch.
///
/// This doesn't store a sorted batch itself, but instead stores row indices
/// which would result in a sorted batch.
///
/// Note that constructing this will not check that the indices actually lead
/// to a sorted batch.
#[derive(Debug)]
pub struct IndexSortedBatch {
    /// Indices of rows in sort order.
    pub sort_indices: Vec<usize>,

    /// Unsorted keys for the batch.
    pub keys: SortKeys,

    /// The original unsorted batch.
    pub batch: Batch,
}

impl IndexSortedBatch {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn into_batch_and_iter(self) -> (Batch, SortedIndicesIter) {
        let iter = SortedIndicesIter {
            indices: self.sort_indices,
            idx: 0,
            keys: Arc::new(self.keys),
        };

        (self.batch, iter)
    }
}

/// Iterator over a batch's row indices in sorted order.
#[derive(Debug)]
pub struct SortedIndicesIter {
    indices: Vec<usize>,
    idx: usize,
    keys: Arc<SortKeys>,
}

impl SortedIndicesIter {
    /// Get a reference to the encoded keys for the batch being iterated.
    pub fn keys(&self) -> &Arc<SortKeys> {
        &self.keys
    }
}

impl Iterator for SortedIndicesIter {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.indices.len() {
            return None;
        }

        let row_idx = self.indices[self.idx];
        self.idx += 1;

        Some(row_idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.indices.len() - self.idx;
        (len, Some(len))
    }
}
