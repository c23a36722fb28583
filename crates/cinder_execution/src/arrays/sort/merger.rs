use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;

use cinder_error::{CinderError, Result};

use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::compute::interleave::interleave;
use crate::arrays::sort::key_encode::{SortKey, SortKeys};
use crate::arrays::sort::sorted_batch::SortedIndicesIter;

/// A reference to a row in one of the merger's inputs.
///
/// `Ord` compares the encoded key first, then the input index. Inputs are
/// added in the order their rows were originally produced, so breaking key
/// ties by input index keeps the merge stable with respect to the original
/// row order.
pub struct RowReference {
    /// Index of the input this row came from.
    input_idx: usize,

    /// Index of the row inside the input's batch.
    row_idx: usize,

    /// Reference to the encoded keys for the input's batch.
    keys: Arc<SortKeys>,
}

impl RowReference {
    fn key(&self) -> SortKey<'_> {
        self.keys.key(self.row_idx).expect("row to exist")
    }
}

impl PartialEq for RowReference {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.input_idx == other.input_idx
    }
}

impl Eq for RowReference {}

impl PartialOrd for RowReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.input_idx.cmp(&other.input_idx))
    }
}

impl fmt::Debug for RowReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowReference")
            .field("input_idx", &self.input_idx)
            .field("row_idx", &self.row_idx)
            .finish()
    }
}

#[derive(Debug)]
struct MergerInput {
    batch: Batch,
    iter: SortedIndicesIter,
}

/// K-way merger over index-sorted batches.
///
/// All inputs are fully materialized up front; merging pulls one row at a
/// time from whichever input currently holds the smallest key.
#[derive(Debug)]
pub struct KWayMerger {
    inputs: Vec<MergerInput>,
    heap: BinaryHeap<Reverse<RowReference>>,
}

impl KWayMerger {
    pub fn try_new(inputs: impl IntoIterator<Item = (Batch, SortedIndicesIter)>) -> Result<Self> {
        // Filter out inputs without any rows.
        let mut merger_inputs = Vec::new();
        for (batch, iter) in inputs {
            if batch.num_rows() == 0 {
                continue;
            }
            merger_inputs.push(MergerInput { batch, iter });
        }

        let mut heap = BinaryHeap::with_capacity(merger_inputs.len());
        for (input_idx, input) in merger_inputs.iter_mut().enumerate() {
            let keys = input.iter.keys().clone();
            let row_idx = input
                .iter
                .next()
                .ok_or_else(|| CinderError::new("Non-empty merge input produced no rows"))?;
            heap.push(Reverse(RowReference {
                input_idx,
                row_idx,
                keys,
            }));
        }

        Ok(KWayMerger {
            inputs: merger_inputs,
            heap,
        })
    }

    /// Merge up to `max_rows` rows into a single batch.
    ///
    /// Returns None once all inputs are exhausted.
    pub fn try_merge(&mut self, max_rows: usize) -> Result<Option<Batch>> {
        if self.heap.is_empty() {
            return Ok(None);
        }

        let mut indices = Vec::with_capacity(max_rows);
        while indices.len() < max_rows {
            let reference = match self.heap.pop() {
                Some(Reverse(reference)) => reference,
                None => break,
            };

            indices.push((reference.input_idx, reference.row_idx));

            let input = &mut self.inputs[reference.input_idx];
            if let Some(row_idx) = input.iter.next() {
                self.heap.push(Reverse(RowReference {
                    input_idx: reference.input_idx,
                    row_idx,
                    keys: reference.keys,
                }));
            }
        }

        let num_columns = self.inputs[0].batch.num_columns();
        let mut arrays = Vec::with_capacity(num_columns);
        for col_idx in 0..num_columns {
            let cols: Vec<&Array> = self
                .inputs
                .iter()
                .map(|input| input.batch.column(col_idx).expect("column to exist"))
                .collect();
            arrays.push(interleave(&cols, &indices)?);
        }

        Ok(Some(Batch::try_new(arrays)?))
    }
}
