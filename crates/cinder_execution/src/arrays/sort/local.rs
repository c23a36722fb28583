use cinder_error::{CinderError, Result};

use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::sort::key_encode::sort_key_encode;
use crate::arrays::sort::sort_layout::SortLayout;
use crate::arrays::sort::sorted_batch::IndexSortedBatch;

/// Local sink stage of a sort.
///
/// Accepts (key, payload) chunks and accumulates per-chunk sorted runs.
/// Chunks are sorted individually as they arrive; runs are not ordered
/// relative to each other until merged through the global state.
#[derive(Debug)]
pub struct LocalSortState {
    layout: SortLayout,

    /// Chunks that we sorted the row indices for.
    batches: Vec<IndexSortedBatch>,
}

impl LocalSortState {
    pub fn new(layout: SortLayout) -> Self {
        LocalSortState {
            layout,
            batches: Vec::new(),
        }
    }

    pub fn layout(&self) -> &SortLayout {
        &self.layout
    }

    pub fn row_count(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// Sink one chunk of key columns plus its payload batch.
    ///
    /// Key columns and payload must have matching row counts. The chunk's
    /// indices are sorted on the encoded keys immediately; the sort is
    /// stable, so rows with equal keys keep their order within the chunk.
    pub fn sink_batch(&mut self, keys: &[&Array], payload: Batch) -> Result<()> {
        let num_rows = payload.num_rows();
        for key in keys {
            if key.len() != num_rows {
                return Err(CinderError::new(format!(
                    "Key column has {} rows, expected {num_rows} to match the payload",
                    key.len()
                )));
            }
        }

        let keys = sort_key_encode(&self.layout, keys, num_rows)?;

        let mut sort_indices: Vec<_> = (0..num_rows).collect();
        sort_indices.sort_by_key(|idx| keys.key(*idx).expect("row to exist"));

        self.batches.push(IndexSortedBatch {
            sort_indices,
            keys,
            batch: payload,
        });

        Ok(())
    }

    pub(crate) fn into_batches(self) -> Vec<IndexSortedBatch> {
        self.batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::{Int32Array, UInt32Array};
    use crate::arrays::datatype::DataType;
    use crate::arrays::sort::sort_layout::SortColumn;

    #[test]
    fn chunk_indices_sorted() {
        let layout = SortLayout::new([SortColumn::new_asc_nulls_last(DataType::Int32)]);
        let mut local = LocalSortState::new(layout);

        let keys = Array::Int32(Int32Array::from_iter([3, 1, 2]));
        let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter([0u32, 1, 2]))]).unwrap();

        local.sink_batch(&[&keys], payload).unwrap();

        assert_eq!(3, local.row_count());
        let batches = local.into_batches();
        assert_eq!(vec![1, 2, 0], batches[0].sort_indices);
    }

    #[test]
    fn key_payload_row_mismatch_errors() {
        let layout = SortLayout::new([SortColumn::new_asc_nulls_last(DataType::Int32)]);
        let mut local = LocalSortState::new(layout);

        let keys = Array::Int32(Int32Array::from_iter([3, 1]));
        let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter([0u32, 1, 2]))]).unwrap();

        assert!(local.sink_batch(&[&keys], payload).is_err());
    }
}
