use cinder_error::{CinderError, Result};
use tracing::debug;

use crate::arrays::batch::Batch;
use crate::arrays::sort::local::LocalSortState;
use crate::arrays::sort::merger::KWayMerger;
use crate::arrays::sort::sort_layout::SortLayout;
use crate::arrays::sort::sorted_batch::IndexSortedBatch;

/// Global merge stage of a sort.
///
/// Collects sorted runs from local states, then produces a single totally
/// ordered payload stream through `into_payload_scanner`.
#[derive(Debug)]
pub struct GlobalSortState {
    layout: SortLayout,
    runs: Vec<IndexSortedBatch>,
}

impl GlobalSortState {
    pub fn new(layout: SortLayout) -> Self {
        GlobalSortState {
            layout,
            runs: Vec::new(),
        }
    }

    pub fn layout(&self) -> &SortLayout {
        &self.layout
    }

    pub fn row_count(&self) -> usize {
        self.runs.iter().map(|run| run.num_rows()).sum()
    }

    /// Merge a local state's runs into this global state.
    ///
    /// The local state is consumed; its contribution can only be added once.
    pub fn add_local_state(&mut self, local: LocalSortState) -> Result<()> {
        if local.layout() != &self.layout {
            return Err(CinderError::new(
                "Local sort state layout does not match the global layout",
            ));
        }
        self.runs.extend(local.into_batches());
        Ok(())
    }

    /// Finalize and return a scanner over payloads in global sort order.
    ///
    /// The scan is forward-only and single-pass.
    pub fn into_payload_scanner(self, batch_size: usize) -> Result<PayloadScanner> {
        debug!(
            runs = self.runs.len(),
            rows = self.row_count(),
            "merging sorted runs"
        );

        let inputs = self.runs.into_iter().map(|run| run.into_batch_and_iter());
        let merger = KWayMerger::try_new(inputs)?;

        Ok(PayloadScanner { merger, batch_size })
    }
}

/// Forward scanner over the globally sorted payload stream.
#[derive(Debug)]
pub struct PayloadScanner {
    merger: KWayMerger,
    batch_size: usize,
}

impl PayloadScanner {
    /// Scan the next batch of payloads.
    ///
    /// Returns None exactly when the global row count is exhausted. Scanning
    /// an empty sort yields None immediately.
    pub fn scan_next(&mut self) -> Result<Option<Batch>> {
        self.merger.try_merge(self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::{Array, Int32Array, UInt32Array};
    use crate::arrays::datatype::DataType;
    use crate::arrays::sort::sort_layout::SortColumn;

    fn sink_i32_chunk(local: &mut LocalSortState, keys: &[i32]) {
        let payload: Vec<u32> = keys.iter().map(|&v| v as u32).collect();
        let keys = Array::Int32(Int32Array::from_iter(keys.iter().copied()));
        let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter(payload))]).unwrap();
        local.sink_batch(&[&keys], payload).unwrap();
    }

    fn scan_all(mut scanner: PayloadScanner) -> Vec<u32> {
        let mut out = Vec::new();
        while let Some(batch) = scanner.scan_next().unwrap() {
            let col = match batch.column(0).unwrap() {
                Array::UInt32(arr) => arr,
                other => panic!("unexpected array: {other:?}"),
            };
            out.extend(col.iter());
        }
        out
    }

    #[test]
    fn merge_multiple_chunks() {
        let layout = SortLayout::new([SortColumn::new_asc_nulls_last(DataType::Int32)]);
        let mut local = LocalSortState::new(layout.clone());

        sink_i32_chunk(&mut local, &[8, 10, 8, 4]);
        sink_i32_chunk(&mut local, &[2, 3]);
        sink_i32_chunk(&mut local, &[9, 1, 7, 0]);

        let mut global = GlobalSortState::new(layout);
        global.add_local_state(local).unwrap();
        assert_eq!(10, global.row_count());

        let scanner = global.into_payload_scanner(4).unwrap();
        let got = scan_all(scanner);

        assert_eq!(vec![0, 1, 2, 3, 4, 7, 8, 8, 9, 10], got);
    }

    #[test]
    fn scan_zero_rows() {
        let layout = SortLayout::new([SortColumn::new_asc_nulls_last(DataType::Int32)]);
        let global = GlobalSortState::new(layout);

        let mut scanner = global.into_payload_scanner(4).unwrap();
        assert!(scanner.scan_next().unwrap().is_none());
    }

    #[test]
    fn layout_mismatch_errors() {
        let local = LocalSortState::new(SortLayout::new([SortColumn::new_asc_nulls_last(
            DataType::Int32,
        )]));
        let mut global = GlobalSortState::new(SortLayout::new([SortColumn::new_asc_nulls_last(
            DataType::Int64,
        )]));

        assert!(global.add_local_state(local).is_err());
    }

    #[test]
    fn equal_keys_keep_payload_order() {
        // Two runs with identical keys. Payloads must surface run 0's rows
        // first, in chunk order.
        let layout = SortLayout::new([SortColumn::new_asc_nulls_last(DataType::Int32)]);
        let mut local = LocalSortState::new(layout.clone());

        let keys = Array::Int32(Int32Array::from_iter([5, 5]));
        let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter([0u32, 1]))]).unwrap();
        local.sink_batch(&[&keys], payload).unwrap();

        let keys = Array::Int32(Int32Array::from_iter([5, 5]));
        let payload = Batch::try_new([Array::UInt32(UInt32Array::from_iter([2u32, 3]))]).unwrap();
        local.sink_batch(&[&keys], payload).unwrap();

        let mut global = GlobalSortState::new(layout);
        global.add_local_state(local).unwrap();

        let scanner = global.into_payload_scanner(16).unwrap();
        assert_eq!(vec![0, 1, 2, 3], scan_all(scanner));
    }
}
