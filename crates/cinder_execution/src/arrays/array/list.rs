use std::sync::Arc;

use crate::arrays::bitmap::Bitmap;
use crate::arrays::datatype::{DataType, ListTypeMeta};
use crate::arrays::scalar::ScalarValue;
use crate::arrays::storage::PrimitiveStorage;

use super::varlen::OffsetIndex;
use super::Array;

/// Array for storing list values.
///
/// Each row is a window (offset, length) into a shared child array holding
/// the flattened elements for every row.
#[derive(Debug, Clone)]
pub struct VariableListArray<O: OffsetIndex> {
    /// Value validities.
    validity: Option<Bitmap>,

    /// Offsets into the child array.
    ///
    /// Length is one more than the number of rows being held in this array.
    offsets: PrimitiveStorage<O>,

    /// Child array containing the flattened element data.
    child: Arc<Array>,
}

pub type ListArray = VariableListArray<i32>;

impl<O> VariableListArray<O>
where
    O: OffsetIndex,
{
    pub fn new(child: impl Into<Arc<Array>>, offsets: Vec<O>, validity: Option<Bitmap>) -> Self {
        debug_assert_eq!(
            offsets.len() - 1,
            validity
                .as_ref()
                .map(|v| v.len())
                .unwrap_or(offsets.len() - 1)
        );

        VariableListArray {
            validity,
            offsets: offsets.into(),
            child: child.into(),
        }
    }

    pub fn data_type(&self) -> DataType {
        DataType::List(ListTypeMeta::new(self.child.datatype()))
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn child_array(&self) -> &Arc<Array> {
        &self.child
    }

    pub fn offsets(&self) -> &[O] {
        self.offsets.as_ref()
    }

    pub fn is_valid(&self, idx: usize) -> Option<bool> {
        if idx >= self.len() {
            return None;
        }
        Some(self.validity.as_ref().map(|v| v.value(idx)).unwrap_or(true))
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    /// Get the scalar list value for a row.
    ///
    /// Returns `ScalarValue::Null` for null rows.
    pub fn scalar(&self, idx: usize) -> Option<ScalarValue> {
        if idx >= self.len() {
            return None;
        }
        if !self.is_valid(idx).expect("row to be in bounds") {
            return Some(ScalarValue::Null);
        }

        let start = self.offsets.as_ref()[idx].as_usize();
        let end = self.offsets.as_ref()[idx + 1].as_usize();

        let mut vals = Vec::with_capacity(end - start);
        for child_idx in start..end {
            let val = self.child.scalar(child_idx)?;
            vals.push(val);
        }

        Some(ScalarValue::List(vals))
    }
}

impl<O> PartialEq for VariableListArray<O>
where
    O: OffsetIndex,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        if self.validity != other.validity {
            return false;
        }

        // Compare row by row; offset layouts may differ while still holding
        // the same logical values.
        (0..self.len()).all(|idx| self.scalar(idx) == other.scalar(idx))
    }
}
