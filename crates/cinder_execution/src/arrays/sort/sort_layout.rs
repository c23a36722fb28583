use crate::arrays::datatype::DataType;

use super::{NullOrder, SortOrder};

/// Describes a single sort key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    /// If the column should be sorted descending.
    pub desc: bool,

    /// If nulls in the column sort before all non-null values.
    pub nulls_first: bool,

    /// Datatype of the column.
    pub datatype: DataType,
}

impl SortColumn {
    pub fn new(order: SortOrder, null_order: NullOrder, datatype: DataType) -> Self {
        SortColumn {
            desc: matches!(order, SortOrder::Descending),
            nulls_first: matches!(null_order, NullOrder::NullsFirst),
            datatype,
        }
    }

    pub fn new_asc_nulls_last(datatype: DataType) -> Self {
        SortColumn {
            desc: false,
            nulls_first: false,
            datatype,
        }
    }
}

/// Describes the full set of key columns for a sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortLayout {
    pub columns: Vec<SortColumn>,
}

impl SortLayout {
    pub fn new(columns: impl IntoIterator<Item = SortColumn>) -> Self {
        SortLayout {
            columns: columns.into_iter().collect(),
        }
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}
