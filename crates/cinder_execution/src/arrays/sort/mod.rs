pub mod global;
pub mod key_encode;
pub mod local;
pub mod merger;
pub mod sort_layout;
pub mod sorted_batch;

use serde::{Deserialize, Serialize};

/// Direction to sort a key column in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub const fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Where nulls sort relative to non-null values, independent of the sort
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullOrder {
    NullsFirst,
    NullsLast,
}
