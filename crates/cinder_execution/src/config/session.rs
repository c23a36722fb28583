use crate::arrays::sort::{NullOrder, SortOrder};
use crate::config::DEFAULT_BATCH_SIZE;

/// Configuration for the session.
///
/// Functions read their defaults from here at plan time.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Target batch size for vectorized execution.
    pub batch_size: usize,

    /// Sort direction used when an ordering is requested without an explicit
    /// direction.
    pub default_sort_order: SortOrder,

    /// Null placement used when an ordering is requested without an explicit
    /// null order.
    pub default_null_order: NullOrder,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            batch_size: DEFAULT_BATCH_SIZE,
            default_sort_order: SortOrder::Ascending,
            default_null_order: NullOrder::NullsLast,
        }
    }
}
