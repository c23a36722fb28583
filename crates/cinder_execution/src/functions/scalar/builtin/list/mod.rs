mod list_sort;

pub use list_sort::{ListReverseSort, ListSort};
