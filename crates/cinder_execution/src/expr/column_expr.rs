use std::fmt;

use cinder_error::{CinderError, Result};

use crate::arrays::datatype::DataType;
use crate::logical::binder::bind_context::BindContext;
use crate::logical::binder::table_list::TableRef;

/// Reference to a column in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnExpr {
    /// Scope this column is in.
    pub table_scope: TableRef,
    /// Column index within the table.
    pub column: usize,
}

impl ColumnExpr {
    pub fn new(table: impl Into<TableRef>, column: usize) -> Self {
        ColumnExpr {
            table_scope: table.into(),
            column,
        }
    }

    pub fn datatype(&self, bind_context: &BindContext) -> Result<DataType> {
        let table = bind_context.table_list.get(self.table_scope)?;
        table
            .column_types
            .get(self.column)
            .cloned()
            .ok_or_else(|| CinderError::new(format!("Missing column in bind context: {self}")))
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table_scope, self.column)
    }
}
