use std::fmt;

use cinder_error::{CinderError, Result};

use crate::arrays::datatype::DataType;

/// Reference to a table scope inside a `TableList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub table_idx: usize,
}

impl From<usize> for TableRef {
    fn from(table_idx: usize) -> Self {
        TableRef { table_idx }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.table_idx)
    }
}

/// A table scope available to expressions during binding.
#[derive(Debug, Clone)]
pub struct Table {
    pub reference: TableRef,
    pub column_types: Vec<DataType>,
    pub column_names: Vec<String>,
}

impl Table {
    pub fn num_columns(&self) -> usize {
        self.column_types.len()
    }
}

/// List of table scopes in a query.
#[derive(Debug, Clone, Default)]
pub struct TableList {
    tables: Vec<Table>,
}

impl TableList {
    pub const fn empty() -> Self {
        TableList { tables: Vec::new() }
    }

    pub fn push_table(
        &mut self,
        column_types: Vec<DataType>,
        column_names: Vec<String>,
    ) -> Result<TableRef> {
        if column_types.len() != column_names.len() {
            return Err(CinderError::new(format!(
                "Column type and name counts don't match: {} and {}",
                column_types.len(),
                column_names.len()
            )));
        }

        let reference = TableRef {
            table_idx: self.tables.len(),
        };
        self.tables.push(Table {
            reference,
            column_types,
            column_names,
        });

        Ok(reference)
    }

    pub fn get(&self, reference: TableRef) -> Result<&Table> {
        self.tables
            .get(reference.table_idx)
            .ok_or_else(|| CinderError::new(format!("Missing table in table list: {reference}")))
    }
}
