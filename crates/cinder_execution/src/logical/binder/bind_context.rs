use crate::config::session::SessionConfig;
use crate::logical::binder::table_list::TableList;

/// Context available when binding expressions and planning functions.
#[derive(Debug, Clone, Default)]
pub struct BindContext {
    pub table_list: TableList,
    pub config: SessionConfig,
}

impl BindContext {
    pub fn new(config: SessionConfig) -> Self {
        BindContext {
            table_list: TableList::empty(),
            config,
        }
    }
}
