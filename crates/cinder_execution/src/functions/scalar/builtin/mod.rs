pub mod list;

use once_cell::sync::Lazy;

use super::ScalarFunction;
use crate::functions::FunctionInfo;

/// All builtin scalar functions.
pub static BUILTIN_SCALAR_FUNCTIONS: Lazy<Vec<Box<dyn ScalarFunction>>> = Lazy::new(|| {
    vec![
        Box::new(list::ListSort),
        Box::new(list::ListReverseSort),
    ]
});

/// Find a builtin scalar function by name or alias.
pub fn find_scalar_function(name: &str) -> Option<&'static dyn ScalarFunction> {
    BUILTIN_SCALAR_FUNCTIONS
        .iter()
        .find(|func| func.name() == name || func.aliases().contains(&name))
        .map(|func| func.as_ref())
}
