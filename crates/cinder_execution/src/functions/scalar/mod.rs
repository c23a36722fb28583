pub mod builtin;

use std::fmt::Debug;

use cinder_error::Result;
use dyn_clone::DynClone;

use super::FunctionInfo;
use crate::arrays::array::Array;
use crate::arrays::datatype::DataType;
use crate::expr::Expression;
use crate::logical::binder::bind_context::BindContext;

/// A generic scalar function that can specialize into a more specific
/// function depending on its inputs.
///
/// Generic scalar functions must be cheaply cloneable.
pub trait ScalarFunction: FunctionInfo + Debug + Sync + Send + DynClone {
    /// Plan a scalar function from expression inputs.
    ///
    /// This allows functions to check for constant expressions and produce a
    /// function state for use throughout the entire query. Expected to error
    /// if the number of arguments or the data types are incorrect.
    fn plan(&self, bind_context: &BindContext, inputs: Vec<Expression>)
        -> Result<PlannedScalarFunction>;
}

impl Clone for Box<dyn ScalarFunction> {
    fn clone(&self) -> Self {
        dyn_clone::clone_box(&**self)
    }
}

impl PartialEq<dyn ScalarFunction> for Box<dyn ScalarFunction + '_> {
    fn eq(&self, other: &dyn ScalarFunction) -> bool {
        self.as_ref() == other
    }
}

impl PartialEq for dyn ScalarFunction + '_ {
    fn eq(&self, other: &dyn ScalarFunction) -> bool {
        self.name() == other.name() && self.signatures() == other.signatures()
    }
}

impl Eq for dyn ScalarFunction {}

/// A scalar function that's been planned against concrete inputs.
#[derive(Debug, Clone)]
pub struct PlannedScalarFunction {
    /// The function that produced this plan.
    pub function: Box<dyn ScalarFunction>,
    /// Return type of the function.
    pub return_type: DataType,
    /// Inputs to the function.
    pub inputs: Vec<Expression>,
    /// The function implementation.
    pub function_impl: Box<dyn ScalarFunctionImpl>,
}

/// Assumes that a function with same inputs and return type is using the
/// same function implementation.
impl PartialEq for PlannedScalarFunction {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function
            && self.return_type == other.return_type
            && self.inputs == other.inputs
    }
}

impl Eq for PlannedScalarFunction {}

/// Vectorized execution half of a planned scalar function.
pub trait ScalarFunctionImpl: Debug + Sync + Send + DynClone {
    /// Execute the function on array inputs.
    ///
    /// Inputs correspond positionally to the planned expressions; arguments
    /// consumed at plan time (e.g. constant configuration strings) are
    /// ignored here.
    fn execute(&self, inputs: &[&Array]) -> Result<Array>;
}

impl Clone for Box<dyn ScalarFunctionImpl> {
    fn clone(&self) -> Self {
        dyn_clone::clone_box(&**self)
    }
}
