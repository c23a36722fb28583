pub mod scalar;

use std::ops::RangeInclusive;

use cinder_error::{CinderError, Result};

use crate::arrays::datatype::{DataType, DataTypeId};

/// Function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Expected positional input types for this signature.
    pub positional_args: &'static [DataTypeId],

    /// The expected return type.
    pub return_type: DataTypeId,
}

impl Signature {
    /// Return if inputs given data types exactly satisfy the signature.
    pub fn exact_match(&self, inputs: &[DataType]) -> bool {
        if self.positional_args.len() != inputs.len() {
            return false;
        }

        for (&expected, have) in self.positional_args.iter().zip(inputs.iter()) {
            if expected == DataTypeId::Any {
                continue;
            }

            if have.datatype_id() != expected {
                return false;
            }
        }

        true
    }
}

/// Trait for defining information about functions.
pub trait FunctionInfo {
    /// Name of the function.
    fn name(&self) -> &'static str;

    /// Aliases for the function.
    ///
    /// The function is resolvable through both its name and all of its
    /// aliases.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Signatures for the function.
    fn signatures(&self) -> &[Signature];
}

/// Check the number of arguments provided, erroring if it doesn't match the
/// expected number of arguments.
pub fn plan_check_num_args(
    func: &impl FunctionInfo,
    inputs: &[DataType],
    expected: usize,
) -> Result<()> {
    if inputs.len() != expected {
        return Err(CinderError::new(format!(
            "Expected {} inputs for '{}', received {}",
            expected,
            func.name(),
            inputs.len(),
        )));
    }
    Ok(())
}

/// Check that the number of arguments falls in an inclusive range.
pub fn plan_check_num_args_between(
    func: &impl FunctionInfo,
    inputs: &[DataType],
    expected: RangeInclusive<usize>,
) -> Result<()> {
    if !expected.contains(&inputs.len()) {
        return Err(CinderError::new(format!(
            "Expected between {} and {} inputs for '{}', received {}",
            expected.start(),
            expected.end(),
            func.name(),
            inputs.len(),
        )));
    }
    Ok(())
}

/// Return an error indicating the input types we got are not ones we can
/// handle.
pub fn invalid_input_types_error(func: &impl FunctionInfo, got: &[&DataType]) -> CinderError {
    let got = got
        .iter()
        .map(|dt| dt.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    CinderError::new(format!("Got invalid type(s) '{got}' for '{}'", func.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_with_any() {
        let sig = Signature {
            positional_args: &[DataTypeId::List, DataTypeId::Any],
            return_type: DataTypeId::List,
        };

        assert!(sig.exact_match(&[DataType::list(DataType::Int32), DataType::Utf8]));
        assert!(!sig.exact_match(&[DataType::Utf8, DataType::Utf8]));
        assert!(!sig.exact_match(&[DataType::list(DataType::Int32)]));
    }
}
