/// Collect references to the inner typed arrays from a slice of `Array`
/// enums, erroring if any array is of a different type.
macro_rules! collect_arrays_of_type {
    ($arrays:expr, $variant:ident, $datatype:expr) => {{
        $arrays
            .iter()
            .map(|arr| match arr {
                crate::arrays::array::Array::$variant(arr) => Ok(arr),
                other => Err(cinder_error::CinderError::new(format!(
                    "Expected {} array, got {}",
                    $datatype,
                    other.datatype()
                ))),
            })
            .collect::<cinder_error::Result<Vec<_>>>()
    }};
}

pub(crate) use collect_arrays_of_type;
