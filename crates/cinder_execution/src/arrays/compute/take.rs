use cinder_error::Result;

use crate::arrays::array::list::ListArray;
use crate::arrays::array::{Array, OffsetIndex};
use crate::arrays::bitmap::Bitmap;
use crate::arrays::compute::interleave::interleave;

/// Gather rows from an array into a new array.
///
/// Indices may be provided in any order and more than once.
pub fn take(arr: &Array, indices: &[usize]) -> Result<Array> {
    match arr {
        Array::List(list) => Ok(Array::List(take_list(list, indices)?)),
        other => {
            let indices: Vec<_> = indices.iter().map(|&idx| (0, idx)).collect();
            interleave(&[other], &indices)
        }
    }
}

/// Gather rows from a list array.
///
/// The child is gathered element-wise and offsets are rebuilt densely in the
/// order rows were selected.
fn take_list(arr: &ListArray, indices: &[usize]) -> Result<ListArray> {
    let offsets = arr.offsets();

    let mut child_indices = Vec::new();
    let mut new_offsets = Vec::with_capacity(indices.len() + 1);
    new_offsets.push(0);
    let mut validity: Option<Bitmap> = arr.validity().map(|_| Bitmap::default());

    for &row_idx in indices {
        let valid = arr.is_valid(row_idx).expect("row to exist");
        if let Some(validity) = validity.as_mut() {
            validity.push(valid);
        }

        if valid {
            let start = offsets[row_idx].as_usize();
            let end = offsets[row_idx + 1].as_usize();
            child_indices.extend(start..end);
        }

        new_offsets.push(i32::from_usize(child_indices.len()));
    }

    let child = take(arr.child_array(), &child_indices)?;

    Ok(ListArray::new(child, new_offsets, validity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::array::{Int32Array, Utf8Array};
    use crate::arrays::scalar::ScalarValue;

    #[test]
    fn take_primitive() {
        let arr = Array::Int32(Int32Array::from_iter([10, 20, 30]));
        let out = take(&arr, &[2, 0, 2]).unwrap();
        let expected = Array::Int32(Int32Array::from_iter([30, 10, 30]));
        assert_eq!(expected, out);
    }

    #[test]
    fn take_varlen_with_nulls() {
        let arr = Array::Utf8(Utf8Array::from_iter([Some("a"), None, Some("c")]));
        let out = take(&arr, &[1, 2]).unwrap();
        let expected = Array::Utf8(Utf8Array::from_iter([None, Some("c")]));
        assert_eq!(expected, out);
    }

    #[test]
    fn take_list_rows() {
        // [[1, 2], NULL, [3]]
        let child = Array::Int32(Int32Array::from_iter([1, 2, 3]));
        let validity = Bitmap::from_iter([true, false, true]);
        let arr = Array::List(ListArray::new(child, vec![0, 2, 2, 3], Some(validity)));

        let out = take(&arr, &[2, 1, 0]).unwrap();
        let out = match out {
            Array::List(list) => list,
            other => panic!("unexpected array: {other:?}"),
        };

        assert_eq!(
            Some(ScalarValue::List(vec![ScalarValue::Int32(3)])),
            out.scalar(0)
        );
        assert_eq!(Some(ScalarValue::Null), out.scalar(1));
        assert_eq!(
            Some(ScalarValue::List(vec![
                ScalarValue::Int32(1),
                ScalarValue::Int32(2)
            ])),
            out.scalar(2)
        );
    }
}
