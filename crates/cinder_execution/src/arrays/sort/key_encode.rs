use cinder_error::{not_implemented, CinderError, Result};

use crate::arrays::array::{Array, VarlenType};
use crate::arrays::sort::sort_layout::{SortColumn, SortLayout};

/// Escaped byte within an encoded varlen value.
const VARLEN_ESCAPE: u8 = 0x00;
/// Byte following an escape byte that's part of the value.
const VARLEN_ESCAPE_SUFFIX: u8 = 0x01;

/// Binary-encoded sort keys suitable for comparisons.
///
/// Each row encodes every key column as a validity byte followed by a
/// memcomparable rendition of the value. Comparing two encoded rows as raw
/// bytes is equivalent to comparing the original values under the layout's
/// order and null-order configuration.
#[derive(Debug)]
pub struct SortKeys {
    /// Underlying key data.
    data: Vec<u8>,

    /// Offsets into the data buffer.
    offsets: Vec<usize>,
}

impl SortKeys {
    pub fn num_rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn key(&self, idx: usize) -> Option<SortKey<'_>> {
        if idx >= self.num_rows() {
            return None;
        }

        let start = self.offsets[idx];
        let end = self.offsets[idx + 1];

        Some(SortKey {
            data: &self.data[start..end],
        })
    }

    pub fn iter(&self) -> SortKeyIter<'_> {
        SortKeyIter { keys: self, idx: 0 }
    }
}

/// A single encoded key that can be compared against other keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey<'a> {
    data: &'a [u8],
}

impl<'a> SortKey<'a> {
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[derive(Debug)]
pub struct SortKeyIter<'a> {
    keys: &'a SortKeys,
    idx: usize,
}

impl<'a> Iterator for SortKeyIter<'a> {
    type Item = SortKey<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.keys.num_rows() {
            return None;
        }
        let key = self.keys.key(self.idx).expect("key to exist");
        self.idx += 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.keys.num_rows() - self.idx;
        (remaining, Some(remaining))
    }
}

impl SortColumn {
    /// Byte marking a null value for this column.
    ///
    /// Chosen such that raw byte comparison places nulls on the requested
    /// side of all valid values. Never inverted for descending columns; null
    /// placement is independent of sort direction.
    const fn null_byte(&self) -> u8 {
        if self.nulls_first {
            0
        } else {
            1
        }
    }

    const fn valid_byte(&self) -> u8 {
        1 - self.null_byte()
    }

    /// Invert all value bytes if this column should be ordered descending.
    ///
    /// Does nothing if the column is ascending. This encodes the direction
    /// into the key itself so comparisons stay plain byte comparisons even
    /// with mixed-direction layouts.
    fn invert_if_desc(&self, buf: &mut [u8]) {
        if self.desc {
            for b in buf {
                *b = !*b;
            }
        }
    }
}

/// Encode sort key columns into a set of binary-comparable keys.
///
/// Column count must match the layout, and every column must hold exactly
/// `num_rows` rows.
pub fn sort_key_encode(
    layout: &SortLayout,
    columns: &[&Array],
    num_rows: usize,
) -> Result<SortKeys> {
    if columns.len() != layout.num_columns() {
        return Err(CinderError::new(format!(
            "Expected {} key columns, got {}",
            layout.num_columns(),
            columns.len()
        )));
    }

    for (arr, col) in columns.iter().zip(layout.columns.iter()) {
        if arr.len() != num_rows {
            return Err(CinderError::new(format!(
                "Expected key column to have {num_rows} rows, got {}",
                arr.len()
            )));
        }
        if arr.datatype() != col.datatype {
            return Err(CinderError::new(format!(
                "Expected key column of type {}, got {}",
                col.datatype,
                arr.datatype()
            )));
        }
    }

    let mut data = Vec::new();
    let mut offsets = Vec::with_capacity(num_rows + 1);
    offsets.push(0);

    for row_idx in 0..num_rows {
        for (&arr, col) in columns.iter().zip(layout.columns.iter()) {
            encode_column_value(col, arr, row_idx, &mut data)?;
        }
        offsets.push(data.len());
    }

    Ok(SortKeys { data, offsets })
}

fn encode_column_value(
    col: &SortColumn,
    arr: &Array,
    row_idx: usize,
    out: &mut Vec<u8>,
) -> Result<()> {
    let valid = arr.is_valid(row_idx).expect("row to be in bounds");
    if !valid {
        out.push(col.null_byte());
        return Ok(());
    }
    out.push(col.valid_byte());

    let value_start = out.len();

    match arr {
        Array::Null(_) => (), // Unreachable, null arrays never produce valid rows.
        Array::Boolean(arr) => {
            let v = arr.value(row_idx).expect("row to be in bounds");
            out.push(v as u8);
        }
        Array::Int8(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Int16(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Int32(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Int64(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::UInt8(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::UInt16(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::UInt32(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::UInt64(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Float32(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Float64(arr) => arr.value(row_idx).expect("row to be in bounds").encode(out),
        Array::Utf8(arr) => {
            encode_varlen(arr.value(row_idx).expect("row to be in bounds"), out)
        }
        Array::LargeUtf8(arr) => {
            encode_varlen(arr.value(row_idx).expect("row to be in bounds"), out)
        }
        Array::Binary(arr) => {
            encode_varlen(arr.value(row_idx).expect("row to be in bounds"), out)
        }
        Array::LargeBinary(arr) => {
            encode_varlen(arr.value(row_idx).expect("row to be in bounds"), out)
        }
        Array::List(_) => not_implemented!("sort key encoding for nested types"),
    }

    col.invert_if_desc(&mut out[value_start..]);

    Ok(())
}

/// Encode a variable length value.
///
/// Zero bytes in the value are escaped and the value is closed with a
/// two-byte terminator. This keeps the encoding prefix-free: no encoded
/// value is a prefix of another, which is required for byte comparisons to
/// order prefix pairs ("a" vs "aa") correctly once descending inversion is
/// applied.
fn encode_varlen<T: VarlenType + ?Sized>(value: &T, out: &mut Vec<u8>) {
    for &byte in value.as_binary() {
        if byte == VARLEN_ESCAPE {
            out.push(VARLEN_ESCAPE);
            out.push(VARLEN_ESCAPE_SUFFIX);
        } else {
            out.push(byte);
        }
    }
    out.push(VARLEN_ESCAPE);
    out.push(VARLEN_ESCAPE);
}

/// Trait for types that can encode themselves into a comparable binary
/// representation.
trait ComparableEncode {
    fn encode(&self, buf: &mut Vec<u8>);
}

/// Implements `ComparableEncode` for unsigned ints.
macro_rules! comparable_encode_unsigned {
    ($type:ty) => {
        impl ComparableEncode for $type {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_be_bytes());
            }
        }
    };
}

comparable_encode_unsigned!(u8);
comparable_encode_unsigned!(u16);
comparable_encode_unsigned!(u32);
comparable_encode_unsigned!(u64);

/// Implements `ComparableEncode` for signed ints.
macro_rules! comparable_encode_signed {
    ($type:ty) => {
        impl ComparableEncode for $type {
            fn encode(&self, buf: &mut Vec<u8>) {
                let mut b = self.to_be_bytes();
                b[0] ^= 128; // Flip sign bit.
                buf.extend_from_slice(&b);
            }
        }
    };
}

comparable_encode_signed!(i8);
comparable_encode_signed!(i16);
comparable_encode_signed!(i32);
comparable_encode_signed!(i64);

impl ComparableEncode for f32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        // Flip all bits for negatives, only the sign bit for positives. Total
        // order matches IEEE 754 ordering with -NaN first and NaN last.
        let mut bits = self.to_bits();
        bits ^= if bits & 0x8000_0000 != 0 {
            0xFFFF_FFFF
        } else {
            0x8000_0000
        };
        buf.extend_from_slice(&bits.to_be_bytes());
    }
}

impl ComparableEncode for f64 {
    fn encode(&self, buf: &mut Vec<u8>) {
        let mut bits = self.to_bits();
        bits ^= if bits & 0x8000_0000_0000_0000 != 0 {
            0xFFFF_FFFF_FFFF_FFFF
        } else {
            0x8000_0000_0000_0000
        };
        buf.extend_from_slice(&bits.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::*;
    use crate::arrays::array::{Float64Array, Int32Array, Utf8Array};
    use crate::arrays::datatype::DataType;

    fn encode_single(col: SortColumn, arr: &Array) -> SortKeys {
        let layout = SortLayout::new([col]);
        sort_key_encode(&layout, &[arr], arr.len()).unwrap()
    }

    fn orderings(keys: &SortKeys, other: &SortKeys) -> Vec<Ordering> {
        keys.iter()
            .zip(other.iter())
            .map(|(left, right)| left.cmp(&right))
            .collect()
    }

    #[test]
    fn primitive_cmp_asc() {
        let col1 = Array::Int32(Int32Array::from_iter([-1, 0, 1]));
        let col2 = Array::Int32(Int32Array::from_iter([1, 0, -1]));

        let rows1 = encode_single(SortColumn::new_asc_nulls_last(DataType::Int32), &col1);
        let rows2 = encode_single(SortColumn::new_asc_nulls_last(DataType::Int32), &col2);

        let expected = vec![Ordering::Less, Ordering::Equal, Ordering::Greater];
        assert_eq!(expected, orderings(&rows1, &rows2));
    }

    #[test]
    fn primitive_cmp_desc() {
        let col1 = Array::Int32(Int32Array::from_iter([-1, 0, 1]));
        let col2 = Array::Int32(Int32Array::from_iter([1, 0, -1]));

        let col = SortColumn {
            desc: true,
            nulls_first: false,
            datatype: DataType::Int32,
        };

        let rows1 = encode_single(col.clone(), &col1);
        let rows2 = encode_single(col, &col2);

        // Flipped, since we're ordering in descending order.
        let expected = vec![Ordering::Greater, Ordering::Equal, Ordering::Less];
        assert_eq!(expected, orderings(&rows1, &rows2));
    }

    #[test]
    fn float_cmp_negatives() {
        let col1 = Array::Float64(Float64Array::from_iter([-2.5, -0.0, 1.5]));
        let col2 = Array::Float64(Float64Array::from_iter([-1.0, 0.0, 10.0]));

        let rows1 = encode_single(SortColumn::new_asc_nulls_last(DataType::Float64), &col1);
        let rows2 = encode_single(SortColumn::new_asc_nulls_last(DataType::Float64), &col2);

        let expected = vec![Ordering::Less, Ordering::Less, Ordering::Less];
        assert_eq!(expected, orderings(&rows1, &rows2));
    }

    #[test]
    fn varlen_prefix_pairs_asc() {
        let col1 = Array::Utf8(Utf8Array::from_iter(["a", "aa", "bb"]));
        let col2 = Array::Utf8(Utf8Array::from_iter(["aa", "a", "bb"]));

        let rows1 = encode_single(SortColumn::new_asc_nulls_last(DataType::Utf8), &col1);
        let rows2 = encode_single(SortColumn::new_asc_nulls_last(DataType::Utf8), &col2);

        let expected = vec![Ordering::Less, Ordering::Greater, Ordering::Equal];
        assert_eq!(expected, orderings(&rows1, &rows2));
    }

    #[test]
    fn varlen_prefix_pairs_desc() {
        // "aa" must sort before "a" when descending. Raw byte encoding gets
        // this wrong; the terminator makes it hold.
        let col1 = Array::Utf8(Utf8Array::from_iter(["a", "bb"]));
        let col2 = Array::Utf8(Utf8Array::from_iter(["aa", "b"]));

        let col = SortColumn {
            desc: true,
            nulls_first: false,
            datatype: DataType::Utf8,
        };

        let rows1 = encode_single(col.clone(), &col1);
        let rows2 = encode_single(col, &col2);

        let expected = vec![Ordering::Greater, Ordering::Less];
        assert_eq!(expected, orderings(&rows1, &rows2));
    }

    #[test]
    fn null_placement() {
        let vals = Array::Int32(Int32Array::from_iter([Some(1), None]));

        let rows = encode_single(SortColumn::new_asc_nulls_last(DataType::Int32), &vals);
        assert_eq!(Ordering::Less, rows.key(0).unwrap().cmp(&rows.key(1).unwrap()));

        let col = SortColumn {
            desc: false,
            nulls_first: true,
            datatype: DataType::Int32,
        };
        let rows = encode_single(col, &vals);
        assert_eq!(
            Ordering::Greater,
            rows.key(0).unwrap().cmp(&rows.key(1).unwrap())
        );
    }

    #[test]
    fn null_placement_unaffected_by_desc() {
        let vals = Array::Int32(Int32Array::from_iter([Some(1), None]));

        let col = SortColumn {
            desc: true,
            nulls_first: false,
            datatype: DataType::Int32,
        };
        let rows = encode_single(col, &vals);

        // Value row still sorts before the null row.
        assert_eq!(Ordering::Less, rows.key(0).unwrap().cmp(&rows.key(1).unwrap()));
    }

    #[test]
    fn two_key_columns_group_dominates() {
        use crate::arrays::array::UInt32Array;

        let groups = Array::UInt32(UInt32Array::from_iter([0, 1]));
        let vals = Array::Int32(Int32Array::from_iter([100, -100]));

        let layout = SortLayout::new([
            SortColumn::new_asc_nulls_last(DataType::UInt32),
            SortColumn::new_asc_nulls_last(DataType::Int32),
        ]);

        let rows = sort_key_encode(&layout, &[&groups, &vals], 2).unwrap();

        // Group id orders first even though the value column disagrees.
        assert_eq!(Ordering::Less, rows.key(0).unwrap().cmp(&rows.key(1).unwrap()));
    }
}
