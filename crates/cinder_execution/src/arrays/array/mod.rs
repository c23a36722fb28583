pub mod boolean;
pub mod list;
pub mod null;
pub mod primitive;
pub mod varlen;

use std::borrow::Cow;

pub use boolean::{BooleanArray, BooleanArrayBuilder};
pub use list::{ListArray, VariableListArray};
pub use null::NullArray;
pub use primitive::{
    Float32Array, Float64Array, Int16Array, Int32Array, Int64Array, Int8Array, PrimitiveArray,
    PrimitiveArrayBuilder, UInt16Array, UInt32Array, UInt64Array, UInt8Array,
};
pub use varlen::{
    BinaryArray, LargeBinaryArray, LargeUtf8Array, OffsetIndex, Utf8Array, VarlenArray,
    VarlenType, VarlenValuesBuffer,
};

use crate::arrays::bitmap::Bitmap;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

/// A typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Null(NullArray),
    Boolean(BooleanArray),
    Int8(Int8Array),
    Int16(Int16Array),
    Int32(Int32Array),
    Int64(Int64Array),
    UInt8(UInt8Array),
    UInt16(UInt16Array),
    UInt32(UInt32Array),
    UInt64(UInt64Array),
    Float32(Float32Array),
    Float64(Float64Array),
    Utf8(Utf8Array),
    LargeUtf8(LargeUtf8Array),
    Binary(BinaryArray),
    LargeBinary(LargeBinaryArray),
    List(ListArray),
}

impl Array {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Null(_) => DataType::Null,
            Self::Boolean(_) => DataType::Boolean,
            Self::Int8(_) => DataType::Int8,
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt8(_) => DataType::UInt8,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Utf8(_) => DataType::Utf8,
            Self::LargeUtf8(_) => DataType::LargeUtf8,
            Self::Binary(_) => DataType::Binary,
            Self::LargeBinary(_) => DataType::LargeBinary,
            Self::List(arr) => arr.data_type(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Null(arr) => arr.len(),
            Self::Boolean(arr) => arr.len(),
            Self::Int8(arr) => arr.len(),
            Self::Int16(arr) => arr.len(),
            Self::Int32(arr) => arr.len(),
            Self::Int64(arr) => arr.len(),
            Self::UInt8(arr) => arr.len(),
            Self::UInt16(arr) => arr.len(),
            Self::UInt32(arr) => arr.len(),
            Self::UInt64(arr) => arr.len(),
            Self::Float32(arr) => arr.len(),
            Self::Float64(arr) => arr.len(),
            Self::Utf8(arr) => arr.len(),
            Self::LargeUtf8(arr) => arr.len(),
            Self::Binary(arr) => arr.len(),
            Self::LargeBinary(arr) => arr.len(),
            Self::List(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the validity of a value.
    ///
    /// Returns None if the index is out of bounds.
    pub fn is_valid(&self, idx: usize) -> Option<bool> {
        match self {
            Self::Null(arr) => arr.is_valid(idx),
            Self::Boolean(arr) => arr.is_valid(idx),
            Self::Int8(arr) => arr.is_valid(idx),
            Self::Int16(arr) => arr.is_valid(idx),
            Self::Int32(arr) => arr.is_valid(idx),
            Self::Int64(arr) => arr.is_valid(idx),
            Self::UInt8(arr) => arr.is_valid(idx),
            Self::UInt16(arr) => arr.is_valid(idx),
            Self::UInt32(arr) => arr.is_valid(idx),
            Self::UInt64(arr) => arr.is_valid(idx),
            Self::Float32(arr) => arr.is_valid(idx),
            Self::Float64(arr) => arr.is_valid(idx),
            Self::Utf8(arr) => arr.is_valid(idx),
            Self::LargeUtf8(arr) => arr.is_valid(idx),
            Self::Binary(arr) => arr.is_valid(idx),
            Self::LargeBinary(arr) => arr.is_valid(idx),
            Self::List(arr) => arr.is_valid(idx),
        }
    }

    /// Get the scalar value at an index, taking validity into account.
    ///
    /// Returns None if the index is out of bounds.
    pub fn scalar(&self, idx: usize) -> Option<ScalarValue> {
        if idx >= self.len() {
            return None;
        }
        if !self.is_valid(idx).expect("row to be in bounds") {
            return Some(ScalarValue::Null);
        }

        Some(match self {
            Self::Null(_) => ScalarValue::Null,
            Self::Boolean(arr) => ScalarValue::Boolean(arr.value(idx)?),
            Self::Int8(arr) => ScalarValue::Int8(*arr.value(idx)?),
            Self::Int16(arr) => ScalarValue::Int16(*arr.value(idx)?),
            Self::Int32(arr) => ScalarValue::Int32(*arr.value(idx)?),
            Self::Int64(arr) => ScalarValue::Int64(*arr.value(idx)?),
            Self::UInt8(arr) => ScalarValue::UInt8(*arr.value(idx)?),
            Self::UInt16(arr) => ScalarValue::UInt16(*arr.value(idx)?),
            Self::UInt32(arr) => ScalarValue::UInt32(*arr.value(idx)?),
            Self::UInt64(arr) => ScalarValue::UInt64(*arr.value(idx)?),
            Self::Float32(arr) => ScalarValue::Float32(*arr.value(idx)?),
            Self::Float64(arr) => ScalarValue::Float64(*arr.value(idx)?),
            Self::Utf8(arr) => ScalarValue::Utf8(Cow::Borrowed(arr.value(idx)?)),
            Self::LargeUtf8(arr) => ScalarValue::LargeUtf8(Cow::Borrowed(arr.value(idx)?)),
            Self::Binary(arr) => ScalarValue::Binary(Cow::Borrowed(arr.value(idx)?)),
            Self::LargeBinary(arr) => ScalarValue::LargeBinary(Cow::Borrowed(arr.value(idx)?)),
            Self::List(arr) => return arr.scalar(idx),
        })
    }

    /// Get the validity bitmap for this array if it has one.
    ///
    /// Note that a missing bitmap means all values are valid, except for
    /// `Null` arrays where every value is null.
    pub fn validity(&self) -> Option<&Bitmap> {
        match self {
            Self::Null(_) => None,
            Self::Boolean(arr) => arr.validity(),
            Self::Int8(arr) => arr.validity(),
            Self::Int16(arr) => arr.validity(),
            Self::Int32(arr) => arr.validity(),
            Self::Int64(arr) => arr.validity(),
            Self::UInt8(arr) => arr.validity(),
            Self::UInt16(arr) => arr.validity(),
            Self::UInt32(arr) => arr.validity(),
            Self::UInt64(arr) => arr.validity(),
            Self::Float32(arr) => arr.validity(),
            Self::Float64(arr) => arr.validity(),
            Self::Utf8(arr) => arr.validity(),
            Self::LargeUtf8(arr) => arr.validity(),
            Self::Binary(arr) => arr.validity(),
            Self::LargeBinary(arr) => arr.validity(),
            Self::List(arr) => arr.validity(),
        }
    }
}

/// Check the validity at an index in an optional bitmap.
///
/// A missing bitmap means all values are valid.
pub(crate) fn is_valid(validity: Option<&Bitmap>, idx: usize) -> bool {
    validity.map(|bm| bm.value(idx)).unwrap_or(true)
}

/// Trait for pushing values into an array builder.
pub trait ArrayBuilder<T> {
    /// Push a value onto the builder.
    fn push_value(&mut self, value: T);

    /// Set the validity for the array being built.
    fn put_validity(&mut self, validity: Bitmap);
}

/// Trait for value buffers that distinguish nulls while accumulating.
pub trait ValuesBuffer<T> {
    fn push_value(&mut self, value: T);
    fn push_null(&mut self);
}
