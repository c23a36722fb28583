use std::fmt::Debug;
use std::marker::PhantomData;

use crate::arrays::bitmap::Bitmap;
use crate::arrays::storage::PrimitiveStorage;

use super::{is_valid, ValuesBuffer};

/// Trait for determining how to interpret binary data stored in a variable
/// length array.
pub trait VarlenType: PartialEq + PartialOrd {
    /// Interpret some binary input into an output type.
    fn interpret(input: &[u8]) -> &Self;

    /// Convert self into binary.
    fn as_binary(&self) -> &[u8];
}

impl VarlenType for [u8] {
    fn interpret(input: &[u8]) -> &Self {
        input
    }

    fn as_binary(&self) -> &[u8] {
        self
    }
}

impl VarlenType for str {
    fn interpret(input: &[u8]) -> &Self {
        std::str::from_utf8(input).expect("input should be valid utf8")
    }

    fn as_binary(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Offsets into a varlen array's data buffer.
pub trait OffsetIndex: Copy + Debug {
    fn as_usize(&self) -> usize;
    fn from_usize(u: usize) -> Self;
}

impl OffsetIndex for i32 {
    fn as_usize(&self) -> usize {
        (*self).try_into().expect("index to be positive")
    }

    fn from_usize(u: usize) -> Self {
        u as Self
    }
}

impl OffsetIndex for i64 {
    fn as_usize(&self) -> usize {
        (*self).try_into().expect("index to be positive")
    }

    fn from_usize(u: usize) -> Self {
        u as Self
    }
}

/// Buffer for accumulating varlen values prior to building the array.
#[derive(Debug)]
pub struct VarlenValuesBuffer<O: OffsetIndex> {
    offsets: Vec<O>,
    data: Vec<u8>,
}

impl<O: OffsetIndex> VarlenValuesBuffer<O> {
    pub fn into_data_and_offsets(self) -> (Vec<u8>, Vec<O>) {
        (self.data, self.offsets)
    }
}

impl<'a, T: VarlenType + ?Sized, O: OffsetIndex> ValuesBuffer<&'a T> for VarlenValuesBuffer<O> {
    fn push_value(&mut self, value: &'a T) {
        self.data.extend(value.as_binary());
        let offset = self.data.len();
        self.offsets.push(O::from_usize(offset));
    }

    fn push_null(&mut self) {
        let offset = self.data.len();
        self.offsets.push(O::from_usize(offset));
    }
}

impl<O: OffsetIndex> Default for VarlenValuesBuffer<O> {
    fn default() -> Self {
        let offsets: Vec<O> = vec![O::from_usize(0)];
        let data: Vec<u8> = Vec::new();
        VarlenValuesBuffer { offsets, data }
    }
}

impl<'a, A: VarlenType + ?Sized, O: OffsetIndex> FromIterator<&'a A> for VarlenValuesBuffer<O> {
    fn from_iter<T: IntoIterator<Item = &'a A>>(iter: T) -> Self {
        let mut buf = Self::default();
        for v in iter {
            buf.push_value(v);
        }
        buf
    }
}

/// Array for storing variable length values (strings, raw binary).
#[derive(Debug)]
pub struct VarlenArray<T: VarlenType + ?Sized, O: OffsetIndex> {
    /// Value validities.
    validity: Option<Bitmap>,

    /// Offsets into the data buffer.
    ///
    /// Length is one more than the number of values being held in this
    /// array.
    offsets: PrimitiveStorage<O>,

    /// The raw data.
    data: PrimitiveStorage<u8>,

    /// How to interpret the binary data.
    varlen_type: PhantomData<T>,
}

pub type Utf8Array = VarlenArray<str, i32>;
pub type LargeUtf8Array = VarlenArray<str, i64>;
pub type BinaryArray = VarlenArray<[u8], i32>;
pub type LargeBinaryArray = VarlenArray<[u8], i64>;

impl<T, O> VarlenArray<T, O>
where
    T: VarlenType + ?Sized,
    O: OffsetIndex,
{
    pub fn new(values: VarlenValuesBuffer<O>, validity: Option<Bitmap>) -> Self {
        VarlenArray {
            validity,
            offsets: values.offsets.into(),
            data: values.data.into(),
            varlen_type: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, idx: usize) -> Option<&T> {
        if idx >= self.len() {
            return None;
        }

        let offsets = self.offsets.as_ref();
        let start = offsets[idx].as_usize();
        let end = offsets[idx + 1].as_usize();

        let val = self
            .data
            .as_ref()
            .get(start..end)
            .expect("value to exist in data buffer");

        Some(T::interpret(val))
    }

    pub fn is_valid(&self, idx: usize) -> Option<bool> {
        if idx >= self.len() {
            return None;
        }
        Some(is_valid(self.validity.as_ref(), idx))
    }

    pub fn validity(&self) -> Option<&Bitmap> {
        self.validity.as_ref()
    }

    pub fn values_iter(&self) -> VarlenArrayIter<'_, T, O> {
        VarlenArrayIter { idx: 0, arr: self }
    }
}

impl<'a, A: VarlenType + ?Sized, O: OffsetIndex> FromIterator<&'a A> for VarlenArray<A, O> {
    fn from_iter<T: IntoIterator<Item = &'a A>>(iter: T) -> Self {
        let buffer = VarlenValuesBuffer::from_iter(iter);
        VarlenArray::new(buffer, None)
    }
}

impl<'a, A: VarlenType + ?Sized, O: OffsetIndex> FromIterator<Option<&'a A>> for VarlenArray<A, O> {
    fn from_iter<T: IntoIterator<Item = Option<&'a A>>>(iter: T) -> Self {
        let mut validity = Bitmap::default();
        let mut values = VarlenValuesBuffer::default();

        for item in iter {
            match item {
                Some(value) => {
                    validity.push(true);
                    values.push_value(value);
                }
                None => {
                    validity.push(false);
                    <VarlenValuesBuffer<O> as ValuesBuffer<&A>>::push_null(&mut values);
                }
            }
        }

        VarlenArray::new(values, Some(validity))
    }
}

#[derive(Debug)]
pub struct VarlenArrayIter<'a, T: VarlenType + ?Sized, O: OffsetIndex> {
    idx: usize,
    arr: &'a VarlenArray<T, O>,
}

impl<'a, T, O> Iterator for VarlenArrayIter<'a, T, O>
where
    T: VarlenType + ?Sized,
    O: OffsetIndex,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let val = self.arr.value(self.idx);
        self.idx += 1;
        val
    }
}

// Not derived to avoid requiring `T: Clone` for unsized value types.
impl<T, O> Clone for VarlenArray<T, O>
where
    T: VarlenType + ?Sized,
    O: OffsetIndex,
{
    fn clone(&self) -> Self {
        VarlenArray {
            validity: self.validity.clone(),
            offsets: self.offsets.clone(),
            data: self.data.clone(),
            varlen_type: PhantomData,
        }
    }
}

impl<T, O> PartialEq for VarlenArray<T, O>
where
    T: VarlenType + ?Sized,
    O: OffsetIndex,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        if self.validity != other.validity {
            return false;
        }

        let left = self.values_iter();
        let right = other.values_iter();

        left.zip(right).all(|(left, right)| left == right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_lookup() {
        let arr = Utf8Array::from_iter(["cat", "dog", "fish"]);
        assert_eq!(3, arr.len());
        assert_eq!(Some("dog"), arr.value(1));
        assert_eq!(None, arr.value(3));
    }

    #[test]
    fn nulls_tracked() {
        let arr = Utf8Array::from_iter([Some("a"), None, Some("c")]);
        assert_eq!(Some(true), arr.is_valid(0));
        assert_eq!(Some(false), arr.is_valid(1));
        assert_eq!(Some(""), arr.value(1));
    }
}
