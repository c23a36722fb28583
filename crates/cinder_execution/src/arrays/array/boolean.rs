use crate::arrays::bitmap::Bitmap;

use super::{is_valid, ArrayBuilder};

/// Array for storing booleans, bit-packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanArray {
    /// Validity bitmap.
    validity: Option<Bitmap>,

    /// Underlying boolean values.
    values: Bitmap,
}

impl BooleanArray {
    pub fn new(values: Bitmap, validity: Option<Bitmap>) -> Self {
        BooleanArray { validity, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the value at the given index.
    ///
    /// This does not take validity into account.
    pub fn value(&self, idx: usize) -> Option<bool> {
        if idx >= self.len() {
            return None;
        }
        Some(self.values.value(idx))
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

    pub fn values(&self) -> &Bitmap {
        &self.values
    }
}

impl FromIterator<bool> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        BooleanArray {
            validity: None,
            values: Bitmap::from_iter(iter),
        }
    }
}

impl FromIterator<Option<bool>> for BooleanArray {
    fn from_iter<T: IntoIterator<Item = Option<bool>>>(iter: T) -> Self {
        let mut validity = Bitmap::default();
        let mut values = Bitmap::default();

        for item in iter {
            match item {
                Some(value) => {
                    validity.push(true);
                    values.push(value);
                }
                None => {
                    validity.push(false);
                    values.push(false);
                }
            }
        }

        BooleanArray {
            validity: Some(validity),
            values,
        }
    }
}

#[derive(Debug, Default)]
pub struct BooleanArrayBuilder {
    values: Bitmap,
    validity: Option<Bitmap>,
}

impl BooleanArrayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_typed_array(self) -> BooleanArray {
        BooleanArray {
            validity: self.validity,
            values: self.values,
        }
    }
}

impl ArrayBuilder<bool> for BooleanArrayBuilder {
    fn push_value(&mut self, value: bool) {
        self.values.push(value);
    }

    fn put_validity(&mut self, validity: Bitmap) {
        self.validity = Some(validity);
    }
}
