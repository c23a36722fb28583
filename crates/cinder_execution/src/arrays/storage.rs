/// Backing storage for primitive values in an array.
///
/// Thin wrapper around a vec for now. Exists so that storage can be swapped
/// for shared or memory-managed buffers without touching the array types.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveStorage<T> {
    Vec(Vec<T>),
}

impl<T> PrimitiveStorage<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::Vec(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> From<Vec<T>> for PrimitiveStorage<T> {
    fn from(value: Vec<T>) -> Self {
        PrimitiveStorage::Vec(value)
    }
}

impl<T> AsRef<[T]> for PrimitiveStorage<T> {
    fn as_ref(&self) -> &[T] {
        match self {
            Self::Vec(v) => v.as_slice(),
        }
    }
}
