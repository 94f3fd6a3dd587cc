/// A request to construct an empty array with pre-sized capacity.
///
/// ```
/// use dynarray::{DynamicArray, reserve};
///
/// let a: DynamicArray<String> = DynamicArray::with_reserve(reserve(10));
/// assert!(a.is_empty());
/// assert_eq!(a.capacity(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveHint {
    capacity: usize,
}

impl ReserveHint {
    pub const fn new(capacity: usize) -> ReserveHint {
        ReserveHint { capacity }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Shorthand for [`ReserveHint::new`].
pub const fn reserve(capacity: usize) -> ReserveHint {
    ReserveHint::new(capacity)
}
