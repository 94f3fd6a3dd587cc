/// Asserts a caller-side precondition.
///
/// Active in debug builds, and in release builds when the `strict-contracts`
/// feature is enabled. Only used for checks whose violation is still memory
/// safe when skipped.
macro_rules! contract_assert {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "strict-contracts")) {
            assert!($($arg)*);
        }
    };
}

pub(crate) use contract_assert;

/// Creates a [`DynamicArray`](crate::DynamicArray) from a list of values, or
/// from a value and a count.
///
/// ```
/// use dynarray::dyn_array;
///
/// let a = dyn_array![1, 2, 3];
/// assert_eq!(a.len(), 3);
/// assert_eq!(a.capacity(), 3);
///
/// let b = dyn_array!["x"; 2];
/// assert_eq!(b, ["x", "x"]);
/// ```
#[macro_export]
macro_rules! dyn_array {
    () => {
        $crate::DynamicArray::new()
    };
    ($value:expr; $n:expr) => {
        $crate::DynamicArray::with_value($n, $value)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($x),+])
    };
}
