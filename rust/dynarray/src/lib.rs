//! A growable, contiguous array with explicit capacity management.
//!
//! [`DynamicArray`] owns a single [`OwnedBuffer`] sized to its capacity and
//! keeps a separate count of live elements. It grows geometrically when full
//! and never shrinks its buffer on its own.
//!
//! ```
//! use dynarray::{DynamicArray, dyn_array};
//!
//! let mut a = DynamicArray::new();
//! a.push_back(1);
//! a.push_back(2);
//! a.push_back(3);
//! assert_eq!(a.len(), 3);
//! assert_eq!(a.capacity(), 4);
//!
//! let pos = a.insert(a.position(1), 99);
//! assert_eq!(a, [1, 99, 2, 3]);
//! a.erase(pos);
//! assert_eq!(a, dyn_array![1, 2, 3]);
//!
//! assert!(a.at(10).is_err());
//! ```
//!
//! # Contracts
//!
//! Operations that would be undefined behavior on misuse in an unchecked
//! container are memory safe here. Indexing with `[]`, `insert` and `erase`
//! panic on an out-of-range index; [`DynamicArray::get_unchecked`] is the
//! `unsafe` fast path. Checks that are not needed for memory safety (popping
//! an empty array, using a stale [`Position`]) are debug assertions, promoted
//! to release builds by the `strict-contracts` feature. The checked accessor
//! [`DynamicArray::at`] is the only operation reporting a recoverable range
//! error.
//!
//! # Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` as a sequence.
//! - `strict-contracts`: contract assertions in release builds.

mod cmp;
mod dynamic_array;
mod into_iter;
mod macros;
mod owned_buffer;
mod position;
mod reserve;
#[cfg(feature = "serde")]
mod serde_impl;

pub use dynamic_array::DynamicArray;
pub use dynarray_common::{Error, ErrorKind, Result};
pub use into_iter::IntoIter;
pub use owned_buffer::OwnedBuffer;
pub use position::Position;
pub use reserve::{ReserveHint, reserve};

#[cfg(test)]
mod tests;
