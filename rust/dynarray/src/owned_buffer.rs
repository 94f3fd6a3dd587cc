//! Fixed-size, exclusively owned heap storage.
//!
//! [`OwnedBuffer`] is the only place in the crate that talks to the global
//! allocator. It owns exactly `len` slots of `T` for its whole lifetime, but it
//! has no notion of which slots hold live values: slots start out uninitialized,
//! and the buffer never drops them. Tracking and dropping live values is the job
//! of the owning container.

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use dynarray_common::{Error, Result};

/// A single-owner heap allocation of exactly `len` slots of `T`.
///
/// The slot count is fixed at construction. An empty buffer (`len == 0`), as
/// well as any buffer of a zero-sized `T`, holds no allocation. Ownership moves
/// with the value; [`OwnedBuffer::swap`] exchanges two allocations in O(1).
pub struct OwnedBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    _owns: PhantomData<T>,
}

impl<T> OwnedBuffer<T> {
    /// Creates an empty buffer without allocating.
    pub const fn new() -> OwnedBuffer<T> {
        OwnedBuffer {
            ptr: NonNull::dangling(),
            len: 0,
            _owns: PhantomData,
        }
    }

    /// Allocates a buffer of `len` uninitialized slots.
    ///
    /// # Panics
    ///
    /// Panics if `len` slots of `T` exceed `isize::MAX` bytes. Allocator failure
    /// is reported through [`std::alloc::handle_alloc_error`].
    pub fn with_len(len: usize) -> OwnedBuffer<T> {
        let layout = match Layout::array::<T>(len) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(len),
        };
        match Self::allocate(len, layout) {
            Some(buf) => buf,
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Fallible counterpart of [`OwnedBuffer::with_len`].
    pub fn try_with_len(len: usize) -> Result<OwnedBuffer<T>> {
        let layout = Layout::array::<T>(len).map_err(|_| Error::capacity_overflow(len))?;
        Self::allocate(len, layout).ok_or_else(|| Error::allocation_failed(layout.size()))
    }

    /// Returns the number of slots in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exchanges the allocations of two buffers.
    #[inline]
    pub fn swap(&mut self, other: &mut OwnedBuffer<T>) {
        std::mem::swap(self, other);
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    fn allocate(len: usize, layout: Layout) -> Option<OwnedBuffer<T>> {
        if layout.size() == 0 {
            return Some(OwnedBuffer {
                ptr: NonNull::dangling(),
                len,
                _owns: PhantomData,
            });
        }
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc(layout) } as *mut T;
        NonNull::new(ptr).map(|ptr| OwnedBuffer {
            ptr,
            len,
            _owns: PhantomData,
        })
    }
}

impl<T> Drop for OwnedBuffer<T> {
    /// Releases the allocation. Slot contents are not dropped.
    fn drop(&mut self) {
        if let Ok(layout) = Layout::array::<T>(self.len) {
            if layout.size() != 0 {
                // SAFETY: the pointer was returned by `alloc::alloc` for this layout.
                unsafe { alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout) };
            }
        }
    }
}

impl<T> Default for OwnedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OwnedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .finish()
    }
}

// SAFETY: the buffer exclusively owns its slots, so it can be sent to another
// thread whenever `T` can.
unsafe impl<T: Send> Send for OwnedBuffer<T> {}

// SAFETY: shared access to the buffer only hands out shared access to `T`.
unsafe impl<T: Sync> Sync for OwnedBuffer<T> {}

#[cold]
#[track_caller]
pub(crate) fn capacity_overflow(requested: usize) -> ! {
    panic!("capacity overflow: {requested} elements cannot be allocated")
}
