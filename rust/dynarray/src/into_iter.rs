use std::iter::FusedIterator;
use std::{fmt, ptr};

use crate::dynamic_array::DynamicArray;
use crate::owned_buffer::OwnedBuffer;

/// A by-value iterator over the elements of a [`DynamicArray`].
///
/// Elements not yet yielded are dropped together with the iterator.
pub struct IntoIter<T> {
    buffer: OwnedBuffer<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    /// Returns the elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots in `[start, end)` are live.
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr().add(self.start), self.len()) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: the slot at `start` is live and stops being tracked.
        let value = unsafe { self.buffer.as_ptr().add(self.start).read() };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot at the old `end - 1` is live and stops being tracked.
        Some(unsafe { self.buffer.as_ptr().add(self.end).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        // SAFETY: exactly the slots not yet yielded are live.
        unsafe {
            let rest = ptr::slice_from_raw_parts_mut(self.buffer.as_mut_ptr().add(self.start), remaining);
            ptr::drop_in_place(rest);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (buffer, len) = self.into_raw_parts();
        IntoIter {
            buffer,
            start: 0,
            end: len,
        }
    }
}
