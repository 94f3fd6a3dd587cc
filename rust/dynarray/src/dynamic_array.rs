//! The growable array type and its mutation algorithms.

use std::borrow::{Borrow, BorrowMut};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::slice::SliceIndex;
use std::{fmt, ptr};

use dynarray_common::Result;
use dynarray_common::result::verify_index;

use crate::macros::contract_assert;
use crate::owned_buffer::{OwnedBuffer, capacity_overflow};
use crate::position::{Position, next_generation};
use crate::reserve::ReserveHint;

/// A contiguous, growable array backed by a single [`OwnedBuffer`].
///
/// The array tracks a length separate from the buffer's capacity. Elements in
/// `[0, len)` are live; slots in `[len, capacity)` are uninitialized residue and
/// are never read.
///
/// # Growth policy
///
/// Appending to a full array (`push_back`, `insert`) reallocates to twice the
/// current capacity, or to 1 when the capacity is 0. Growing with
/// [`resize`](DynamicArray::resize) to `n >= capacity` reallocates to exactly
/// `2 * n`. [`reserve`](DynamicArray::reserve) reallocates to exactly the
/// requested capacity. Capacity never shrinks.
///
/// Every reallocation invalidates outstanding [`Position`]s and references.
pub struct DynamicArray<T> {
    buffer: OwnedBuffer<T>,
    len: usize,
    generation: u64,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array without allocating.
    ///
    /// Every array starts out at its own generation, so positions never carry
    /// over from one array to another.
    pub fn new() -> DynamicArray<T> {
        DynamicArray {
            buffer: OwnedBuffer::new(),
            len: 0,
            generation: next_generation(),
        }
    }

    /// Creates an empty array whose capacity is exactly `hint.capacity()`.
    pub fn with_reserve(hint: ReserveHint) -> DynamicArray<T> {
        if hint.capacity() == 0 {
            return DynamicArray::new();
        }
        DynamicArray {
            buffer: OwnedBuffer::with_len(hint.capacity()),
            len: 0,
            generation: next_generation(),
        }
    }

    /// Creates an array of `len` elements, each produced by `f`.
    ///
    /// Length and capacity are both `len`.
    pub fn from_fn(len: usize, f: impl FnMut() -> T) -> DynamicArray<T> {
        let mut array = DynamicArray::with_reserve(ReserveHint::new(len));
        array.fill_within_capacity(len, f);
        array
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of elements the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the first `len` slots are initialized.
        unsafe { std::slice::from_raw_parts_mut(self.buffer.as_mut_ptr(), self.len) }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Returns a reference to the element at `index`, or an out-of-range error
    /// if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        verify_index(index, self.len)?;
        Ok(&self.as_slice()[index])
    }

    /// Mutable counterpart of [`at`](DynamicArray::at).
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        verify_index(index, self.len)?;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// Returns a reference to the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. The precondition is asserted in debug
    /// builds only.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        contract_assert!(index < self.len, "index {index} out of range for length {}", self.len);
        // SAFETY: the caller guarantees `index < len`.
        unsafe { &*self.buffer.as_ptr().add(index) }
    }

    /// Mutable counterpart of [`get_unchecked`](DynamicArray::get_unchecked).
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        contract_assert!(index < self.len, "index {index} out of range for length {}", self.len);
        // SAFETY: the caller guarantees `index < len`.
        unsafe { &mut *self.buffer.as_mut_ptr().add(index) }
    }

    /// Position of the first element.
    #[inline]
    pub fn begin(&self) -> Position {
        Position::new(0, self.generation)
    }

    /// Position one past the last element.
    #[inline]
    pub fn end(&self) -> Position {
        Position::new(self.len, self.generation)
    }

    /// Returns the position of `index`, which may equal `len()`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn position(&self, index: usize) -> Position {
        assert!(
            index <= self.len,
            "position index (is {index}) should be <= len (is {})",
            self.len
        );
        Position::new(index, self.generation)
    }

    /// Returns the element at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not address a live element. Using a position taken
    /// before the last reallocation is a contract violation.
    pub fn at_position(&self, pos: Position) -> &T {
        self.check_generation(pos);
        &self.as_slice()[pos.index()]
    }

    /// Mutable counterpart of [`at_position`](DynamicArray::at_position).
    pub fn at_position_mut(&mut self, pos: Position) -> &mut T {
        self.check_generation(pos);
        &mut self.as_mut_slice()[pos.index()]
    }

    /// Appends `value`, doubling the capacity first if the array is full.
    pub fn push_back(&mut self, value: T) {
        if self.len == self.capacity() {
            self.reallocate(self.grown_capacity());
        }
        // SAFETY: `len < capacity` after the growth check.
        unsafe { self.buffer.as_mut_ptr().add(self.len).write(value) };
        self.len += 1;
    }

    /// Inserts `value` at `pos`, shifting the elements from `pos` onward one
    /// slot to the right, and returns the position of the inserted element.
    ///
    /// `pos == end()` appends. A full array grows with the same policy as
    /// [`push_back`](DynamicArray::push_back).
    ///
    /// # Panics
    ///
    /// Panics if `pos.index() > len()`.
    pub fn insert(&mut self, pos: Position, value: T) -> Position {
        self.check_generation(pos);
        let index = pos.index();
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );

        if len == self.capacity() {
            let mut new_buffer = OwnedBuffer::with_len(self.grown_capacity());
            // SAFETY: the new buffer holds at least `len + 1` slots; the live
            // elements are moved bitwise and the old slots are never read again.
            unsafe {
                let src = self.buffer.as_ptr();
                let dst = new_buffer.as_mut_ptr();
                ptr::copy_nonoverlapping(src, dst, index);
                ptr::copy_nonoverlapping(src.add(index), dst.add(index + 1), len - index);
                dst.add(index).write(value);
            }
            self.replace_buffer(new_buffer);
        } else {
            // SAFETY: `len < capacity`, so the shifted tail stays in bounds.
            unsafe {
                let p = self.buffer.as_mut_ptr().add(index);
                ptr::copy(p, p.add(1), len - index);
                p.write(value);
            }
        }
        self.len = len + 1;
        Position::new(index, self.generation)
    }

    /// Drops the last element. Capacity is unchanged.
    ///
    /// Calling this on an empty array is a contract violation: it panics in
    /// debug builds and does nothing otherwise.
    pub fn pop_back(&mut self) {
        contract_assert!(!self.is_empty(), "pop_back on an empty DynamicArray");
        if self.len == 0 {
            return;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live and is no longer tracked.
        unsafe { ptr::drop_in_place(self.buffer.as_mut_ptr().add(self.len)) };
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` was live and is no longer tracked.
        Some(unsafe { self.buffer.as_ptr().add(self.len).read() })
    }

    /// Drops the element at `pos`, shifting the following elements one slot to
    /// the left, and returns the position now occupied by the next element.
    ///
    /// # Panics
    ///
    /// Panics if `pos.index() >= len()`.
    pub fn erase(&mut self, pos: Position) -> Position {
        self.check_generation(pos);
        let index = pos.index();
        drop(self.remove(index));
        Position::new(index, self.generation)
    }

    /// Removes and returns the element at `index`, shifting the following
    /// elements one slot to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        // SAFETY: `index < len`; the removed value is read out before the tail
        // is moved over its slot.
        unsafe {
            let p = self.buffer.as_mut_ptr().add(index);
            let value = p.read();
            ptr::copy(p.add(1), p, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Grows the capacity to exactly `new_capacity` if it is larger than the
    /// current capacity. Never shrinks.
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity > self.capacity() {
            self.reallocate(new_capacity);
        }
    }

    /// Fallible counterpart of [`reserve`](DynamicArray::reserve): reports
    /// capacity overflow and allocator failure instead of panicking or aborting.
    /// The array is unchanged on error.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let new_buffer = OwnedBuffer::try_with_len(new_capacity).inspect_err(|e| {
            log::debug!("try_reserve({new_capacity}) failed: {e}");
        })?;
        self.relocate_into(new_buffer);
        Ok(())
    }

    /// Resizes the array to `new_len`, filling new slots with values from `f`.
    ///
    /// - `new_len <= len`: truncates.
    /// - `new_len < capacity`: fills in place.
    /// - otherwise: reallocates to `2 * new_len`, then fills.
    pub fn resize_with(&mut self, new_len: usize, f: impl FnMut() -> T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        if new_len >= self.capacity() {
            let new_capacity = new_len
                .checked_mul(2)
                .unwrap_or_else(|| capacity_overflow(new_len));
            self.reallocate(new_capacity);
        }
        self.fill_within_capacity(new_len, f);
    }

    /// Resizes the array to `new_len`, filling new slots with `T::default()`.
    ///
    /// See [`resize_with`](DynamicArray::resize_with) for the growth rules.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Drops the elements from `new_len` onward. Has no effect if
    /// `new_len >= len`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail_len = self.len - new_len;
        self.len = new_len;
        // SAFETY: the tail was live and is no longer tracked by `len`.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.buffer.as_mut_ptr().add(new_len), tail_len);
            ptr::drop_in_place(tail);
        }
    }

    /// Drops all elements. Capacity and buffer are unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges buffers, lengths and capacities with `other` in O(1).
    ///
    /// Positions taken from either array before the swap become stale.
    pub fn swap(&mut self, other: &mut DynamicArray<T>) {
        self.buffer.swap(&mut other.buffer);
        std::mem::swap(&mut self.len, &mut other.len);
        self.generation = next_generation();
        other.generation = next_generation();
    }

    /// Takes the contents of the array, leaving it empty with no allocation.
    ///
    /// Positions taken from `self` before the call become stale.
    pub fn take(&mut self) -> DynamicArray<T> {
        std::mem::take(self)
    }

    /// Moves every live element of `source` into `self`.
    ///
    /// `self` is first resized to `source.len()` (with the usual growth rules)
    /// and its elements are overwritten in order. `source` keeps its buffer and
    /// capacity, but has no live elements afterwards.
    pub fn move_assign(&mut self, source: &mut DynamicArray<T>)
    where
        T: Default,
    {
        let count = source.len;
        self.resize(count);
        source.len = 0;
        let src = source.buffer.as_ptr();
        for (i, dst) in self.as_mut_slice().iter_mut().enumerate() {
            // SAFETY: `i < count`; each source slot was live and is read once.
            *dst = unsafe { src.add(i).read() };
        }
    }

    /// Releases the buffer and the live length without dropping any element.
    pub(crate) fn into_raw_parts(self) -> (OwnedBuffer<T>, usize) {
        let mut array = std::mem::ManuallyDrop::new(self);
        (std::mem::take(&mut array.buffer), array.len)
    }

    /// Appends values from `f` until `len == new_len`. The capacity must
    /// already be sufficient.
    fn fill_within_capacity(&mut self, new_len: usize, mut f: impl FnMut() -> T) {
        debug_assert!(new_len <= self.capacity());
        while self.len < new_len {
            let value = f();
            // SAFETY: `len < new_len <= capacity`.
            unsafe { self.buffer.as_mut_ptr().add(self.len).write(value) };
            self.len += 1;
        }
    }

    #[inline]
    fn grown_capacity(&self) -> usize {
        match self.capacity() {
            0 => 1,
            capacity => capacity
                .checked_mul(2)
                .unwrap_or_else(|| capacity_overflow(capacity)),
        }
    }

    #[cold]
    fn reallocate(&mut self, new_capacity: usize) {
        self.relocate_into(OwnedBuffer::with_len(new_capacity));
    }

    /// Moves the live elements into `new_buffer` and adopts it.
    fn relocate_into(&mut self, mut new_buffer: OwnedBuffer<T>) {
        debug_assert!(new_buffer.len() >= self.len);
        // SAFETY: both buffers hold at least `len` slots and do not overlap.
        unsafe {
            ptr::copy_nonoverlapping(self.buffer.as_ptr(), new_buffer.as_mut_ptr(), self.len)
        };
        self.replace_buffer(new_buffer);
    }

    /// Adopts `new_buffer`, whose live prefix has already been populated. The
    /// old allocation is released without dropping its slots.
    fn replace_buffer(&mut self, mut new_buffer: OwnedBuffer<T>) {
        log::trace!(
            "DynamicArray reallocated: capacity {} -> {}, len {}",
            self.capacity(),
            new_buffer.len(),
            self.len
        );
        self.buffer.swap(&mut new_buffer);
        self.generation = next_generation();
    }

    #[inline]
    fn check_generation(&self, pos: Position) {
        contract_assert!(
            pos.generation() == self.generation,
            "stale position {}: the array was reallocated after it was taken",
            pos.index()
        );
    }
}

impl<T: Default> DynamicArray<T> {
    /// Creates an array of `len` default values. Length and capacity are both
    /// `len`.
    pub fn with_len(len: usize) -> DynamicArray<T> {
        DynamicArray::from_fn(len, T::default)
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Creates an array of `len` copies of `value`. Length and capacity are
    /// both `len`.
    pub fn with_value(len: usize, value: T) -> DynamicArray<T> {
        DynamicArray::from_fn(len, || value.clone())
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the live prefix is dropped; the buffer then only
        // releases its allocation.
        unsafe { ptr::drop_in_place(self.as_mut_slice() as *mut [T]) };
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Deep-copies the live elements into a buffer sized to `len()`; spare
    /// capacity is not preserved.
    fn clone(&self) -> DynamicArray<T> {
        let mut copy = DynamicArray::with_reserve(ReserveHint::new(self.len));
        for item in self.iter() {
            copy.push_back(item.clone());
        }
        copy
    }

    /// Copy-and-swap: if cloning `source` panics, `self` is left untouched.
    fn clone_from(&mut self, source: &DynamicArray<T>) {
        let mut copy = source.clone();
        self.swap(&mut copy);
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        DynamicArray::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for DynamicArray<T> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for DynamicArray<T> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Borrow<[T]> for DynamicArray<T> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> BorrowMut<[T]> for DynamicArray<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> From<ReserveHint> for DynamicArray<T> {
    fn from(hint: ReserveHint) -> Self {
        DynamicArray::with_reserve(hint)
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    /// Moves the values in order into a buffer of exactly `N` slots.
    fn from(values: [T; N]) -> Self {
        DynamicArray::from_exact_iter(values.into_iter())
    }
}

impl<T> From<Vec<T>> for DynamicArray<T> {
    fn from(values: Vec<T>) -> Self {
        DynamicArray::from_exact_iter(values.into_iter())
    }
}

impl<T: Clone> From<&[T]> for DynamicArray<T> {
    fn from(values: &[T]) -> Self {
        DynamicArray::from_exact_iter(values.iter().cloned())
    }
}

impl<T> DynamicArray<T> {
    fn from_exact_iter(values: impl ExactSizeIterator<Item = T>) -> DynamicArray<T> {
        let mut array = DynamicArray::with_reserve(ReserveHint::new(values.len()));
        for value in values {
            array.push_back(value);
        }
        array
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    /// Pre-sizes the buffer to the iterator's lower size bound, then appends.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut array = DynamicArray::with_reserve(ReserveHint::new(iter.size_hint().0));
        array.extend(iter);
        array
    }
}

impl<T> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(*value);
        }
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
