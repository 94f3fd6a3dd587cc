//! Generation-stamped cursors into a [`DynamicArray`](crate::DynamicArray).

use std::sync::atomic::{AtomicU64, Ordering};

/// A cursor into a [`DynamicArray`](crate::DynamicArray).
///
/// A position is an element index stamped with the generation of the backing
/// buffer it was taken from. Every reallocation (and every exchange of
/// buffers) moves the array to a fresh generation, so a position that outlived
/// its buffer is recognized as stale by the contract checks instead of silently
/// addressing relocated memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    index: usize,
    generation: u64,
}

impl Position {
    #[inline]
    pub(crate) fn new(index: usize, generation: u64) -> Position {
        Position { index, generation }
    }

    /// The element index this position refers to.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Returns a generation number not handed out before.
#[inline]
pub(crate) fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}
