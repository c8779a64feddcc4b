//! Bump arena for recursion-frame temporaries.
//!
//! Uses bumpalo for O(1) allocation of the quadrant products and scratch
//! buffers a Strassen frame needs. The whole frame is released in one step
//! when the arena is reset or dropped.

use bumpalo::Bump;

/// Arena owning the temporaries of one recursion frame.
///
/// Every slice handed out lives exactly as long as the arena; no individual
/// deallocation exists, so mismatched alloc/free pairs are impossible.
pub struct FrameArena {
    bump: Bump,
}

impl FrameArena {
    /// Create a new arena with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create a new arena with the given initial capacity in bytes.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bump: Bump::with_capacity(bytes),
        }
    }

    /// Allocate a zero-filled n×n matrix buffer.
    pub fn alloc_matrix(&self, n: usize) -> &mut [f64] {
        self.bump.alloc_slice_fill_copy(n * n, 0.0)
    }

    /// Reset the arena, releasing every frame temporary at once.
    pub fn reset(&mut self) {
        self.bump.reset();
    }

    /// Get the number of bytes currently allocated.
    #[must_use]
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::new()
    }
}
