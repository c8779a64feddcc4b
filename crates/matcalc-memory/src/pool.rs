//! Thread-local pool of frame arenas.
//!
//! Strassen recursion acquires one arena per frame. Pooling the arenas per
//! thread means repeated multiplications reuse the same chunks instead of
//! allocating fresh ones, so memory usage stays stable across many calls.

use std::cell::RefCell;

use crate::arena::FrameArena;

const THREAD_LOCAL_POOL_MAX: usize = 8;

thread_local! {
    static FRAME_POOL: RefCell<Vec<FrameArena>> = const { RefCell::new(Vec::new()) };
}

/// Acquire an arena from the thread-local pool, or create a new one.
fn acquire(capacity: usize) -> FrameArena {
    FRAME_POOL.with(|pool| {
        pool.borrow_mut()
            .pop()
            .unwrap_or_else(|| FrameArena::with_capacity(capacity))
    })
}

/// Reset an arena and return it to the thread-local pool.
fn release(mut arena: FrameArena) {
    arena.reset();
    FRAME_POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if pool.len() < THREAD_LOCAL_POOL_MAX {
            pool.push(arena);
        }
    });
}

/// Run `f` with a pooled frame arena.
///
/// The arena is reset and returned to the pool when `f` completes, whether
/// `f` succeeded or bubbled an error; nothing allocated inside the frame
/// survives it.
pub fn with_frame<R>(capacity: usize, f: impl FnOnce(&FrameArena) -> R) -> R {
    let arena = acquire(capacity);
    let result = f(&arena);
    release(arena);
    result
}

/// Number of arenas currently parked in this thread's pool.
#[must_use]
pub fn pooled() -> usize {
    FRAME_POOL.with(|pool| pool.borrow().len())
}
