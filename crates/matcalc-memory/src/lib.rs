//! # matcalc-memory
//!
//! Memory management for the `MatCalc` workspace.
//!
//! Provides bump arenas scoped to one recursion frame and a thread-local
//! arena pool that keeps steady-state allocation flat across repeated
//! multiplications.
#![warn(missing_docs)]

pub mod arena;
pub mod pool;

pub use arena::FrameArena;
pub use pool::with_frame;
