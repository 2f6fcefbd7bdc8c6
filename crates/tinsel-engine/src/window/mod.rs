//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, wires them to the GPU layer,
//! and paces redraws with the frame clock.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
