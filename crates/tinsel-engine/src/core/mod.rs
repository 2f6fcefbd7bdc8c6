//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the scene driving it: an [`App`] receives one [`FrameCtx`] per paced frame.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
