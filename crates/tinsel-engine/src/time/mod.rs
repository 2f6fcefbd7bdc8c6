//! Time subsystem.
//!
//! Provides frame timing and pacing without coupling to the runtime:
//! - one `FrameClock` per render loop
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - ask `next_deadline()` when the loop should wake for the next frame

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
