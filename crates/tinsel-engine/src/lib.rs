//! Tinsel engine crate.
//!
//! Owns the platform side of a particle scene: the window and its paced
//! frame loop, the GPU surface, and the renderers that turn a recorded
//! draw stream into filled circles and text.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
pub mod text;
