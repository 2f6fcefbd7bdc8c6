//! Rotating particle Christmas tree.
//!
//! Point clouds are generated once at startup ([`geometry`]) and re-projected
//! every frame through a slowly orbiting camera ([`camera`]). The
//! [`compositor`] depth-sorts the projection and records it, together with a
//! falling-snow overlay ([`snow`]), into engine draw lists that [`app`] hands
//! to the GPU renderers.

pub mod app;
pub mod camera;
pub mod compositor;
pub mod config;
pub mod geometry;
pub mod snow;
