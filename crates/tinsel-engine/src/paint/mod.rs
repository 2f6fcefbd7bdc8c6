//! Colour model shared between scene code and renderers.
//!
//! Colours are stored premultiplied; the circle and text pipelines blend with
//! `One, OneMinusSrcAlpha`.

pub mod color;

pub use color::Color;
