//! Font loading and measurement.
//!
//! Fonts are parsed with `fontdue`; glyph rasterization happens lazily in
//! `render::shapes::text`.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem};
