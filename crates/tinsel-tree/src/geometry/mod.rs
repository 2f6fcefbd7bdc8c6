//! Static point clouds.
//!
//! Four independent generators sample parametric shapes from an injected
//! random source. Their outputs are concatenated once into an immutable
//! [`SceneGeometry`] that the compositor re-projects every frame.

mod ground;
mod heart;
mod stars;
mod tree;

use std::fmt;

use rand::Rng;

use crate::config::SceneConfig;

pub use ground::ground_points;
pub use heart::{heart_implicit, heart_points};
pub use stars::star_points;
pub use tree::tree_points;

/// 8-bit RGB colour.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A coloured point in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Rgb,
}

impl Point3D {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, color: Rgb) -> Self {
        Self { x, y, z, color }
    }
}

/// Error raised while generating scene geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The heart's rejection sampler hit its attempt cap.
    HeartSamplingExhausted { accepted: usize, attempts: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::HeartSamplingExhausted { accepted, attempts } => write!(
                f,
                "heart sampling gave up after {attempts} attempts with {accepted} points accepted"
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Every point of the scene in generation order: tree, ground, stars, heart.
///
/// Built once and never mutated.
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    points: Box<[Point3D]>,
}

impl SceneGeometry {
    /// Runs all four generators against `rng`.
    pub fn generate<R>(config: &SceneConfig, rng: &mut R) -> Result<Self, GeometryError>
    where
        R: Rng + ?Sized,
    {
        let mut points = Vec::with_capacity(config.point_count());
        points.extend(tree_points(&config.tree, rng));
        points.extend(ground_points(&config.ground, rng));
        points.extend(star_points(&config.stars, rng));
        points.extend(heart_points(&config.heart, rng)?);
        Ok(Self::from_points(points))
    }

    pub fn from_points(points: Vec<Point3D>) -> Self {
        Self { points: points.into_boxed_slice() }
    }

    #[inline]
    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Clamps an integer colour value into a channel.
#[inline]
pub(crate) fn channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}
