//! Startup constants for the scene.
//!
//! Everything is plain data with a `Default` that reproduces the shipped
//! scene; tests shrink the counts.

use std::f32::consts::TAU;

use tinsel_engine::coords::Viewport;

/// Window size the scene is laid out for, in logical pixels.
pub const SCREEN: Viewport = Viewport::new(1600.0, 900.0);

/// Conical tree made of a spiral light band and a fluffy fill.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TreeParams {
    pub count: usize,
    pub height: f32,
    /// Share of points on the spiral band; the rest are fill.
    pub spiral_share: f32,
    /// Full turns of the spiral from base to tip.
    pub loops: f32,
    pub angle_jitter: f32,
    pub spiral_radius: f32,
    pub fill_radius: f32,
    pub ornament_chance: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            count: 50_000,
            height: 12.0,
            spiral_share: 0.7,
            loops: 9.0,
            angle_jitter: 0.22,
            spiral_radius: 3.2,
            fill_radius: 4.3,
            ornament_chance: 0.08,
        }
    }
}

impl TreeParams {
    /// Number of spiral points; the remainder of `count` is fill.
    #[inline]
    pub fn spiral_count(&self) -> usize {
        (self.count as f32 * self.spiral_share) as usize
    }

    pub fn loop_angle(&self) -> f32 {
        self.loops * TAU
    }
}

/// Concentric rings on the floor around the trunk.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundParams {
    pub count: usize,
    pub rings: Vec<f32>,
    pub ring_sigma: f32,
    pub y: f32,
    pub bright_chance: f64,
}

impl Default for GroundParams {
    fn default() -> Self {
        Self {
            count: 4_000,
            rings: vec![4.6, 6.0, 7.4, 8.8, 10.2, 11.4],
            ring_sigma: 0.3,
            y: -0.25,
            bright_chance: 0.15,
        }
    }
}

/// Floating lights in a box around the scene.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StarParams {
    pub count: usize,
    /// Half extent of the box along x and z.
    pub half_extent: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for StarParams {
    fn default() -> Self {
        Self {
            count: 1_200,
            half_extent: 18.0,
            min_y: 3.0,
            max_y: 18.0,
        }
    }
}

/// Heart ornament on top of the tree.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeartParams {
    pub count: usize,
    pub scale: f32,
    /// World height of the heart's lowest sample row.
    pub top_y: f32,
    pub depth_jitter: f32,
    /// Rejection sampling gives up after this many draws.
    pub max_attempts: usize,
}

impl Default for HeartParams {
    fn default() -> Self {
        let count = 1_000;
        Self {
            count,
            scale: 0.9,
            top_y: TreeParams::default().height + 0.05,
            depth_jitter: 0.18,
            max_attempts: count * 64,
        }
    }
}

/// Fixed-pitch orbiting camera.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraParams {
    pub distance: f32,
    pub height: f32,
    pub pitch: f32,
    /// Focal length as a fraction of screen height.
    pub focal: f32,
    pub near: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            distance: 13.0,
            height: 6.0,
            pitch: -0.25,
            focal: 0.63,
            near: 0.1,
        }
    }
}

/// Screen-space snow overlay.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SnowParams {
    pub count: usize,
    pub spawn_min_y: f32,
    pub spawn_max_y: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Fall speed range in px/s.
    pub min_speed: f32,
    pub max_speed: f32,
    /// Life fraction below which a flake fades.
    pub fade_phase: f32,
}

impl Default for SnowParams {
    fn default() -> Self {
        Self {
            count: 10,
            spawn_min_y: -80.0,
            spawn_max_y: -10.0,
            min_radius: 10.0,
            max_radius: 16.0,
            min_speed: 30.0,
            max_speed: 45.0,
            fade_phase: 0.3,
        }
    }
}

/// Static greeting text.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayParams {
    pub title: String,
    pub subtitle: String,
    pub font_size: f32,
    pub left: f32,
    /// Gap between the title and the subtitle.
    pub line_gap: f32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            title: "Merry Christmas".to_string(),
            subtitle: "647".to_string(),
            font_size: 45.0,
            left: 40.0,
            line_gap: 10.0,
        }
    }
}

/// Every startup constant of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub screen: Viewport,
    pub tree: TreeParams,
    pub ground: GroundParams,
    pub stars: StarParams,
    pub heart: HeartParams,
    pub camera: CameraParams,
    pub snow: SnowParams,
    pub overlay: OverlayParams,
    /// Camera yaw added per rendered frame, in radians.
    pub rotation_step: f32,
    pub target_fps: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            screen: SCREEN,
            tree: TreeParams::default(),
            ground: GroundParams::default(),
            stars: StarParams::default(),
            heart: HeartParams::default(),
            camera: CameraParams::default(),
            snow: SnowParams::default(),
            overlay: OverlayParams::default(),
            rotation_step: 0.0045,
            target_fps: 60,
        }
    }
}

impl SceneConfig {
    /// Total number of 3D points the scene generates.
    pub fn point_count(&self) -> usize {
        self.tree.count + self.ground.count + self.stars.count + self.heart.count
    }
}
