//! Orbiting perspective camera.
//!
//! The camera yaws around the vertical axis at a fixed pitch, pulled back and
//! raised from the origin. [`Projector`] maps a world point to integer screen
//! pixels plus a view-space depth used for painter's ordering.

use std::f32::consts::TAU;

use tinsel_engine::coords::Viewport;

use crate::config::CameraParams;
use crate::geometry::{Point3D, Rgb};

/// Current yaw of the camera in radians, kept in `[0, 2π)`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct CameraState {
    angle: f32,
}

impl CameraState {
    pub fn new(angle: f32) -> Self {
        let mut state = Self::default();
        state.advance(angle);
        state
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Adds `step` to the yaw and wraps the result.
    pub fn advance(&mut self, step: f32) {
        let a = (self.angle + step).rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU.
        self.angle = if a >= TAU { 0.0 } else { a };
    }
}

/// A point projected for one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub screen_x: i32,
    pub screen_y: i32,
    /// View-space distance; larger is farther.
    pub depth: f32,
    /// Circle radius in pixels.
    pub size: i32,
    pub color: Rgb,
}

/// Draw size for a point at `depth`: nearer points are larger, never below 1.
#[inline]
pub fn point_size(depth: f32) -> i32 {
    ((3.6 - depth * 0.13).round() as i32).max(1)
}

/// Perspective projector with the pitch rotation precomputed.
#[derive(Debug, Clone)]
pub struct Projector {
    params: CameraParams,
    screen: Viewport,
    pitch_sin: f32,
    pitch_cos: f32,
    focal_px: f32,
}

impl Projector {
    pub fn new(params: CameraParams, screen: Viewport) -> Self {
        let (pitch_sin, pitch_cos) = params.pitch.sin_cos();
        Self {
            params,
            screen,
            pitch_sin,
            pitch_cos,
            focal_px: screen.height * params.focal,
        }
    }

    pub fn screen(&self) -> Viewport {
        self.screen
    }

    /// Projects `point` for a camera yawed by `angle`.
    ///
    /// Returns `None` when the point is at or behind the near plane.
    /// Screen coordinates are truncated toward zero.
    pub fn project(&self, point: &Point3D, angle: f32) -> Option<ProjectedPoint> {
        let (sa, ca) = angle.sin_cos();
        let xz = point.x * ca - point.z * sa;
        let zz = point.x * sa + point.z * ca;

        let mut yp = point.y * self.pitch_cos - zz * self.pitch_sin;
        let mut zp = point.y * self.pitch_sin + zz * self.pitch_cos;

        zp += self.params.distance;
        yp -= self.params.height;

        if zp <= self.params.near {
            return None;
        }

        let f = self.focal_px / zp;
        let sx = self.screen.width / 2.0 + xz * f;
        let sy = self.screen.height / 2.0 - yp * f;

        Some(ProjectedPoint {
            screen_x: sx as i32,
            screen_y: sy as i32,
            depth: zp,
            size: point_size(zp),
            color: point.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SCREEN;

    const WHITE: Rgb = Rgb::new(255, 255, 255);

    fn projector() -> Projector {
        Projector::new(CameraParams::default(), SCREEN)
    }

    // ── CameraState ───────────────────────────────────────────────────────

    #[test]
    fn advance_wraps_into_one_turn() {
        let mut cam = CameraState::default();
        cam.advance(TAU - 0.001);
        cam.advance(0.002);
        assert!((cam.angle() - 0.001).abs() < 1e-4);

        cam.advance(-0.002);
        assert!(cam.angle() >= 0.0 && cam.angle() < TAU);
        assert!((cam.angle() - (TAU - 0.001)).abs() < 1e-4);
    }

    #[test]
    fn many_small_steps_stay_bounded() {
        let mut cam = CameraState::new(0.0);
        for _ in 0..100_000 {
            cam.advance(0.0045);
            assert!(cam.angle() >= 0.0 && cam.angle() < TAU);
        }
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn origin_at_zero_yaw() {
        // Pitch rotates the origin to itself; the camera then sits 13 back
        // and 6 up, so f = 900 * 0.63 / 13.
        let p = projector()
            .project(&Point3D::new(0.0, 0.0, 0.0, WHITE), 0.0)
            .unwrap();
        assert_eq!(p.screen_x, 800);
        assert_eq!(p.screen_y, 711);
        assert!((p.depth - 13.0).abs() < 1e-5);
        assert_eq!(p.size, 2);
        assert_eq!(p.color, WHITE);
    }

    #[test]
    fn yaw_rotates_around_the_vertical_axis() {
        let pr = projector();
        let pt = Point3D::new(2.0, 0.0, 0.0, WHITE);

        let a = pr.project(&pt, 0.0).unwrap();
        assert!(a.screen_x > 800);

        // Half a turn mirrors x across the centre line.
        let b = pr.project(&pt, std::f32::consts::PI).unwrap();
        assert!(b.screen_x < 800);
        assert!((a.depth - b.depth).abs() < 1e-4);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let pr = projector();
        assert!(pr.project(&Point3D::new(0.0, 0.0, -20.0, WHITE), 0.0).is_none());
    }

    #[test]
    fn near_plane_culls_close_points() {
        // With zero pitch the depth is z + distance.
        let params = CameraParams { pitch: 0.0, ..CameraParams::default() };
        let pr = Projector::new(params, SCREEN);
        assert!(pr.project(&Point3D::new(0.0, 0.0, -12.95, WHITE), 0.0).is_none());
        assert!(pr.project(&Point3D::new(0.0, 0.0, -12.5, WHITE), 0.0).is_some());
    }

    #[test]
    fn coordinates_truncate_toward_zero() {
        // Far to the left the x coordinate goes negative and must not floor.
        let params = CameraParams { pitch: 0.0, height: 0.0, ..CameraParams::default() };
        let pr = Projector::new(params, SCREEN);
        let p = pr.project(&Point3D::new(-18.4, 0.0, 0.0, WHITE), 0.0).unwrap();
        let exact = 800.0 - 18.4 * (900.0 * 0.63 / 13.0);
        assert_eq!(p.screen_x, exact as i32);
        assert!(exact < 0.0);
    }

    #[test]
    fn seeded_tree_projects_to_recorded_pixels() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        use crate::config::TreeParams;
        use crate::geometry::tree_points;

        let params = TreeParams { count: 100, ..TreeParams::default() };
        let pts = tree_points(&params, &mut StdRng::seed_from_u64(2024));
        let pr = projector();

        let pixels: Vec<(i32, i32)> = pts
            .iter()
            .map(|p| {
                let q = pr.project(p, 0.0).expect("tree points sit in front of the camera");
                (q.screen_x, q.screen_y)
            })
            .collect();

        assert_eq!(pixels.len(), 100);
        assert_eq!(&pixels[..3], &[(872, 599), (859, 481), (768, 287)]);
        assert!(pixels.iter().all(|&(x, y)| (0..1600).contains(&x) && (0..900).contains(&y)));
    }

    // ── size rule ─────────────────────────────────────────────────────────

    #[test]
    fn size_shrinks_with_depth_and_floors_at_one() {
        assert_eq!(point_size(0.2), 4);
        assert_eq!(point_size(10.0), 2);
        assert_eq!(point_size(13.0), 2);
        assert_eq!(point_size(20.0), 1);
        assert_eq!(point_size(200.0), 1);
    }
}
