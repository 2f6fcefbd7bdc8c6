//! Per-frame compositing.
//!
//! Each frame the camera yaws by a fixed step, the snow advances by the
//! frame's `dt`, and every scene point is re-projected and painted back to
//! front. Output goes into two draw lists so the snow always lands on top of
//! points and text.

use rand::Rng;

use tinsel_engine::coords::{Rect, Vec2, Viewport};
use tinsel_engine::paint::Color;
use tinsel_engine::scene::{DrawList, ZIndex};
use tinsel_engine::text::{FontId, FontSystem};

use crate::camera::{CameraState, ProjectedPoint, Projector};
use crate::config::{OverlayParams, SceneConfig};
use crate::geometry::SceneGeometry;
use crate::snow::SnowField;

const POINT_Z: ZIndex = ZIndex::new(0);
const TEXT_Z: ZIndex = ZIndex::new(1);

/// Draw lists filled by [`Compositor::frame`].
#[derive(Debug, Default)]
pub struct FrameLayers {
    /// Depth-sorted points, then the greeting text.
    pub scene: DrawList,
    /// Snow glow, painted after `scene`.
    pub overlay: DrawList,
}

impl FrameLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.scene.clear();
        self.overlay.clear();
    }
}

/// Owns the per-frame state: camera yaw, snow, and the projection buffer.
pub struct Compositor {
    geometry: SceneGeometry,
    projector: Projector,
    camera: CameraState,
    rotation_step: f32,
    snow: SnowField,
    overlay: OverlayParams,

    // Reused every frame; sized to the scene on construction.
    projected: Vec<ProjectedPoint>,
}

impl Compositor {
    pub fn new<R>(geometry: SceneGeometry, config: &SceneConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let projected = Vec::with_capacity(geometry.len());
        Self {
            projector: Projector::new(config.camera, config.screen),
            camera: CameraState::default(),
            rotation_step: config.rotation_step,
            snow: SnowField::new(config.snow, config.screen, rng),
            overlay: config.overlay.clone(),
            geometry,
            projected,
        }
    }

    #[inline]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    #[inline]
    pub fn snow(&self) -> &SnowField {
        &self.snow
    }

    #[inline]
    pub fn geometry(&self) -> &SceneGeometry {
        &self.geometry
    }

    /// Points that survived culling in the last frame, farthest first.
    #[inline]
    pub fn last_projection(&self) -> &[ProjectedPoint] {
        &self.projected
    }

    /// Renders one frame into `layers`, replacing their previous contents.
    ///
    /// Text is only recorded when `font` is set.
    pub fn frame<R>(
        &mut self,
        dt: f32,
        rng: &mut R,
        layers: &mut FrameLayers,
        fonts: &FontSystem,
        font: Option<FontId>,
    ) where
        R: Rng + ?Sized,
    {
        layers.clear();

        // Rotation is per frame, not per second.
        self.camera.advance(self.rotation_step);
        self.snow.update(dt, rng);

        self.project();
        self.record_points(&mut layers.scene);

        if let Some(font) = font {
            self.record_text(&mut layers.scene, fonts, font);
        }

        self.snow.render(&mut layers.overlay);
    }

    fn project(&mut self) {
        let angle = self.camera.angle();
        let projector = &self.projector;

        self.projected.clear();
        self.projected.extend(
            self.geometry
                .points()
                .iter()
                .filter_map(|p| projector.project(p, angle)),
        );

        // Stable: equal depths keep generation order.
        self.projected.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    }

    fn record_points(&self, list: &mut DrawList) {
        let bounds = self.projector.screen().bounds();
        list.reserve(self.projected.len());

        for p in self.projected.iter().filter(|p| on_screen(bounds, p)) {
            let c = p.color;
            list.push_circle(
                POINT_Z,
                Vec2::new(p.screen_x as f32, p.screen_y as f32),
                p.size as f32,
                Color::from_rgba_u8(c.r, c.g, c.b, 255),
            );
        }
    }

    fn record_text(&self, list: &mut DrawList, fonts: &FontSystem, font: FontId) {
        let o = &self.overlay;
        let top = text_top(self.projector.screen());
        let title_height = fonts.measure_text(&o.title, font, o.font_size).y;

        list.push_text(
            TEXT_Z,
            o.title.as_str(),
            font,
            o.font_size,
            Color::white(),
            Vec2::new(o.left, top),
        );
        list.push_text(
            TEXT_Z,
            o.subtitle.as_str(),
            font,
            o.font_size,
            Color::white(),
            Vec2::new(o.left, top + title_height + o.line_gap),
        );
    }
}

/// Half-open test against the visible frame.
#[inline]
fn on_screen(bounds: Rect, p: &ProjectedPoint) -> bool {
    bounds.contains(Vec2::new(p.screen_x as f32, p.screen_y as f32))
}

/// Top of the title line: a third of the way down, in whole pixels.
#[inline]
fn text_top(screen: Viewport) -> f32 {
    (screen.height / 3.0).floor()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use tinsel_engine::scene::DrawCmd;

    use super::*;
    use crate::config::{GroundParams, HeartParams, StarParams, TreeParams};
    use crate::geometry::{Point3D, Rgb};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(77)
    }

    fn marker(i: u8) -> Rgb {
        Rgb::new(i, 0, 0)
    }

    fn compositor(points: Vec<Point3D>) -> Compositor {
        Compositor::new(SceneGeometry::from_points(points), &SceneConfig::default(), &mut rng())
    }

    fn run_frame(c: &mut Compositor) -> FrameLayers {
        let mut layers = FrameLayers::new();
        c.frame(1.0 / 60.0, &mut rng(), &mut layers, &FontSystem::new(), None);
        layers
    }

    fn circle_colors(list: &DrawList) -> Vec<Color> {
        list.items()
            .iter()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Circle(c) => Some(c.color),
                _ => None,
            })
            .collect()
    }

    // ── painter's order ───────────────────────────────────────────────────

    #[test]
    fn draws_farthest_first() {
        // On the centre line, depth grows with z.
        let mut c = compositor(vec![
            Point3D::new(0.0, 0.0, -2.0, marker(1)),
            Point3D::new(0.0, 0.0, 4.0, marker(2)),
            Point3D::new(0.0, 0.0, 1.0, marker(3)),
            Point3D::new(0.0, 0.0, 3.0, marker(4)),
        ]);
        let layers = run_frame(&mut c);

        let expected: Vec<Color> = [2, 4, 3, 1]
            .into_iter()
            .map(|i| Color::from_rgba_u8(i, 0, 0, 255))
            .collect();
        assert_eq!(circle_colors(&layers.scene), expected);

        let depths: Vec<f32> = c.last_projection().iter().map(|p| p.depth).collect();
        assert!(depths.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn full_scene_is_depth_sorted() {
        let cfg = SceneConfig {
            tree: TreeParams { count: 2_000, ..TreeParams::default() },
            ground: GroundParams { count: 200, ..GroundParams::default() },
            stars: StarParams { count: 100, ..StarParams::default() },
            heart: HeartParams { count: 50, max_attempts: 50 * 64, ..HeartParams::default() },
            ..SceneConfig::default()
        };
        let mut r = rng();
        let geo = SceneGeometry::generate(&cfg, &mut r).unwrap();
        let mut c = Compositor::new(geo, &cfg, &mut r);

        let mut layers = FrameLayers::new();
        for _ in 0..3 {
            c.frame(1.0 / 60.0, &mut r, &mut layers, &FontSystem::new(), None);
            let proj = c.last_projection();
            assert!(proj.windows(2).all(|w| w[0].depth >= w[1].depth));

            let on_screen = proj
                .iter()
                .filter(|p| on_screen(cfg.screen.bounds(), p))
                .count();
            assert_eq!(layers.scene.len(), on_screen);
        }
    }

    #[test]
    fn equal_depths_keep_generation_order() {
        let mut c = compositor(vec![
            Point3D::new(0.0, 0.0, 0.0, marker(1)),
            Point3D::new(0.0, 0.0, 0.0, marker(2)),
            Point3D::new(0.0, 0.0, 0.0, marker(3)),
        ]);
        let layers = run_frame(&mut c);
        let reds: Vec<f32> = circle_colors(&layers.scene).iter().map(|c| c.r).collect();
        assert!(reds.windows(2).all(|w| w[0] < w[1]));
    }

    // ── culling and bounds ────────────────────────────────────────────────

    #[test]
    fn culled_points_leave_the_projection() {
        let mut c = compositor(vec![
            Point3D::new(0.0, 0.0, 0.0, marker(1)),
            Point3D::new(0.0, 0.0, -20.0, marker(2)),
        ]);
        let layers = run_frame(&mut c);
        assert_eq!(c.last_projection().len(), 1);
        assert_eq!(layers.scene.len(), 1);
    }

    #[test]
    fn off_screen_points_are_projected_but_not_drawn() {
        let mut c = compositor(vec![
            Point3D::new(0.0, 0.0, 0.0, marker(1)),
            Point3D::new(100.0, 0.0, 0.0, marker(2)),
        ]);
        let layers = run_frame(&mut c);
        assert_eq!(c.last_projection().len(), 2);
        assert_eq!(circle_colors(&layers.scene), vec![Color::from_rgba_u8(1, 0, 0, 255)]);
    }

    #[test]
    fn circle_radius_is_the_point_size() {
        let mut c = compositor(vec![Point3D::new(0.0, 0.0, 0.0, marker(1))]);
        let layers = run_frame(&mut c);
        let DrawCmd::Circle(cmd) = &layers.scene.items()[0].cmd else {
            panic!("expected a circle");
        };
        assert_eq!(cmd.radius, c.last_projection()[0].size as f32);
    }

    // ── frame state ───────────────────────────────────────────────────────

    #[test]
    fn camera_advances_once_per_frame() {
        let mut c = compositor(Vec::new());
        run_frame(&mut c);
        run_frame(&mut c);
        assert!((c.camera().angle() - 0.009).abs() < 1e-6);
    }

    #[test]
    fn snow_goes_to_the_overlay_only() {
        let mut c = compositor(Vec::new());
        let layers = run_frame(&mut c);

        assert!(layers.scene.is_empty());
        // Fresh flakes are at full alpha: five glow layers each.
        assert_eq!(layers.overlay.len(), c.snow().len() * 5);
    }

    #[test]
    fn layers_are_replaced_each_frame() {
        let mut c = compositor(vec![Point3D::new(0.0, 0.0, 0.0, marker(1))]);
        let mut layers = FrameLayers::new();
        let fonts = FontSystem::new();
        let mut r = rng();
        c.frame(0.016, &mut r, &mut layers, &fonts, None);
        c.frame(0.016, &mut r, &mut layers, &fonts, None);
        assert_eq!(layers.scene.len(), 1);
        assert_eq!(layers.overlay.len(), 50);
        assert_eq!(c.geometry().len(), 1);
    }

    #[test]
    fn frame_edges_are_half_open() {
        let bounds = Viewport::new(1600.0, 900.0).bounds();
        let at = |x, y| ProjectedPoint { screen_x: x, screen_y: y, depth: 1.0, size: 1, color: marker(0) };
        assert!(on_screen(bounds, &at(0, 0)));
        assert!(on_screen(bounds, &at(1599, 899)));
        assert!(!on_screen(bounds, &at(1600, 0)));
        assert!(!on_screen(bounds, &at(0, 900)));
        assert!(!on_screen(bounds, &at(-1, 10)));
    }

    #[test]
    fn title_sits_a_third_down() {
        assert_eq!(text_top(Viewport::new(1600.0, 900.0)), 300.0);
        assert_eq!(text_top(Viewport::new(800.0, 601.0)), 200.0);
    }
}
