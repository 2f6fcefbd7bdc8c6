//! Screen-space falling snow.
//!
//! A fixed set of flakes falls at constant speed, fades as its life runs out
//! and is respawned in place above the top edge. Each flake is drawn as a
//! soft glow of concentric circles.

use rand::Rng;

use tinsel_engine::coords::{Vec2, Viewport};
use tinsel_engine::paint::Color;
use tinsel_engine::scene::{DrawList, ZIndex};

use crate::config::SnowParams;

/// Glow layers from the outside in: radius factor and alpha divisor.
const GLOW_LAYERS: [(f32, u8); 5] = [(1.3, 20), (1.0, 12), (0.75, 6), (0.55, 3), (0.45, 1)];

/// Flakes are recycled once they fall this far below the bottom edge.
const BOTTOM_MARGIN: f32 = 50.0;
/// Life is sized to carry a flake this far below the bottom edge.
const TRAVEL_MARGIN: f32 = 80.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SnowFlake {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Fall speed in px/s.
    pub speed: f32,
    /// Seconds remaining.
    pub life: f32,
    pub max_life: f32,
}

impl SnowFlake {
    /// Spawns a flake above the top edge.
    pub fn spawn<R>(params: &SnowParams, screen: Viewport, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let x = rng.gen_range(0.0..=screen.width);
        let y = rng.gen_range(params.spawn_min_y..=params.spawn_max_y);
        let radius = rng.gen_range(params.min_radius..=params.max_radius);
        let speed = rng.gen_range(params.min_speed..=params.max_speed);
        let life = (screen.height + TRAVEL_MARGIN - y) / speed;
        Self { x, y, radius, speed, life, max_life: life }
    }

    /// Overwrites every field with a fresh spawn.
    pub fn respawn<R>(&mut self, params: &SnowParams, screen: Viewport, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        *self = Self::spawn(params, screen, rng);
    }

    /// Opacity of the flake's core: full until `fade_phase` of its life is
    /// left, then a linear ramp down to zero.
    ///
    /// `None` for a flake with no lifetime.
    pub fn alpha(&self, fade_phase: f32) -> Option<u8> {
        if self.max_life <= 0.0 {
            return None;
        }
        let phase = self.life / self.max_life;
        if phase > fade_phase {
            return Some(255);
        }
        Some(((255.0 * phase / fade_phase) as i32).clamp(0, 255) as u8)
    }
}

#[derive(Debug, Clone)]
pub struct SnowField {
    params: SnowParams,
    screen: Viewport,
    flakes: Vec<SnowFlake>,
}

impl SnowField {
    pub fn new<R>(params: SnowParams, screen: Viewport, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let flakes = (0..params.count)
            .map(|_| SnowFlake::spawn(&params, screen, rng))
            .collect();
        Self { params, screen, flakes }
    }

    /// Builds a field around existing flakes.
    pub fn from_flakes(params: SnowParams, screen: Viewport, flakes: Vec<SnowFlake>) -> Self {
        Self { params, screen, flakes }
    }

    #[inline]
    pub fn flakes(&self) -> &[SnowFlake] {
        &self.flakes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }

    /// Respawns the flake at `index`; out-of-range indices are ignored.
    pub fn respawn<R>(&mut self, index: usize, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        if let Some(flake) = self.flakes.get_mut(index) {
            flake.respawn(&self.params, self.screen, rng);
        }
    }

    /// Advances every flake by `dt` seconds, recycling the ones that ran out
    /// of life or left the screen.
    pub fn update<R>(&mut self, dt: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let floor = self.screen.height + BOTTOM_MARGIN;
        for flake in &mut self.flakes {
            let y = flake.y + flake.speed * dt;
            let life = flake.life - dt;
            if life <= 0.0 || y > floor {
                flake.respawn(&self.params, self.screen, rng);
            } else {
                flake.y = y;
                flake.life = life;
            }
        }
    }

    /// Records the glow circles of every flake, outermost layer first.
    pub fn render(&self, list: &mut DrawList) {
        for flake in &self.flakes {
            let Some(alpha) = flake.alpha(self.params.fade_phase) else { continue };
            // Glows sit on whole pixels.
            let center = Vec2::new(flake.x as i32 as f32, flake.y as i32 as f32);

            for (k, div) in GLOW_LAYERS {
                let a = alpha / div;
                if a == 0 {
                    continue;
                }
                let radius = ((flake.radius * k) as i32).max(1) as f32;
                let color = Color::from_rgba_u8(255, 255, 255, a);
                list.push_circle(ZIndex::default(), center, radius, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use tinsel_engine::scene::DrawCmd;

    use super::*;
    use crate::config::SCREEN;

    fn field(seed: u64) -> (SnowField, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let f = SnowField::new(SnowParams::default(), SCREEN, &mut rng);
        (f, rng)
    }

    fn flake(life: f32, max_life: f32) -> SnowFlake {
        SnowFlake { x: 100.0, y: 200.0, radius: 10.0, speed: 40.0, life, max_life }
    }

    fn assert_fresh(f: &SnowFlake) {
        assert!((-80.0..=-10.0).contains(&f.y));
        assert!((10.0..=16.0).contains(&f.radius));
        assert!((30.0..=45.0).contains(&f.speed));
        assert!((0.0..=1600.0).contains(&f.x));
        assert_eq!(f.life, f.max_life);
        let expected = (900.0 + 80.0 - f.y) / f.speed;
        assert!((f.max_life - expected).abs() < 1e-4);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_spawns_above_the_top_edge() {
        let (f, _) = field(41);
        assert_eq!(f.len(), 10);
        f.flakes().iter().for_each(assert_fresh);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let (mut f, mut rng) = field(42);
        let before = f.flakes().to_vec();
        f.update(0.0, &mut rng);
        assert_eq!(f.flakes(), before.as_slice());
    }

    #[test]
    fn update_falls_and_ages() {
        let (mut f, mut rng) = field(43);
        let before = f.flakes().to_vec();
        f.update(0.5, &mut rng);
        for (a, b) in before.iter().zip(f.flakes()) {
            assert_eq!(a.x, b.x);
            assert!((b.y - (a.y + a.speed * 0.5)).abs() < 1e-4);
            assert!((b.life - (a.life - 0.5)).abs() < 1e-4);
        }
    }

    #[test]
    fn large_dt_respawns_every_flake() {
        let (mut f, mut rng) = field(44);
        let before = f.flakes().to_vec();
        f.update(1_000.0, &mut rng);
        assert_eq!(f.len(), 10);
        f.flakes().iter().for_each(assert_fresh);

        for (a, b) in before.iter().zip(f.flakes()) {
            assert_ne!(a.x, b.x);
            assert_ne!(a.y, b.y);
            assert_ne!(a.radius, b.radius);
            assert_ne!(a.speed, b.speed);
        }
    }

    #[test]
    fn falling_past_the_bottom_respawns() {
        let mut rng = StdRng::seed_from_u64(45);
        let mut low = flake(100.0, 100.0);
        low.y = 949.0;
        let mut f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![low]);
        f.update(0.1, &mut rng);
        assert_fresh(&f.flakes()[0]);
    }

    #[test]
    fn respawn_by_index() {
        let mut rng = StdRng::seed_from_u64(46);
        let mut f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![flake(1.0, 9.0)]);
        f.respawn(0, &mut rng);
        f.respawn(7, &mut rng);
        assert_fresh(&f.flakes()[0]);
    }

    // ── fade ──────────────────────────────────────────────────────────────

    #[test]
    fn alpha_is_full_then_ramps() {
        assert_eq!(flake(10.0, 10.0).alpha(0.3), Some(255));
        assert_eq!(flake(3.5, 10.0).alpha(0.3), Some(255));
        assert_eq!(flake(1.5, 10.0).alpha(0.3), Some(127));
        assert_eq!(flake(0.0, 10.0).alpha(0.3), Some(0));
        assert_eq!(flake(-1.0, 10.0).alpha(0.3), Some(0));
        assert_eq!(flake(1.0, 0.0).alpha(0.3), None);
    }

    // ── glow ──────────────────────────────────────────────────────────────

    fn circles(list: &DrawList) -> Vec<(f32, f32)> {
        list.items()
            .iter()
            .filter_map(|item| match &item.cmd {
                DrawCmd::Circle(c) => Some((c.radius, c.color.a)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_flake_draws_five_layers_outside_in() {
        let f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![flake(10.0, 10.0)]);
        let mut list = DrawList::new();
        f.render(&mut list);

        let got = circles(&list);
        let radii: Vec<f32> = got.iter().map(|c| c.0).collect();
        assert_eq!(radii, vec![13.0, 10.0, 7.0, 5.0, 4.0]);

        let alphas: Vec<u8> = got.iter().map(|c| (c.1 * 255.0).round() as u8).collect();
        assert_eq!(alphas, vec![12, 21, 42, 85, 255]);
    }

    #[test]
    fn faint_layers_are_skipped() {
        // Core alpha 10: the two outer layers round down to zero.
        let life = 10.0 / 255.0 * 0.3 * 10.0 + 1e-4;
        let f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![flake(life, 10.0)]);
        let mut list = DrawList::new();
        f.render(&mut list);
        assert_eq!(circles(&list).len(), 3);
    }

    #[test]
    fn dead_flakes_draw_nothing() {
        let f = SnowField::from_flakes(
            SnowParams::default(),
            SCREEN,
            vec![flake(0.0, 10.0), flake(5.0, 0.0)],
        );
        let mut list = DrawList::new();
        f.render(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn glow_centres_truncate_to_whole_pixels() {
        let mut off_grid = flake(10.0, 10.0);
        off_grid.x = 100.7;
        off_grid.y = -15.6;
        let f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![off_grid]);
        let mut list = DrawList::new();
        f.render(&mut list);

        for item in list.items() {
            let DrawCmd::Circle(c) = &item.cmd else { panic!("expected a circle") };
            assert_eq!(c.center, Vec2::new(100.0, -15.0));
        }
    }

    #[test]
    fn small_flakes_keep_a_one_pixel_core() {
        let mut tiny = flake(10.0, 10.0);
        tiny.radius = 1.0;
        let f = SnowField::from_flakes(SnowParams::default(), SCREEN, vec![tiny]);
        let mut list = DrawList::new();
        f.render(&mut list);
        assert!(circles(&list).iter().all(|c| c.0 >= 1.0));
    }
}
