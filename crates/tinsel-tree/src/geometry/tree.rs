use std::f32::consts::TAU;

use rand::Rng;

use super::{channel, Point3D, Rgb};
use crate::config::TreeParams;

/// Tree trunk base height above the ground plane.
const BASE_Y: f32 = 0.2;
/// Positional jitter applied to fill points on every axis.
const FILL_JITTER: f32 = 0.08;

/// Generates the tree: a spiral light band followed by the fill population.
///
/// Heights are biased toward the base (`u^1.6` for the band, `u^1.9` for the
/// fill) and the radius narrows toward the tip with periodic branch rings.
pub fn tree_points<R>(params: &TreeParams, rng: &mut R) -> Vec<Point3D>
where
    R: Rng + ?Sized,
{
    let spiral = params.spiral_count().min(params.count);
    let mut points = Vec::with_capacity(params.count);
    points.extend((0..spiral).map(|_| spiral_point(params, rng)));
    points.extend((spiral..params.count).map(|_| fill_point(params, rng)));
    points
}

/// Layered branch rings: peaks of a sine over height, never below 1.
#[inline]
fn branch_factor(h: f32) -> f32 {
    1.0 + 0.65 * ((h * 5.8 + 0.15) * TAU).sin().max(0.0)
}

#[inline]
fn base_radius(h: f32, scale: f32) -> f32 {
    (1.0 - h).powf(1.1) * scale * branch_factor(h)
}

fn spiral_point<R>(params: &TreeParams, rng: &mut R) -> Point3D
where
    R: Rng + ?Sized,
{
    let u: f32 = rng.r#gen();
    let h = u.powf(1.6);
    let y = params.height * h + BASE_Y;

    let base_r = base_radius(h, params.spiral_radius);
    let angle = u * params.loop_angle() + rng.gen_range(-params.angle_jitter..=params.angle_jitter);
    let r = base_r * rng.gen_range(0.85f32..=1.08);

    // Brightest lights around 55% of the height.
    let mid = (1.0 - (h - 0.55).abs() * 1.5).max(0.15);
    let g = 155 + (90.0 * mid) as i32 + rng.gen_range(-15i32..=20);
    let b = 185 + (70.0 * mid) as i32 + rng.gen_range(-15i32..=35);
    let mut color = Rgb::new(255, channel(g), channel(b));

    if rng.gen_bool(params.ornament_chance) {
        color = Rgb::new(
            255,
            channel(255 - rng.gen_range(0i32..=35)),
            channel(230 + rng.gen_range(0i32..=25)),
        );
    }

    Point3D::new(angle.cos() * r, y, angle.sin() * r, color)
}

fn fill_point<R>(params: &TreeParams, rng: &mut R) -> Point3D
where
    R: Rng + ?Sized,
{
    let h = rng.r#gen::<f32>().powf(1.9);
    let y = params.height * h + BASE_Y + rng.gen_range(-FILL_JITTER..=FILL_JITTER);

    let base_r = base_radius(h, params.fill_radius);
    let r = base_r * rng.r#gen::<f32>().sqrt();
    let angle = rng.r#gen::<f32>() * TAU;
    let x = angle.cos() * r + rng.gen_range(-FILL_JITTER..=FILL_JITTER);
    let z = angle.sin() * r + rng.gen_range(-FILL_JITTER..=FILL_JITTER);

    let color = Rgb::new(255, rng.gen_range(165..=225), rng.gen_range(190..=250));
    Point3D::new(x, y, z, color)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn params(count: usize) -> TreeParams {
        TreeParams { count, ..TreeParams::default() }
    }

    fn radius(p: &Point3D) -> f32 {
        p.x.hypot(p.z)
    }

    // ── population ────────────────────────────────────────────────────────

    #[test]
    fn splits_seventy_thirty() {
        let p = params(1_000);
        let pts = tree_points(&p, &mut StdRng::seed_from_u64(3));
        assert_eq!(pts.len(), 1_000);
        assert_eq!(p.spiral_count(), 700);
    }

    #[test]
    fn empty_tree() {
        assert!(tree_points(&params(0), &mut StdRng::seed_from_u64(3)).is_empty());
    }

    #[test]
    fn heights_stay_within_trunk_and_tip() {
        let pts = tree_points(&params(5_000), &mut StdRng::seed_from_u64(4));
        for p in &pts {
            assert!(p.y >= 0.0 && p.y <= 12.3, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn radii_are_bounded_by_branch_rings() {
        let p = params(5_000);
        let pts = tree_points(&p, &mut StdRng::seed_from_u64(5));
        let (spiral, fill) = pts.split_at(p.spiral_count());

        let spiral_max = p.spiral_radius * 1.65 * 1.08 + 1e-4;
        assert!(spiral.iter().all(|q| radius(q) <= spiral_max));

        let fill_max = p.fill_radius * 1.65 + FILL_JITTER * 2f32.sqrt() + 1e-4;
        assert!(fill.iter().all(|q| radius(q) <= fill_max));
    }

    #[test]
    fn branch_factor_never_shrinks_radius() {
        for i in 0..=100 {
            let h = i as f32 / 100.0;
            let f = branch_factor(h);
            assert!((1.0..=1.65 + 1e-6).contains(&f));
        }
    }

    // ── colour ────────────────────────────────────────────────────────────

    #[test]
    fn colours_are_white_to_cyan() {
        let p = params(3_000);
        let pts = tree_points(&p, &mut StdRng::seed_from_u64(6));
        assert!(pts.iter().all(|q| q.color.r == 255));

        for q in &pts[p.spiral_count()..] {
            assert!((165..=225).contains(&q.color.g));
            assert!((190..=250).contains(&q.color.b));
        }
        for q in &pts[..p.spiral_count()] {
            assert!(q.color.g >= 140);
            assert!(q.color.b >= 170);
        }
    }

    #[test]
    fn ornaments_appear_on_the_band() {
        let p = TreeParams { ornament_chance: 1.0, ..params(200) };
        let pts = tree_points(&p, &mut StdRng::seed_from_u64(7));
        for q in &pts[..p.spiral_count()] {
            assert!(q.color.g >= 220);
            assert!(q.color.b >= 230);
        }
    }

    // ── reproducibility ───────────────────────────────────────────────────

    #[test]
    fn seeded_sequence_is_stable() {
        let a = tree_points(&params(100), &mut StdRng::seed_from_u64(2024));
        let b = tree_points(&params(100), &mut StdRng::seed_from_u64(2024));
        let c = tree_points(&params(100), &mut StdRng::seed_from_u64(2025));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()));
    }
}
