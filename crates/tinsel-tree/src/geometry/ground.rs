use std::f32::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::StandardNormal;

use super::{Point3D, Rgb};
use crate::config::GroundParams;

/// Generates points scattered around the configured rings on the floor.
///
/// Each point picks a ring uniformly and perturbs its radius with a Gaussian.
/// No rings means no points.
pub fn ground_points<R>(params: &GroundParams, rng: &mut R) -> Vec<Point3D>
where
    R: Rng + ?Sized,
{
    if params.rings.is_empty() {
        return Vec::new();
    }

    (0..params.count)
        .filter_map(|_| {
            let ring = *params.rings.choose(rng)?;
            let noise: f32 = rng.sample(StandardNormal);
            let r = ring + params.ring_sigma * noise;
            let theta = rng.gen_range(0.0..TAU);

            let c = if rng.gen_bool(params.bright_chance) {
                rng.gen_range(235..=255)
            } else {
                rng.gen_range(190..=235)
            };

            Some(Point3D::new(theta.cos() * r, params.y, theta.sin() * r, Rgb::new(c, c, 255)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn points_lie_on_the_floor_near_a_ring() {
        let p = GroundParams { count: 2_000, ..GroundParams::default() };
        let pts = ground_points(&p, &mut StdRng::seed_from_u64(11));
        assert_eq!(pts.len(), 2_000);

        for q in &pts {
            assert_eq!(q.y, -0.25);
            let r = q.x.hypot(q.z);
            let nearest = p
                .rings
                .iter()
                .map(|ring| (r - ring).abs())
                .fold(f32::INFINITY, f32::min);
            // Six sigma.
            assert!(nearest < 1.8, "radius {r} far from every ring");
        }
    }

    #[test]
    fn colours_are_pale_blue() {
        let p = GroundParams { count: 500, ..GroundParams::default() };
        for q in ground_points(&p, &mut StdRng::seed_from_u64(12)) {
            assert_eq!(q.color.r, q.color.g);
            assert_eq!(q.color.b, 255);
            assert!(q.color.r >= 190);
        }
    }

    #[test]
    fn no_rings_no_points() {
        let p = GroundParams { rings: Vec::new(), ..GroundParams::default() };
        assert!(ground_points(&p, &mut StdRng::seed_from_u64(13)).is_empty());
    }
}
