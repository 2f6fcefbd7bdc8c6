use rand::Rng;

use super::{Point3D, Rgb};
use crate::config::StarParams;

/// Generates floating lights uniformly inside the star box.
pub fn star_points<R>(params: &StarParams, rng: &mut R) -> Vec<Point3D>
where
    R: Rng + ?Sized,
{
    let e = params.half_extent;
    (0..params.count)
        .map(|_| {
            let x = rng.gen_range(-e..=e);
            let y = rng.gen_range(params.min_y..=params.max_y);
            let z = rng.gen_range(-e..=e);
            let c = rng.gen_range(215..=255);
            Point3D::new(x, y, z, Rgb::new(c, c, 255))
        })
        .collect()
}
