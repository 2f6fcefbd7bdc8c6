use rand::Rng;

use super::{channel, GeometryError, Point3D, Rgb};
use crate::config::HeartParams;

const SAMPLE_X: f32 = 1.3;
const SAMPLE_Y: f32 = 1.4;

/// Implicit heart curve; a point is inside when the value is `<= 0`.
#[inline]
pub fn heart_implicit(x: f32, y: f32) -> f32 {
    let a = x * x + y * y - 1.0;
    a * a * a - x * x * y * y * y
}

/// Rejection-samples `params.count` points inside the heart and maps them to
/// a thin slab above the tree tip.
///
/// Fails with [`GeometryError::HeartSamplingExhausted`] once
/// `params.max_attempts` draws have been spent.
pub fn heart_points<R>(params: &HeartParams, rng: &mut R) -> Result<Vec<Point3D>, GeometryError>
where
    R: Rng + ?Sized,
{
    let mut points = Vec::with_capacity(params.count);
    let mut attempts = 0;

    while points.len() < params.count {
        if attempts >= params.max_attempts {
            return Err(GeometryError::HeartSamplingExhausted {
                accepted: points.len(),
                attempts,
            });
        }
        attempts += 1;

        let x = rng.gen_range(-SAMPLE_X..=SAMPLE_X);
        let y = rng.gen_range(-SAMPLE_Y..=SAMPLE_Y);
        if heart_implicit(x, y) > 0.0 {
            continue;
        }

        let s = params.scale;
        let wx = x * s * 0.8;
        let wy = params.top_y + (y + 1.0) * s * 0.5;
        let wz = rng.gen_range(-params.depth_jitter..=params.depth_jitter);

        // Pink rim fading to white at the centre.
        let f = (1.15 - 0.5 * x.hypot(y)).max(0.35);
        let g = ((130.0 * f + 80.0) as i32).clamp(120, 255);
        let b = ((190.0 * f + 70.0) as i32).clamp(120, 255);

        points.push(Point3D::new(wx, wy, wz, Rgb::new(255, channel(g), channel(b))));
    }

    log::debug!("heart: {} points in {attempts} attempts", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    // ── implicit curve ────────────────────────────────────────────────────

    #[test]
    fn implicit_inside_and_outside() {
        assert!(heart_implicit(0.0, 0.0) < 0.0);
        assert!(heart_implicit(0.5, 0.5) < 0.0);
        assert!(heart_implicit(0.0, 1.3) > 0.0);
        assert!(heart_implicit(1.2, -1.2) > 0.0);
    }

    // ── sampler ───────────────────────────────────────────────────────────

    #[test]
    fn yields_exact_count_inside_the_curve() {
        let p = HeartParams::default();
        let pts = heart_points(&p, &mut StdRng::seed_from_u64(31)).unwrap();
        assert_eq!(pts.len(), 1_000);

        for q in &pts {
            // Undo the world mapping and re-check the inequality.
            let x = q.x / (p.scale * 0.8);
            let y = (q.y - p.top_y) / (p.scale * 0.5) - 1.0;
            assert!(heart_implicit(x, y) <= 1e-4, "({x}, {y}) outside heart");
            assert!(q.z.abs() <= p.depth_jitter);
            assert!(q.y >= p.top_y);
        }
    }

    #[test]
    fn colours_are_pink_to_white() {
        let pts = heart_points(&HeartParams::default(), &mut StdRng::seed_from_u64(32)).unwrap();
        for q in pts {
            assert_eq!(q.color.r, 255);
            assert!(q.color.g >= 120);
            assert!(q.color.b >= 120);
        }
    }

    #[test]
    fn gives_up_at_the_attempt_cap() {
        let p = HeartParams { count: 10, max_attempts: 5, ..HeartParams::default() };
        let err = heart_points(&p, &mut StdRng::seed_from_u64(33)).unwrap_err();
        match err {
            GeometryError::HeartSamplingExhausted { accepted, attempts } => {
                assert_eq!(attempts, 5);
                assert!(accepted <= 5);
            }
        }
    }

    #[test]
    fn zero_points_needs_no_attempts() {
        let p = HeartParams { count: 0, max_attempts: 0, ..HeartParams::default() };
        assert!(heart_points(&p, &mut StdRng::seed_from_u64(34)).unwrap().is_empty());
    }
}
