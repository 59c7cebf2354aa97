// Spline seam for path-bound movement
//
// Queries mirror what the character core needs while moving on a spline:
// closest point / tangent / rotation in the XY plane. The vertical axis is
// left to the character, which keeps its own Z while bound to a path.

use glam::Vec3;
use thiserror::Error;

use crate::core::math::yaw_from_direction;

/// Spline construction errors
#[derive(Debug, Error)]
pub enum SplineError {
    #[error("a spline needs at least two points, got {0}")]
    TooFewPoints(usize),

    #[error("spline points {0} and {1} coincide in the XY plane")]
    DegenerateSegment(usize, usize),
}

/// Queries against a 1-D path embedded in 3-D space
pub trait SplineProvider {
    /// Closest point on the spline to a world position (XY distance)
    fn closest_point(&self, world: Vec3) -> Vec3;

    /// Unit tangent of the spline at the closest point
    fn closest_tangent(&self, world: Vec3) -> Vec3;

    /// Yaw (degrees) of the tangent at the closest point
    fn closest_rotation_yaw(&self, world: Vec3) -> f32 {
        yaw_from_direction(self.closest_tangent(world))
    }

    /// Parametric key (segment index + fraction) at the closest point
    fn input_key_at_closest_point(&self, world: Vec3) -> f32;

    fn segment_count(&self) -> usize;
}

/// Piecewise-linear spline over a list of world-space points
#[derive(Debug, Clone)]
pub struct PolylineSpline {
    points: Vec<Vec3>,
}

struct ClosestSample {
    point: Vec3,
    tangent: Vec3,
    key: f32,
}

impl PolylineSpline {
    pub fn new(points: Vec<Vec3>) -> Result<Self, SplineError> {
        if points.len() < 2 {
            return Err(SplineError::TooFewPoints(points.len()));
        }
        for (index, pair) in points.windows(2).enumerate() {
            let delta = pair[1] - pair[0];
            if Vec3::new(delta.x, delta.y, 0.0).length_squared() < 1e-8 {
                return Err(SplineError::DegenerateSegment(index, index + 1));
            }
        }
        Ok(Self { points })
    }

    fn sample_closest(&self, world: Vec3) -> ClosestSample {
        let query = Vec3::new(world.x, world.y, 0.0);
        let mut best: Option<(f32, ClosestSample)> = None;

        for (index, pair) in self.points.windows(2).enumerate() {
            let a = pair[0];
            let b = pair[1];
            let ab = Vec3::new(b.x - a.x, b.y - a.y, 0.0);
            let flat_a = Vec3::new(a.x, a.y, 0.0);
            let t = ((query - flat_a).dot(ab) / ab.length_squared()).clamp(0.0, 1.0);
            let candidate = a + (b - a) * t;
            let distance_sq = (Vec3::new(candidate.x, candidate.y, 0.0) - query).length_squared();

            if best.as_ref().map_or(true, |(d, _)| distance_sq < *d) {
                best = Some((
                    distance_sq,
                    ClosestSample {
                        point: candidate,
                        tangent: ab.normalize(),
                        key: index as f32 + t,
                    },
                ));
            }
        }

        // non-empty by construction
        best.expect("spline has at least one segment").1
    }
}

impl SplineProvider for PolylineSpline {
    fn closest_point(&self, world: Vec3) -> Vec3 {
        self.sample_closest(world).point
    }

    fn closest_tangent(&self, world: Vec3) -> Vec3 {
        self.sample_closest(world).tangent
    }

    fn input_key_at_closest_point(&self, world: Vec3) -> f32 {
        self.sample_closest(world).key
    }

    fn segment_count(&self) -> usize {
        self.points.len() - 1
    }
}
