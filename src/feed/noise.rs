use rand::Rng;

use crate::tracking::Coordinate;

/// Moves `position` to a random point on a circle around it in the ground
/// plane. The circle radius is drawn from `[0, error_range]`; altitude is
/// left untouched.
pub fn distort<R: Rng + ?Sized>(rng: &mut R, position: Coordinate, error_range: f64) -> Coordinate {
    if error_range <= 0.0 {
        return position;
    }
    let radius = rng.gen_range(0.0..=error_range);
    let dx = rng.gen_range(-radius..=radius);
    let dy = (radius * radius - dx * dx).max(0.0).sqrt();
    let dy = if rng.gen_bool(0.5) { dy } else { -dy };
    Coordinate::new(position.x + dx, position.y + dy, position.z)
}
