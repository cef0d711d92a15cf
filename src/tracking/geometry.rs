use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Heading 0° points along +y.
pub const REFERENCE_AXIS: Vector = Vector {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

/// Absolute position in the simulated world, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Vector starting at `foot` and ending at `self`.
    pub fn vector_from(&self, foot: &Coordinate) -> Vector {
        Vector {
            x: self.x - foot.x,
            y: self.y - foot.y,
            z: self.z - foot.z,
        }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        self.vector_from(other).length()
    }

    /// Equality in the ground plane only.
    pub fn same_planar_position(&self, other: &Coordinate) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    /// Euclidean length, rounded to centimetres.
    pub fn length(&self) -> f64 {
        round2((self.x * self.x + self.y * self.y + self.z * self.z).sqrt())
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn determinant(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn is_planar_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Signed planar angle from `a` to `b`, normalized to `[0, 360)`.
pub fn angle_between(a: &Vector, b: &Vector) -> f64 {
    let degrees = round2(a.determinant(b).atan2(a.dot(b)).to_degrees());
    // `+ 0.0` folds a rounded -0.0 into 0.0
    degrees.rem_euclid(360.0) + 0.0
}

pub fn angle_to_reference_axis(vector: &Vector) -> Option<f64> {
    if vector.is_planar_zero() {
        return None;
    }
    Some(angle_between(&REFERENCE_AXIS, vector))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vector {
        Vector { x, y, z: 0.0 }
    }

    #[test]
    fn heading_follows_reference_axis_clockwise() {
        assert_eq!(angle_to_reference_axis(&v(0.0, 5.0)), Some(0.0));
        assert_eq!(angle_to_reference_axis(&v(-1.0, 0.0)), Some(90.0));
        assert_eq!(angle_to_reference_axis(&v(0.0, -3.0)), Some(180.0));
        assert_eq!(angle_to_reference_axis(&v(2.0, 0.0)), Some(270.0));
    }

    #[test]
    fn zero_planar_vector_has_no_heading() {
        let vertical = Vector {
            x: 0.0,
            y: 0.0,
            z: 4.0,
        };
        assert_eq!(angle_to_reference_axis(&vertical), None);
    }

    #[test]
    fn angles_stay_in_half_open_range() {
        // a tiny clockwise offset rounds to -0.0
        let almost_full = v(0.00001, 1.0);
        let angle = angle_between(&REFERENCE_AXIS, &almost_full);
        assert!((0.0..360.0).contains(&angle), "angle {angle}");
        assert!(angle.is_sign_positive());
    }

    #[test]
    fn length_is_rounded_to_two_decimals() {
        let a = Coordinate::new(0.0, 0.0, 0.0);
        let b = Coordinate::new(1.0, 1.0, 1.0);
        assert_eq!(b.distance_to(&a), 1.73);
    }
}
