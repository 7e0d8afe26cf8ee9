//! 3-D control point arithmetic.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A point (or displacement) in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Mirror image of `self` through `about`: `2·about − self`.
    #[inline]
    pub fn reflect(self, about: Self) -> Self {
        about * 2.0 - self
    }

    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Exact equality of the IEEE-754 bit patterns.
    pub fn bit_eq(self, other: Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Point3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Point3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Point3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_is_symmetric_about_pivot() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let pivot = Point3::new(0.0, 1.0, 1.0);
        let r = a.reflect(pivot);
        assert_eq!(r, Point3::new(-1.0, 0.0, -1.0));
        assert_eq!(r.midpoint(a), pivot);
        assert_eq!(r.reflect(pivot), a);
    }

    #[test]
    fn arithmetic() {
        let mut p = Point3::new(1.0, 1.0, 1.0);
        p += Point3::new(1.0, 2.0, 3.0);
        assert_eq!(p, Point3::new(2.0, 3.0, 4.0));
        p -= Point3::new(2.0, 3.0, 4.0);
        assert_eq!(p, Point3::ZERO);
        assert_eq!(-Point3::new(1.0, 0.0, -2.0), Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(Point3::new(3.0, 4.0, 0.0).length(), 5.0);
    }

    #[test]
    fn bit_equality_distinguishes_signed_zero() {
        let pos = Point3::ZERO;
        let neg = Point3::new(-0.0, 0.0, 0.0);
        assert_eq!(pos, neg);
        assert!(!pos.bit_eq(neg));
        assert!(pos.bit_eq(Point3::ZERO));
    }
}
