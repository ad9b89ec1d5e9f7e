//! 2D vector math shared by all agents.
//!
//! Positions and velocities are plain `f32` pairs. Reproducibility comes
//! from the simulation's seeded RNG and single-threaded tick order, not
//! from the number representation.

use serde::{Deserialize, Serialize};

/// 2D vector used for positions, velocities and headings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing along the given heading angle (radians).
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Heading angle of this vector in radians.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Squared length (avoids sqrt for comparisons).
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Squared distance to another point (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    #[must_use]
    pub fn perp(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Normalize to unit length. Zero-length input stays zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Clamp the vector to a maximum length, preserving direction.
    #[must_use]
    pub fn clamp_length(self, max: f32) -> Self {
        let len_sq = self.length_squared();
        if len_sq <= max * max {
            return self;
        }
        self.normalize() * max
    }

    /// Scale to exactly the given length. Zero-length input stays zero.
    #[must_use]
    pub fn with_length(self, len: f32) -> Self {
        self.normalize() * len
    }

    /// Rotate this vector's heading toward `target`'s heading by at most
    /// `max_angle` radians, preserving length.
    ///
    /// Homing projectiles use this for their capped turn rate.
    #[must_use]
    pub fn rotate_towards(self, target: Self, max_angle: f32) -> Self {
        let len = self.length();
        if len <= f32::EPSILON || target.length_squared() <= f32::EPSILON {
            return self;
        }
        let current = self.angle();
        let desired = target.angle();
        let mut delta = desired - current;
        // Wrap to (-pi, pi] so we always turn the short way
        while delta > std::f32::consts::PI {
            delta -= std::f32::consts::TAU;
        }
        while delta < -std::f32::consts::PI {
            delta += std::f32::consts::TAU;
        }
        let turn = delta.clamp(-max_angle, max_angle);
        Self::from_angle(current + turn) * len
    }

    /// Check both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Vec2::new(3.0, 0.0);
        let b = Vec2::new(0.0, 4.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_normalize_unit_length() {
        let v = Vec2::new(3.0, 4.0).normalize();
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_length() {
        let v = Vec2::new(6.0, 8.0).clamp_length(5.0);
        assert!((v.length() - 5.0).abs() < 1e-5);
        // Direction preserved (3-4-5 ratio)
        assert!((v.x - 3.0).abs() < 1e-5);
        assert!((v.y - 4.0).abs() < 1e-5);

        let short = Vec2::new(1.0, 0.0).clamp_length(5.0);
        assert_eq!(short, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_from_angle_round_trip() {
        let v = Vec2::from_angle(0.7);
        assert!((v.angle() - 0.7).abs() < 1e-6);
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_towards_caps_turn() {
        let v = Vec2::new(10.0, 0.0);
        let target = Vec2::new(0.0, 1.0); // 90 degrees away
        let turned = v.rotate_towards(target, 0.5);
        assert!((turned.angle() - 0.5).abs() < 1e-5);
        assert!((turned.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_rotate_towards_short_way() {
        // Heading at +170 degrees, target at -170 degrees: the short way
        // crosses the pi boundary.
        let v = Vec2::from_angle(170.0_f32.to_radians());
        let target = Vec2::from_angle(-170.0_f32.to_radians());
        let turned = v.rotate_towards(target, 0.1);
        assert!(turned.angle() > v.angle());
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_perp_is_orthogonal() {
        let v = Vec2::new(2.0, 3.0);
        assert_eq!(v.dot(v.perp()), 0.0);
    }
}
