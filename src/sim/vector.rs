//! 2D vector helpers
//!
//! `Vector2` is glam's f64 vector. Screen space is Y-down, so a positive
//! rotation turns clockwise on screen.

use glam::DVec2;

pub type Vector2 = DVec2;

/// Operations the simulation needs on top of glam's own
pub trait VectorExt {
    /// Unit vector in the same direction; the zero vector maps to itself
    fn normalized(self) -> Self;
    /// Rotate by `radians` with the standard 2x2 rotation matrix
    fn rotated(self, radians: f64) -> Self;
    /// `x * other.y - y * other.x`; positive when `other` lies clockwise-right of `self`
    fn cross(self, other: Self) -> f64;
}

impl VectorExt for DVec2 {
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return DVec2::ZERO;
        }
        self / len
    }

    #[inline]
    fn rotated(self, radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        // Both components come from the pre-rotation values
        DVec2::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    #[inline]
    fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

/// Heading of a vector in radians
#[inline]
pub fn heading(v: Vector2) -> f64 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_zero_vector_normalizes_to_zero() {
        assert_eq!(Vector2::ZERO.normalized(), Vector2::ZERO);
    }

    #[test]
    fn test_rotate_quarter_turn_uses_pre_rotation_x() {
        // (1, 1) rotated 90 degrees is (-1, 1); reusing the new x would give (-1, 0)
        let r = Vector2::new(1.0, 1.0).rotated(FRAC_PI_2);
        assert!((r.x + 1.0).abs() < 1e-12);
        assert!((r.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_sign_screen_space() {
        let forward = Vector2::new(1.0, 0.0);
        // Y-down: (0, 1) points down the screen, clockwise-right of "east"
        assert!(forward.cross(Vector2::new(0.0, 1.0)) > 0.0);
        assert!(forward.cross(Vector2::new(0.0, -1.0)) < 0.0);
        assert_eq!(forward.cross(Vector2::new(-1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_distance_and_length() {
        let a = Vector2::new(3.0, 4.0);
        assert_eq!(a.length(), 5.0);
        assert_eq!(a.distance(Vector2::ZERO), 5.0);
    }

    proptest! {
        #[test]
        fn prop_normalized_has_unit_length(x in -1e6f64..1e6, y in -1e6f64..1e6) {
            prop_assume!(x != 0.0 || y != 0.0);
            let n = Vector2::new(x, y).normalized();
            prop_assert!((n.length() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn prop_rotation_round_trip(
            x in -1e3f64..1e3,
            y in -1e3f64..1e3,
            theta in -10.0f64..10.0,
        ) {
            let v = Vector2::new(x, y);
            let back = v.rotated(theta).rotated(-theta);
            prop_assert!((back - v).length() < 1e-9);
        }

        #[test]
        fn prop_rotation_preserves_length(
            x in -1e3f64..1e3,
            y in -1e3f64..1e3,
            theta in -10.0f64..10.0,
        ) {
            let v = Vector2::new(x, y);
            prop_assert!((v.rotated(theta).length() - v.length()).abs() < 1e-9);
        }
    }
}
