//! Ball vs. ring boundary collision
//!
//! A ball lives inside a convex circular boundary. Once its outer edge reaches
//! the ring it is reflected elastically about the radial normal and pushed back
//! by exactly the overlap so it cannot tunnel or stick on the next tick.

use glam::Vec2;

use super::geometry::Ring;

/// Result of a boundary check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the ball touches or crosses the boundary
    pub hit: bool,
    /// Unit normal from the ring center toward the ball
    pub normal: Vec2,
    /// Overlap past the boundary (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a ball against the inside of a ring
pub fn ball_ring_collision(ball_pos: Vec2, ball_radius: f32, ring: &Ring) -> CollisionResult {
    let offset = ball_pos - ring.center;
    let d = offset.length();

    if d + ball_radius < ring.radius {
        return CollisionResult::miss();
    }
    // Normal is undefined at the exact center
    if d <= f32::EPSILON {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal: offset / d,
        penetration: d + ball_radius - ring.radius,
    }
}

/// Reflect velocity off a surface with the given unit normal
#[inline]
pub fn reflect_velocity(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::notes::LEFT_RING_NOTES;

    fn ring() -> Ring {
        Ring {
            center: Vec2::new(100.0, 100.0),
            radius: 50.0,
            notes: LEFT_RING_NOTES,
        }
    }

    #[test]
    fn test_inside_is_free() {
        let result = ball_ring_collision(Vec2::new(120.0, 100.0), 10.0, &ring());
        assert!(!result.hit);
    }

    #[test]
    fn test_touching_boundary_hits() {
        // d + r == R counts as a collision
        let result = ball_ring_collision(Vec2::new(140.0, 100.0), 10.0, &ring());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::X);
        assert!(result.penetration.abs() < 1e-5);
    }

    #[test]
    fn test_penetration_depth() {
        let result = ball_ring_collision(Vec2::new(100.0, 155.0), 10.0, &ring());
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_center_never_collides() {
        let result = ball_ring_collision(Vec2::new(100.0, 100.0), 60.0, &ring());
        assert!(!result.hit);
    }

    #[test]
    fn test_reflect_velocity() {
        // Ball moving right hits the right side of the ring
        let reflected = reflect_velocity(Vec2::new(100.0, 0.0), Vec2::X);
        assert!((reflected.x - (-100.0)).abs() < 0.001);
        assert!(reflected.y.abs() < 0.001);

        // Tangential component is preserved
        let reflected = reflect_velocity(Vec2::new(3.0, 4.0), Vec2::Y);
        assert!((reflected - Vec2::new(3.0, -4.0)).length() < 1e-5);
    }
}
