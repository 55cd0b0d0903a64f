//! Fixed timestep physics tick
//!
//! Advances every ball by one tick of free flight, resolves ring collisions,
//! and emits one note-struck event per collision.

use glam::Vec2;

use super::collision::{ball_ring_collision, reflect_velocity};
use super::event::{NoteQueue, NoteStruck};
use super::geometry::Rings;
use super::state::{BallState, BallStore};

/// Advance all balls by one fixed tick, returns the number of collisions
pub fn physics_tick(balls: &mut BallStore, rings: &Rings, events: &mut NoteQueue) -> usize {
    let mut collisions = 0;

    for ball in balls.iter_mut() {
        // Newtonian free flight: no damping, no gravity
        ball.pos += ball.vel;

        // A resting ball never strikes, even when it touches the wall
        if ball.vel == Vec2::ZERO {
            ball.state = BallState::Free;
            continue;
        }

        let ring = rings.get(ball.ring);
        let result = ball_ring_collision(ball.pos, ball.radius, ring);
        if !result.hit {
            ball.state = BallState::Free;
            continue;
        }

        ball.state = BallState::Colliding;
        collisions += 1;

        // Sector is taken before the position correction
        let note = ring.note_at(ball.pos);

        ball.vel = reflect_velocity(ball.vel, result.normal);
        ball.pos -= result.normal * result.penetration;

        log::trace!("ball {} struck {} on {} ring", ball.id, note, ball.ring.as_str());
        events.push(NoteStruck::collision(note));
    }

    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::Origin;
    use crate::sim::geometry::{RingSide, Viewport};
    use glam::Vec2;

    fn setup() -> (BallStore, Rings, NoteQueue) {
        let rings = Rings::for_viewport(Viewport::new(1000.0, 600.0));
        (BallStore::new(1), rings, NoteQueue::new())
    }

    #[test]
    fn test_free_flight() {
        let (mut balls, rings, mut events) = setup();
        let start = rings.left.center;
        balls.insert(start, Vec2::new(1.0, 2.0), 10.0, RingSide::Left);

        physics_tick(&mut balls, &rings, &mut events);

        let ball = &balls.as_slice()[0];
        assert!((ball.pos - (start + Vec2::new(1.0, 2.0))).length() < 1e-4);
        assert_eq!(ball.state, BallState::Free);
        assert!(events.is_empty());
    }

    #[test]
    fn test_center_shot_reflects_backward() {
        let (mut balls, rings, mut events) = setup();
        let ring_radius = rings.left.radius;
        balls.insert(rings.left.center, Vec2::new(5.0, 0.0), 10.0, RingSide::Left);

        let n = (ring_radius / 5.0).ceil() as usize;
        let mut emitted = Vec::new();
        for _ in 0..n {
            physics_tick(&mut balls, &rings, &mut events);
            emitted.extend(events.drain());
        }

        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].origin, Origin::Collision);
        // Struck at angle 0, sector 0 of the left ring
        assert_eq!(emitted[0].note.to_string(), "C3");
        let vel = balls.as_slice()[0].vel;
        assert!((vel - Vec2::new(-5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_penetration_corrected_onto_boundary() {
        let (mut balls, rings, mut events) = setup();
        let ring = &rings.right;
        let start = ring.center + Vec2::new(0.0, ring.radius - 12.0);
        balls.insert(start, Vec2::new(0.0, 7.0), 10.0, RingSide::Right);

        let hits = physics_tick(&mut balls, &rings, &mut events);

        assert_eq!(hits, 1);
        let ball = &balls.as_slice()[0];
        assert_eq!(ball.state, BallState::Colliding);
        let d = ball.pos.distance(ring.center);
        assert!((d - (ring.radius - ball.radius)).abs() < 1e-3);
        assert!(ball.vel.y < 0.0);
    }

    #[test]
    fn test_multiple_balls_same_tick() {
        let (mut balls, rings, mut events) = setup();
        let l = &rings.left;
        let r = &rings.right;
        balls.insert(l.center + Vec2::new(l.radius - 11.0, 0.0), Vec2::new(3.0, 0.0), 10.0, RingSide::Left);
        balls.insert(r.center - Vec2::new(r.radius - 11.0, 0.0), Vec2::new(-3.0, 0.0), 10.0, RingSide::Right);
        balls.insert(l.center, Vec2::ZERO, 10.0, RingSide::Left);

        let hits = physics_tick(&mut balls, &rings, &mut events);

        assert_eq!(hits, 2);
        let notes: Vec<String> = events.drain().map(|e| e.note.to_string()).collect();
        // Emitted in ball order: left ring angle 0, right ring angle π
        assert_eq!(notes, vec!["C3", "F5"]);
    }

    #[test]
    fn test_stationary_ball_never_collides() {
        let (mut balls, rings, mut events) = setup();
        balls.insert(rings.left.center + Vec2::new(20.0, 0.0), Vec2::ZERO, 10.0, RingSide::Left);
        for _ in 0..100 {
            physics_tick(&mut balls, &rings, &mut events);
        }
        assert!(events.is_empty());
    }

    #[test]
    fn test_stationary_ball_touching_wall_stays_silent() {
        let (mut balls, rings, mut events) = setup();
        let ring = rings.left.clone();
        for frac in [0.93, 0.95, 0.97, 0.99, 1.0] {
            let pos = ring.center + Vec2::new(ring.radius * frac, 0.0);
            balls.insert(pos, Vec2::ZERO, 11.37, RingSide::Left);
        }

        for _ in 0..60 {
            assert_eq!(physics_tick(&mut balls, &rings, &mut events), 0);
        }
        assert!(events.is_empty());
        assert!(balls.iter().all(|b| b.state == BallState::Free));
    }
}
