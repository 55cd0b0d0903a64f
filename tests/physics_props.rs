//! Property tests for ring physics and geometry

use glam::Vec2;
use proptest::prelude::*;
use synth_orbit::sim::{
    BallStore, NoteQueue, Origin, RingSide, Rings, Viewport, physics_tick, reflect_velocity,
    sector_for_angle,
};

fn rings() -> Rings {
    Rings::for_viewport(Viewport::new(1000.0, 600.0))
}

proptest! {
    #[test]
    fn ball_never_leaves_its_ring(
        left in any::<bool>(),
        start_frac in 0.0f32..0.9,
        start_angle in -3.2f32..3.2,
        speed in 0.0f32..40.0,
        heading in -3.2f32..3.2,
        radius in 5.0f32..20.0,
    ) {
        let rings = rings();
        let side = if left { RingSide::Left } else { RingSide::Right };
        let ring = rings.get(side).clone();
        let room = ring.radius - radius;
        let start = ring.center + Vec2::from_angle(start_angle) * room * start_frac;
        let vel = Vec2::from_angle(heading) * speed;

        let mut balls = BallStore::new(7);
        balls.insert(start, vel, radius, side);
        let mut events = NoteQueue::new();

        for _ in 0..300 {
            physics_tick(&mut balls, &rings, &mut events);
            let ball = &balls.as_slice()[0];
            prop_assert!(ball.pos.distance(ring.center) <= room + 1e-3);
            // Elastic: speed is conserved
            prop_assert!((ball.speed() - speed).abs() <= 1e-3 * speed.max(1.0));
        }

        for event in events.drain() {
            prop_assert_eq!(event.origin, Origin::Collision);
            prop_assert!(ring.notes.contains(&event.note));
        }
    }

    #[test]
    fn reflection_flips_only_the_normal_component(
        vx in -50.0f32..50.0,
        vy in -50.0f32..50.0,
        angle in -3.2f32..3.2,
    ) {
        let v = Vec2::new(vx, vy);
        let n = Vec2::from_angle(angle);
        let r = reflect_velocity(v, n);
        let tangent = n.perp();

        prop_assert!((r.length() - v.length()).abs() <= 1e-3);
        prop_assert!((r.dot(n) + v.dot(n)).abs() <= 1e-3);
        prop_assert!((r.dot(tangent) - v.dot(tangent)).abs() <= 1e-3);
    }

    #[test]
    fn every_angle_has_a_sector(angle in -1000.0f32..1000.0) {
        prop_assert!(sector_for_angle(angle) < 7);
    }

    #[test]
    fn every_point_maps_to_a_ring_note(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0) {
        let rings = rings();
        let point = Vec2::new(x, y);
        for side in [RingSide::Left, RingSide::Right] {
            let ring = rings.get(side);
            prop_assert!(ring.notes.contains(&rings.note_sector_for_angle(side, point)));
        }
    }
}

#[test]
fn sector_boundaries_are_inclusive_at_the_start() {
    let arc = std::f32::consts::TAU / 7.0;
    assert_eq!(sector_for_angle(0.0), 0);
    assert_eq!(sector_for_angle(arc * 3.0 + 1e-4), 3);
    assert_eq!(sector_for_angle(-1e-3), 6);
    assert_eq!(sector_for_angle(std::f32::consts::TAU), 0);
}

#[test]
fn ring_boundary_point_is_contained() {
    let rings = rings();
    let edge = rings.left.center - Vec2::new(rings.left.radius, 0.0);
    assert_eq!(rings.ring_containing(edge), Some(RingSide::Left));
    assert_eq!(rings.ring_containing(edge - Vec2::new(0.01, 0.0)), None);
}
