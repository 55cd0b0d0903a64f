//! Ball entities and the ordered ball store
//!
//! The physics tick is the only writer of ball kinematics; everything else
//! reads through `BallStore::iter`.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::RingSide;
use crate::consts::*;

/// Display color of a ball, always derived from its ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Cyan,
    Pink,
}

impl ColorTag {
    pub fn for_ring(ring: RingSide) -> Self {
        match ring {
            RingSide::Left => ColorTag::Cyan,
            RingSide::Right => ColorTag::Pink,
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            ColorTag::Cyan => "#66d9ff",
            ColorTag::Pink => "#ff79c6",
        }
    }
}

/// Collision state of a ball during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BallState {
    #[default]
    Free,
    /// Crossed the ring boundary this tick and was reflected
    Colliding,
}

/// A ball bouncing inside one ring
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Displacement per physics tick (pixels)
    pub vel: Vec2,
    pub radius: f32,
    pub ring: RingSide,
    pub color: ColorTag,
    pub state: BallState,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, ring: RingSide) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            ring,
            color: ColorTag::for_ring(ring),
            state: BallState::Free,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Ordered collection of balls (insertion order = iteration order)
#[derive(Debug, Clone)]
pub struct BallStore {
    balls: Vec<Ball>,
    next_id: u32,
    rng: Pcg32,
}

impl Default for BallStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl BallStore {
    /// Create an empty store; `seed` drives radius jitter of spawned balls
    pub fn new(seed: u64) -> Self {
        Self {
            balls: Vec::new(),
            next_id: 1,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert a ball with explicit kinematics
    pub fn insert(&mut self, pos: Vec2, vel: Vec2, radius: f32, ring: RingSide) -> &Ball {
        let id = self.next_entity_id();
        self.balls.push(Ball::new(id, pos, vel, radius, ring));
        &self.balls[self.balls.len() - 1]
    }

    /// Spawn a ball with a jittered radius (drag-release gesture)
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, ring: RingSide) -> &Ball {
        let radius = BALL_BASE_RADIUS + self.rng.random::<f32>() * BALL_RADIUS_JITTER;
        self.insert(pos, vel, radius, ring)
    }

    pub fn clear(&mut self) {
        self.balls.clear();
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter()
    }

    pub fn as_slice(&self) -> &[Ball] {
        &self.balls
    }

    /// Mutable access, reserved for the physics tick
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Ball> {
        self.balls.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_assigns_ids_and_colors() {
        let mut store = BallStore::new(7);
        let a = store.spawn(Vec2::ZERO, Vec2::X, RingSide::Left).id;
        let b = store.spawn(Vec2::ZERO, Vec2::Y, RingSide::Right).id;
        assert!(b > a);
        let colors: Vec<_> = store.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![ColorTag::Cyan, ColorTag::Pink]);
    }

    #[test]
    fn test_spawn_radius_in_range() {
        let mut store = BallStore::new(42);
        for _ in 0..100 {
            store.spawn(Vec2::ZERO, Vec2::ZERO, RingSide::Left);
        }
        assert!(
            store
                .iter()
                .all(|b| b.radius >= BALL_BASE_RADIUS && b.radius < BALL_BASE_RADIUS + BALL_RADIUS_JITTER)
        );
    }

    #[test]
    fn test_same_seed_same_radii() {
        let mut a = BallStore::new(99);
        let mut b = BallStore::new(99);
        for _ in 0..5 {
            let ra = a.spawn(Vec2::ZERO, Vec2::ZERO, RingSide::Left).radius;
            let rb = b.spawn(Vec2::ZERO, Vec2::ZERO, RingSide::Left).radius;
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn test_clear() {
        let mut store = BallStore::new(1);
        store.insert(Vec2::ZERO, Vec2::ZERO, 10.0, RingSide::Right);
        assert_eq!(store.len(), 1);
        store.clear();
        assert!(store.is_empty());
    }
}
