//! Resolution-independent scene capture and restore
//!
//! Positions are stored normalized to the viewport at capture time. Restore
//! scales by the *current* viewport, not the stored one, so balls drift relative
//! to the rings when the aspect ratio changes between capture and restore.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::round_to;
use crate::sim::geometry::{RingSide, Rings, Viewport};
use crate::sim::state::BallStore;

/// Persisted form of one ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBall {
    /// Normalized x in [0, 1]
    pub x: f32,
    /// Normalized y in [0, 1]
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    /// Older scenes may omit the ring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring: Option<RingSide>,
}

/// Persisted form of all balls
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub balls: Vec<SceneBall>,
    /// Viewport at capture time (informational)
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

/// Capture the ball store relative to the current viewport
pub fn capture(balls: &BallStore, viewport: Viewport) -> SceneSnapshot {
    SceneSnapshot {
        balls: balls
            .iter()
            .map(|b| SceneBall {
                x: round_to(b.pos.x / viewport.width, 4),
                y: round_to(b.pos.y / viewport.height, 4),
                dx: round_to(b.vel.x, 3),
                dy: round_to(b.vel.y, 3),
                radius: round_to(b.radius, 2),
                ring: Some(b.ring),
            })
            .collect(),
        width: viewport.width,
        height: viewport.height,
    }
}

/// Rebuild a ball store scaled to the current viewport
///
/// Colors are re-derived from the ring. A ball without a ring goes to the ring
/// containing it, else the nearest one.
pub fn restore(snapshot: &SceneSnapshot, viewport: Viewport, rings: &Rings, seed: u64) -> BallStore {
    let mut store = BallStore::new(seed);
    for b in &snapshot.balls {
        let pos = Vec2::new(b.x * viewport.width, b.y * viewport.height);
        let ring = b
            .ring
            .or_else(|| rings.ring_containing(pos))
            .unwrap_or_else(|| rings.nearest(pos));
        store.insert(pos, Vec2::new(b.dx, b.dy), b.radius, ring);
    }
    store
}

/// Restore from untyped JSON; anything malformed yields an empty store
pub fn restore_json(
    value: &serde_json::Value,
    viewport: Viewport,
    rings: &Rings,
    seed: u64,
) -> BallStore {
    match SceneSnapshot::deserialize(value) {
        Ok(snapshot) => restore(&snapshot, viewport, rings, seed),
        Err(e) => {
            log::warn!("Malformed scene, starting empty: {e}");
            BallStore::new(seed)
        }
    }
}
