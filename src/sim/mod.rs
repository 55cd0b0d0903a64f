//! Real-time simulation module
//!
//! Ring geometry, ball physics and note emission. This module must stay free of
//! audio and platform dependencies:
//! - Fixed timestep only (velocities are per tick)
//! - Seeded RNG only
//! - Stable iteration order (insertion order of balls)

pub mod collision;
pub mod event;
pub mod geometry;
pub mod notes;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, ball_ring_collision, reflect_velocity};
pub use event::{NoteQueue, NoteStruck, Origin};
pub use geometry::{Ring, RingSide, Rings, Viewport, sector_for_angle};
pub use notes::{LEFT_RING_NOTES, Note, Pitch, RIGHT_RING_NOTES, ROW_NOTES};
pub use state::{Ball, BallState, BallStore, ColorTag};
pub use tick::physics_tick;
