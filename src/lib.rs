//! Synth Orbit - bouncing-ball ring synthesizer
//!
//! Core modules:
//! - `sim`: Ring geometry, ball physics and note-struck events
//! - `grid` / `sequencer`: 7×16 step pattern and its tempo clock
//! - `audio`: Note sink that turns events into tones
//! - `session`: Per-session counters and best-effort telemetry
//! - `scene` / `composition`: Resolution-independent save/restore
//! - `engine`: Owns all state and schedules the independent cadences

pub mod audio;
pub mod clock;
pub mod composition;
pub mod engine;
pub mod grid;
pub mod scene;
pub mod sequencer;
pub mod session;
pub mod settings;
pub mod sim;

pub use composition::Composition;
pub use engine::Engine;
pub use settings::Settings;

/// Engine configuration constants
pub mod consts {
    /// Fixed physics timestep in milliseconds
    pub const PHYSICS_INTERVAL_MS: u32 = 16;
    /// Maximum ticks per cadence per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Ring layout as fractions of the viewport
    pub const LEFT_RING_X: f32 = 0.32;
    pub const RIGHT_RING_X: f32 = 0.68;
    pub const RING_Y: f32 = 0.53;
    pub const RING_RADIUS_FRACTION: f32 = 0.3;

    /// Number of note sectors per ring
    pub const SECTORS: usize = 7;

    /// Sequencer grid dimensions
    pub const GRID_ROWS: usize = 7;
    pub const GRID_COLS: usize = 16;

    /// Tempo defaults
    pub const DEFAULT_BPM: f32 = 108.0;
    /// Fastest allowed sequencer step (milliseconds)
    pub const MIN_STEP_MS: u32 = 50;

    /// Ball spawn: drag vector scale and radius range
    pub const DRAG_VELOCITY_SCALE: f32 = 0.08;
    pub const BALL_BASE_RADIUS: f32 = 10.0;
    pub const BALL_RADIUS_JITTER: f32 = 3.0;

    /// Note-struck velocity/duration per origin
    pub const COLLISION_VELOCITY: f32 = 0.5;
    pub const COLLISION_DURATION: f32 = 0.28;
    pub const SEQUENCER_VELOCITY: f32 = 0.35;
    pub const SEQUENCER_DURATION: f32 = 0.22;
    pub const MANUAL_VELOCITY: f32 = 0.6;
    pub const MANUAL_DURATION: f32 = 0.3;
}

/// Normalize an angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Round to a fixed number of decimal places
#[inline]
pub fn round_to(value: f32, decimals: i32) -> f32 {
    let scale = 10f32.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_normalize_angle_range() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-5);
        assert!((normalize_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert!(normalize_angle(-1e-9) < TAU);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-2.34567, 3), -2.346);
        assert_eq!(round_to(11.999, 2), 12.0);
    }
}
