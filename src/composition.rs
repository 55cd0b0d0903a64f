//! Saved compositions: grid pattern, tempo, timbre and ball scene
//!
//! Storage is handled elsewhere; this is only the exchanged shape.

use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::consts::{DEFAULT_BPM, GRID_COLS, GRID_ROWS};
use crate::grid::GridPattern;
use crate::scene::{SceneBall, SceneSnapshot};
use crate::sim::geometry::RingSide;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub title: String,
    pub bpm: f32,
    pub synth_type: Waveform,
    /// 0/1 rows, top row first
    pub grid: Vec<Vec<u8>>,
    /// Untyped so a damaged scene cannot reject the whole composition
    #[serde(default)]
    pub scene: serde_json::Value,
}

impl Composition {
    pub fn grid_pattern(&self) -> GridPattern {
        GridPattern::from_rows(&self.grid)
    }

    /// The bundled "Demo Orbit" composition
    pub fn demo() -> Self {
        let grid = (0..GRID_ROWS)
            .map(|r| {
                (0..GRID_COLS)
                    .map(|c| u8::from(matches!(c, 0 | 4) && matches!(r, 0 | 2 | 4)))
                    .collect()
            })
            .collect();

        let scene = SceneSnapshot {
            balls: vec![
                SceneBall {
                    x: 0.4,
                    y: 0.5,
                    dx: 3.2,
                    dy: -2.4,
                    radius: 11.0,
                    ring: Some(RingSide::Left),
                },
                SceneBall {
                    x: 0.6,
                    y: 0.5,
                    dx: -2.5,
                    dy: 3.1,
                    radius: 12.0,
                    ring: Some(RingSide::Right),
                },
            ],
            width: 0.0,
            height: 0.0,
        };

        Self {
            title: "Demo Orbit".to_string(),
            bpm: DEFAULT_BPM,
            synth_type: Waveform::Triangle,
            grid,
            scene: serde_json::to_value(scene).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_grid() {
        let demo = Composition::demo();
        let grid = demo.grid_pattern();
        assert_eq!(grid.active_count(), 6);
        assert!(grid.is_active(0, 0));
        assert!(grid.is_active(4, 4));
        assert!(!grid.is_active(1, 0));
        assert_eq!(grid.active_rows(4).collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    fn test_demo_scene_parses() {
        let demo = Composition::demo();
        let scene: SceneSnapshot = serde_json::from_value(demo.scene).unwrap();
        assert_eq!(scene.balls.len(), 2);
        assert_eq!(scene.balls[1].ring, Some(RingSide::Right));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(Composition::demo()).unwrap();
        assert_eq!(json["synth_type"], "triangle");
        assert_eq!(json["bpm"], 108.0);
        assert_eq!(json["grid"][0][0], 1);
    }

    #[test]
    fn test_missing_scene_defaults_to_null() {
        let c: Composition = serde_json::from_str(
            r#"{ "title": "t", "bpm": 90, "synth_type": "sine", "grid": [] }"#,
        )
        .unwrap();
        assert!(c.scene.is_null());
        assert_eq!(c.grid_pattern().active_count(), 0);
    }
}
