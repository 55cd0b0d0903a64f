//! Ring geometry and note-sector quantization
//!
//! Two rings sit side by side, both derived from the viewport. Each ring is cut
//! into seven equal angular sectors; sector 0 starts on the positive x-axis and
//! sectors increase with `atan2` angle in canvas coordinates.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::notes::{LEFT_RING_NOTES, Note, RIGHT_RING_NOTES};
use crate::consts::*;
use crate::normalize_angle;

/// Current drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(960.0, 540.0)
    }
}

/// Which ring a ball or point belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingSide {
    Left,
    Right,
}

impl RingSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            RingSide::Left => "left",
            RingSide::Right => "right",
        }
    }
}

/// A circular boundary with its sector notes
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
    pub notes: [Note; SECTORS],
}

impl Ring {
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.center) <= self.radius
    }

    /// Sector index in [0, 7) of a point relative to the ring center
    pub fn sector_index(&self, point: Vec2) -> usize {
        let rel = point - self.center;
        sector_for_angle(rel.y.atan2(rel.x))
    }

    /// Note of the sector containing `point`
    pub fn note_at(&self, point: Vec2) -> Note {
        self.notes[self.sector_index(point)]
    }
}

/// Sector index for an angle in radians (any range)
pub fn sector_for_angle(angle: f32) -> usize {
    let sector_arc = TAU / SECTORS as f32;
    let idx = (normalize_angle(angle) / sector_arc).floor() as usize;
    idx.min(SECTORS - 1)
}

/// Both rings, laid out for one viewport
#[derive(Debug, Clone, PartialEq)]
pub struct Rings {
    pub left: Ring,
    pub right: Ring,
}

impl Rings {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let center_y = viewport.height * RING_Y;
        let radius = viewport.width.min(viewport.height) * RING_RADIUS_FRACTION;
        Self {
            left: Ring {
                center: Vec2::new(viewport.width * LEFT_RING_X, center_y),
                radius,
                notes: LEFT_RING_NOTES,
            },
            right: Ring {
                center: Vec2::new(viewport.width * RIGHT_RING_X, center_y),
                radius,
                notes: RIGHT_RING_NOTES,
            },
        }
    }

    pub fn get(&self, side: RingSide) -> &Ring {
        match side {
            RingSide::Left => &self.left,
            RingSide::Right => &self.right,
        }
    }

    /// Ring containing `point`; left wins when both do
    pub fn ring_containing(&self, point: Vec2) -> Option<RingSide> {
        if self.left.contains(point) {
            Some(RingSide::Left)
        } else if self.right.contains(point) {
            Some(RingSide::Right)
        } else {
            None
        }
    }

    /// Ring whose center is closest to `point` (ties go left)
    pub fn nearest(&self, point: Vec2) -> RingSide {
        if point.distance_squared(self.left.center) <= point.distance_squared(self.right.center) {
            RingSide::Left
        } else {
            RingSide::Right
        }
    }

    /// Note struck at `point` on the given ring
    pub fn note_sector_for_angle(&self, side: RingSide, point: Vec2) -> Note {
        self.get(side).note_at(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn rings() -> Rings {
        Rings::for_viewport(Viewport::new(1000.0, 600.0))
    }

    #[test]
    fn test_layout_from_viewport() {
        let r = rings();
        assert!((r.left.center.x - 320.0).abs() < 1e-3);
        assert!((r.right.center.x - 680.0).abs() < 1e-3);
        assert!((r.left.center.y - 318.0).abs() < 1e-3);
        assert!((r.left.radius - 180.0).abs() < 1e-3);
        assert_eq!(r.left.radius, r.right.radius);
    }

    #[test]
    fn test_ring_containing() {
        let r = rings();
        assert_eq!(r.ring_containing(r.left.center), Some(RingSide::Left));
        assert_eq!(r.ring_containing(r.right.center), Some(RingSide::Right));
        assert_eq!(r.ring_containing(Vec2::new(5.0, 5.0)), None);

        // On the boundary counts as inside
        let edge = r.right.center + Vec2::new(r.right.radius, 0.0);
        assert_eq!(r.ring_containing(edge), Some(RingSide::Right));
    }

    #[test]
    fn test_overlap_resolves_left() {
        // Narrow viewport makes the rings overlap in the middle
        let r = Rings::for_viewport(Viewport::new(400.0, 800.0));
        let middle = (r.left.center + r.right.center) / 2.0;
        assert!(r.left.contains(middle) && r.right.contains(middle));
        assert_eq!(r.ring_containing(middle), Some(RingSide::Left));
    }

    #[test]
    fn test_sector_zero_starts_at_positive_x() {
        assert_eq!(sector_for_angle(0.0), 0);
        let arc = TAU / 7.0;
        assert_eq!(sector_for_angle(arc * 0.999), 0);
        assert_eq!(sector_for_angle(arc * 1.001), 1);
        assert_eq!(sector_for_angle(TAU - 1e-4), 6);
        assert_eq!(sector_for_angle(-1e-4), 6);
        assert_eq!(sector_for_angle(PI), 3);
    }

    #[test]
    fn test_note_at_point() {
        let r = rings();
        let ring = &r.left;
        let p = ring.center + Vec2::from_angle(0.1) * ring.radius;
        assert_eq!(r.note_sector_for_angle(RingSide::Left, p).to_string(), "C3");
        let p = ring.center + Vec2::from_angle(-0.1) * ring.radius;
        assert_eq!(r.note_sector_for_angle(RingSide::Left, p).to_string(), "B3");
        let q = r.right.center + Vec2::new(0.0, 50.0);
        // Straight down in canvas coordinates is +π/2, sector 1
        assert_eq!(r.note_sector_for_angle(RingSide::Right, q).to_string(), "D5");
    }

    #[test]
    fn test_nearest() {
        let r = rings();
        assert_eq!(r.nearest(Vec2::new(0.0, 0.0)), RingSide::Left);
        assert_eq!(r.nearest(Vec2::new(1000.0, 0.0)), RingSide::Right);
    }
}
