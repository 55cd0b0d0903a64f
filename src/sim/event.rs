//! Note-struck events and the append-only queue both cadences write to

use std::collections::VecDeque;

use super::notes::Note;
use crate::consts::*;

/// What produced a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Manual,
    Collision,
    Sequencer,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Manual => "manual",
            Origin::Collision => "collision",
            Origin::Sequencer => "sequencer",
        }
    }
}

/// A single request to sound one tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteStruck {
    pub note: Note,
    pub frequency: f32,
    /// Loudness in (0, 1]
    pub velocity: f32,
    pub duration_secs: f32,
    pub origin: Origin,
}

impl NoteStruck {
    pub fn new(note: Note, velocity: f32, duration_secs: f32, origin: Origin) -> Self {
        Self {
            note,
            frequency: note.frequency(),
            velocity,
            duration_secs,
            origin,
        }
    }

    pub fn collision(note: Note) -> Self {
        Self::new(note, COLLISION_VELOCITY, COLLISION_DURATION, Origin::Collision)
    }

    pub fn sequencer(note: Note) -> Self {
        Self::new(note, SEQUENCER_VELOCITY, SEQUENCER_DURATION, Origin::Sequencer)
    }

    pub fn manual(note: Note) -> Self {
        Self::new(note, MANUAL_VELOCITY, MANUAL_DURATION, Origin::Manual)
    }
}

/// FIFO of pending note-struck events
///
/// Producers only push; the engine drains it into the sink right after each
/// tick, so an event is consumed exactly once.
#[derive(Debug, Default)]
pub struct NoteQueue {
    pending: VecDeque<NoteStruck>,
}

impl NoteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: NoteStruck) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and yield all pending events in emission order
    pub fn drain(&mut self) -> impl Iterator<Item = NoteStruck> + '_ {
        self.pending.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::notes::ROW_NOTES;

    #[test]
    fn test_origin_constants() {
        let e = NoteStruck::collision(ROW_NOTES[0]);
        assert_eq!(e.velocity, 0.5);
        assert_eq!(e.duration_secs, 0.28);
        assert_eq!(e.frequency, 523.25);

        let e = NoteStruck::sequencer(ROW_NOTES[2]);
        assert_eq!(e.velocity, 0.35);
        assert_eq!(e.duration_secs, 0.22);
        assert_eq!(e.origin, Origin::Sequencer);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let mut q = NoteQueue::new();
        q.push(NoteStruck::manual(ROW_NOTES[0]));
        q.push(NoteStruck::manual(ROW_NOTES[1]));
        let notes: Vec<_> = q.drain().map(|e| e.note).collect();
        assert_eq!(notes, vec![ROW_NOTES[0], ROW_NOTES[1]]);
        assert!(q.is_empty());
    }
}
