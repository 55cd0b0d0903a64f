//! Tempo-driven step sequencer clock
//!
//! Plays one grid column per sixteenth note. The clock only computes its step
//! interval on `start`; a tempo change while running needs `stop` + `start`.

use crate::clock::Ticker;
use crate::consts::*;
use crate::grid::GridPattern;
use crate::sim::event::{NoteQueue, NoteStruck};

/// Step interval in whole milliseconds for a tempo (sixteenth notes)
pub fn step_interval_ms(bpm: f32) -> u32 {
    let ms = (60_000.0 / bpm / 4.0).floor();
    if ms.is_nan() || ms < MIN_STEP_MS as f32 {
        MIN_STEP_MS
    } else {
        // Saturating float → int cast
        ms as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ClockState {
    Stopped,
    Running { ticker: Ticker },
}

/// Sequencer transport plus column cursor
#[derive(Debug, Clone)]
pub struct SequencerClock {
    state: ClockState,
    cursor: usize,
    last_played: Option<usize>,
}

impl Default for SequencerClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencerClock {
    pub fn new() -> Self {
        Self {
            state: ClockState::Stopped,
            cursor: 0,
            last_played: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Running { .. })
    }

    /// Column the next tick will play
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Column most recently played while running (for highlighting)
    pub fn playing_column(&self) -> Option<usize> {
        if self.is_running() { self.last_played } else { None }
    }

    /// Interval of the running ticker, if any
    pub fn interval_ms(&self) -> Option<u32> {
        match &self.state {
            ClockState::Running { ticker } => Some(ticker.interval_ms()),
            ClockState::Stopped => None,
        }
    }

    /// Start ticking at `bpm`; no-op if already running
    pub fn start(&mut self, bpm: f32) -> bool {
        if self.is_running() {
            return false;
        }
        let interval = step_interval_ms(bpm);
        self.state = ClockState::Running {
            ticker: Ticker::new(interval),
        };
        log::info!("Sequencer started: {} BPM, {} ms per step", bpm, interval);
        true
    }

    /// Stop ticking; no-op if already stopped. The cursor is kept.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = ClockState::Stopped;
        self.last_played = None;
        log::info!("Sequencer stopped at column {}", self.cursor);
        true
    }

    /// Play the column under the cursor and advance it
    ///
    /// Emits one event per active row. Works regardless of transport state so
    /// callers can single-step a stopped clock.
    pub fn tick(&mut self, grid: &GridPattern, events: &mut NoteQueue) -> usize {
        let col = self.cursor;
        let mut emitted = 0;
        for row in grid.active_rows(col) {
            events.push(NoteStruck::sequencer(GridPattern::row_note(row)));
            emitted += 1;
        }
        self.last_played = Some(col);
        self.cursor = (col + 1) % GRID_COLS;
        emitted
    }

    /// Number of ticks due after `elapsed_ms`; zero while stopped
    pub fn due_ticks(&mut self, elapsed_ms: f64) -> u32 {
        match &mut self.state {
            ClockState::Running { ticker } => ticker.advance(elapsed_ms),
            ClockState::Stopped => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::event::Origin;

    #[test]
    fn test_step_interval() {
        assert_eq!(step_interval_ms(120.0), 125);
        assert_eq!(step_interval_ms(108.0), 138);
        assert_eq!(step_interval_ms(4000.0), 50);
        assert_eq!(step_interval_ms(300.0), 50);
        assert_eq!(step_interval_ms(299.0), 50);
        assert_eq!(step_interval_ms(60.0), 250);
    }

    #[test]
    fn test_start_stop_idempotent() {
        let mut clock = SequencerClock::new();
        assert!(!clock.stop());
        assert!(clock.start(120.0));
        assert!(!clock.start(60.0));
        // Second start did not retime
        assert_eq!(clock.interval_ms(), Some(125));
        assert!(clock.stop());
        assert!(!clock.stop());
        assert_eq!(clock.interval_ms(), None);
    }

    #[test]
    fn test_single_cell_emits_one_event() {
        let mut grid = GridPattern::new();
        grid.toggle(0, 0);
        let mut clock = SequencerClock::new();
        let mut events = NoteQueue::new();

        assert_eq!(clock.tick(&grid, &mut events), 1);

        let emitted: Vec<_> = events.drain().collect();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].origin, Origin::Sequencer);
        assert_eq!(emitted[0].note.to_string(), "C5");
        assert_eq!(clock.cursor(), 1);
    }

    #[test]
    fn test_cursor_wraps() {
        let grid = GridPattern::new();
        let mut clock = SequencerClock::new();
        let mut events = NoteQueue::new();
        let mut seen = Vec::new();
        for _ in 0..GRID_COLS * 2 {
            seen.push(clock.cursor());
            clock.tick(&grid, &mut events);
        }
        let expected: Vec<usize> = (0..GRID_COLS).chain(0..GRID_COLS).collect();
        assert_eq!(seen, expected);
        assert!(events.is_empty());
    }

    #[test]
    fn test_due_ticks_only_while_running() {
        let mut clock = SequencerClock::new();
        assert_eq!(clock.due_ticks(1000.0), 0);
        clock.start(120.0);
        assert_eq!(clock.due_ticks(250.0), 2);
        assert_eq!(clock.playing_column(), None);
        clock.stop();
        assert_eq!(clock.due_ticks(1000.0), 0);
    }
}
