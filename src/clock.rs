//! Fixed-interval ticker
//!
//! Converts elapsed wall time into a whole number of ticks. Both the physics and
//! the sequencer cadence own one, so each keeps its own period and phase.

use crate::consts::MAX_SUBSTEPS;

#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    interval_ms: u32,
    accumulator_ms: f64,
}

impl Ticker {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulator_ms: 0.0,
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Accumulate elapsed time and return how many ticks are due
    ///
    /// At most `MAX_SUBSTEPS` ticks are returned; any backlog beyond that is
    /// dropped so a stalled frame cannot trigger a burst of catch-up ticks.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.accumulator_ms += elapsed_ms;
        }

        let interval = self.interval_ms as f64;
        let mut due = 0;
        while self.accumulator_ms >= interval && due < MAX_SUBSTEPS {
            self.accumulator_ms -= interval;
            due += 1;
        }
        if due == MAX_SUBSTEPS && self.accumulator_ms >= interval {
            log::debug!(
                "ticker ({} ms) dropping {:.1} ms of backlog",
                self.interval_ms,
                self.accumulator_ms
            );
            self.accumulator_ms %= interval;
        }
        due
    }
}
