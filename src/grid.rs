//! Step sequencer pattern: 7 note rows × 16 time steps
//!
//! Indices always come from the UI and are bounded by construction, so an
//! out-of-range row or column is a programming error and panics.

use crate::consts::{GRID_COLS, GRID_ROWS};
use crate::sim::notes::{Note, ROW_NOTES};

/// On/off cells of the step sequencer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridPattern {
    cells: [[bool; GRID_COLS]; GRID_ROWS],
}

#[inline]
fn check_bounds(row: usize, col: usize) {
    assert!(
        row < GRID_ROWS && col < GRID_COLS,
        "grid index out of range: row {row}, col {col} (grid is {GRID_ROWS}x{GRID_COLS})"
    );
}

impl GridPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a cell, returns its new state
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        check_bounds(row, col);
        let cell = &mut self.cells[row][col];
        *cell = !*cell;
        *cell
    }

    pub fn set(&mut self, row: usize, col: usize, active: bool) {
        check_bounds(row, col);
        self.cells[row][col] = active;
    }

    pub fn is_active(&self, row: usize, col: usize) -> bool {
        check_bounds(row, col);
        self.cells[row][col]
    }

    pub fn clear(&mut self) {
        self.cells = [[false; GRID_COLS]; GRID_ROWS];
    }

    /// Number of active cells
    pub fn active_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| **c).count()
    }

    /// Rows active in a column, top to bottom
    pub fn active_rows(&self, col: usize) -> impl Iterator<Item = usize> + '_ {
        check_bounds(0, col);
        (0..GRID_ROWS).filter(move |&row| self.cells[row][col])
    }

    /// Note played by a row
    pub fn row_note(row: usize) -> Note {
        check_bounds(row, 0);
        ROW_NOTES[row]
    }

    /// Nested 0/1 lists, one per row
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }

    /// Build from nested lists; missing entries read as off, extras are ignored
    pub fn from_rows(rows: &[Vec<u8>]) -> Self {
        let mut grid = Self::new();
        for (r, row) in rows.iter().take(GRID_ROWS).enumerate() {
            for (c, &value) in row.iter().take(GRID_COLS).enumerate() {
                grid.cells[r][c] = value != 0;
            }
        }
        grid
    }
}
