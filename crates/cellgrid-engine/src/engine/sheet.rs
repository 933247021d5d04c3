//! The grid store: one record per coordinate of a `rows x cols` rectangle.
//!
//! Every coordinate inside the rectangle always has exactly one [`Cell`];
//! no record exists outside it. Structural edits only ever append or remove
//! the trailing row/column, which keeps that invariant cheap to maintain.

use dashmap::DashMap;

use super::cell::{Alignment, Cell, DataType, StyleChange};
use super::cell_ref::CellRef;

/// Cell storage keyed by coordinate.
pub type Grid = DashMap<CellRef, Cell>;

/// Largest number of cells a sheet may be created with.
pub const MAX_CELLS: usize = 1_000_000;

#[derive(Clone, Debug)]
pub struct Sheet {
    cells: Grid,
    rows: usize,
    cols: usize,
}

impl Sheet {
    /// Whether a `rows x cols` sheet stays within [`MAX_CELLS`].
    pub fn fits(rows: usize, cols: usize) -> bool {
        rows.max(1)
            .checked_mul(cols.max(1))
            .is_some_and(|cells| cells <= MAX_CELLS)
    }

    /// Create a sheet of default cells. Both dimensions are at least 1.
    ///
    /// Callers taking dimensions from outside input check [`Sheet::fits`]
    /// first; this allocates every cell.
    pub fn new(rows: usize, cols: usize) -> Sheet {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let cells = Grid::with_capacity(rows.saturating_mul(cols).min(MAX_CELLS));
        for row in 0..rows {
            for col in 0..cols {
                cells.insert(CellRef::new(row, col), Cell::new_empty());
            }
        }
        Sheet { cells, rows, cols }
    }

    /// Build a sheet from explicit records. Records outside the rectangle are
    /// dropped and missing ones are defaulted; the returned count says how
    /// many records had to be dropped or defaulted.
    pub fn from_cells<I>(rows: usize, cols: usize, records: I) -> (Sheet, usize)
    where
        I: IntoIterator<Item = (CellRef, Cell)>,
    {
        let sheet = Sheet::new(rows, cols);
        let mut seen = 0usize;
        let mut dropped = 0usize;
        for (cell_ref, cell) in records {
            if sheet.contains(&cell_ref) {
                sheet.cells.insert(cell_ref, cell);
                seen += 1;
            } else {
                dropped += 1;
            }
        }
        let defaulted = sheet.rows.saturating_mul(sheet.cols).saturating_sub(seen);
        (sheet, dropped + defaulted)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, cell_ref: &CellRef) -> bool {
        cell_ref.row < self.rows && cell_ref.col < self.cols
    }

    /// A copy of the record at `cell_ref`.
    pub fn cell(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.cells.get(cell_ref).map(|c| c.clone())
    }

    /// The stored value at `cell_ref`.
    pub fn value(&self, cell_ref: &CellRef) -> Option<String> {
        self.cells.get(cell_ref).map(|c| c.value.clone())
    }

    pub fn formula(&self, cell_ref: &CellRef) -> Option<String> {
        self.cells.get(cell_ref).map(|c| c.formula.clone())
    }

    pub fn data_type(&self, cell_ref: &CellRef) -> Option<DataType> {
        self.cells.get(cell_ref).map(|c| c.data_type)
    }

    /// Apply `f` to the record at `cell_ref`. Returns false when the
    /// coordinate is outside the sheet.
    fn update<F: FnOnce(&mut Cell)>(&self, cell_ref: &CellRef, f: F) -> bool {
        match self.cells.get_mut(cell_ref) {
            Some(mut cell) => {
                f(&mut cell);
                true
            }
            None => false,
        }
    }

    pub fn set_formula(&self, cell_ref: &CellRef, formula: &str) -> bool {
        self.update(cell_ref, |cell| cell.formula = formula.to_string())
    }

    pub fn set_value(&self, cell_ref: &CellRef, value: String) -> bool {
        self.update(cell_ref, |cell| cell.value = value)
    }

    pub fn set_style(&self, cell_ref: &CellRef, change: StyleChange) -> bool {
        self.update(cell_ref, |cell| cell.style.apply(change))
    }

    pub fn set_alignment(&self, cell_ref: &CellRef, alignment: Alignment) -> bool {
        self.update(cell_ref, |cell| cell.style.align = alignment)
    }

    pub fn set_data_type(&self, cell_ref: &CellRef, data_type: DataType) -> bool {
        self.update(cell_ref, |cell| cell.data_type = data_type)
    }

    /// Append a row of default cells.
    pub fn add_row(&mut self) {
        let row = self.rows;
        for col in 0..self.cols {
            self.cells.insert(CellRef::new(row, col), Cell::new_empty());
        }
        self.rows += 1;
    }

    /// Append a column of default cells.
    pub fn add_column(&mut self) {
        let col = self.cols;
        for row in 0..self.rows {
            self.cells.insert(CellRef::new(row, col), Cell::new_empty());
        }
        self.cols += 1;
    }

    /// Remove the trailing row. No-op (returns false) when only one is left.
    pub fn remove_row(&mut self) -> bool {
        if self.rows <= 1 {
            return false;
        }
        let row = self.rows - 1;
        for col in 0..self.cols {
            self.cells.remove(&CellRef::new(row, col));
        }
        self.rows = row;
        true
    }

    /// Remove the trailing column. No-op (returns false) when only one is left.
    pub fn remove_column(&mut self) -> bool {
        if self.cols <= 1 {
            return false;
        }
        let col = self.cols - 1;
        for row in 0..self.rows {
            self.cells.remove(&CellRef::new(row, col));
        }
        self.cols = col;
        true
    }

    /// Coordinates holding a formula, in row-major order.
    pub fn formula_cells(&self) -> Vec<CellRef> {
        let mut refs: Vec<CellRef> = self
            .cells
            .iter()
            .filter(|entry| entry.value().is_formula())
            .map(|entry| entry.key().clone())
            .collect();
        refs.sort();
        refs
    }

    /// All records, sorted row-major.
    pub fn entries(&self) -> Vec<(CellRef, Cell)> {
        let mut cells: Vec<(CellRef, Cell)> = self
            .cells
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        cells
    }

    /// Number of stored records (always `rows * cols`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet::new(1, 1)
    }
}

impl PartialEq for Sheet {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.cells.len() == other.cells.len()
            && self.cells.iter().all(|entry| {
                other
                    .cells
                    .get(entry.key())
                    .is_some_and(|theirs| *theirs == *entry.value())
            })
    }
}
