use super::Document;
use super::eval::evaluate_cell;
use super::state::{DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT, MIN_COLUMN_WIDTH, MIN_ROW_HEIGHT};
use crate::error::{Result, SheetError};
use cellgrid_engine::chart;
use cellgrid_engine::engine::{Alignment, Cell, CellRef, DataType, StyleChange};

impl Document {
    fn check_bounds(&self, cell_ref: &CellRef) -> Result<()> {
        if self.sheet.contains(cell_ref) {
            Ok(())
        } else {
            Err(SheetError::OutOfBounds {
                cell: cell_ref.clone(),
            })
        }
    }

    /// Push the current sheet onto the undo stack before a mutation.
    fn push_undo(&mut self) {
        self.history.snapshot(&self.sheet);
        self.modified = true;
    }

    /// Store user input for a cell and refresh every formula value.
    ///
    /// The formula text is kept even when its value fails the cell's data
    /// type (the value becomes `#INVALID`). The propagation pass that follows
    /// rewrites formula values without applying data types, so an edited
    /// formula cell ends up holding its plain result.
    pub fn on_edit(&mut self, cell_ref: &CellRef, input: &str) -> Result<()> {
        self.check_bounds(cell_ref)?;
        self.push_undo();

        let value = evaluate_cell(&self.sheet, cell_ref, input);
        self.sheet.set_formula(cell_ref, input);
        self.sheet.set_value(cell_ref, value);
        log::debug!("edit {}: {:?}", cell_ref, input);

        self.propagate();
        Ok(())
    }

    pub fn set_style(&mut self, cell_ref: &CellRef, change: StyleChange) -> Result<()> {
        self.check_bounds(cell_ref)?;
        self.push_undo();
        self.sheet.set_style(cell_ref, change);
        Ok(())
    }

    pub fn set_alignment(&mut self, cell_ref: &CellRef, alignment: Alignment) -> Result<()> {
        self.check_bounds(cell_ref)?;
        self.push_undo();
        self.sheet.set_alignment(cell_ref, alignment);
        Ok(())
    }

    /// Change the validation hint of a cell. The stored value is checked
    /// again on the next edit.
    pub fn set_data_type(&mut self, cell_ref: &CellRef, data_type: DataType) -> Result<()> {
        self.check_bounds(cell_ref)?;
        self.push_undo();
        self.sheet.set_data_type(cell_ref, data_type);
        Ok(())
    }

    /// Append a row of empty cells.
    pub fn add_row(&mut self) {
        self.push_undo();
        self.sheet.add_row();
        log::debug!("added row, now {} rows", self.sheet.rows());
    }

    /// Append a column of empty cells.
    pub fn add_column(&mut self) {
        self.push_undo();
        self.sheet.add_column();
        log::debug!("added column, now {} columns", self.sheet.cols());
    }

    /// Remove the last row. Returns false (and records nothing) when only
    /// one row is left.
    pub fn delete_row(&mut self) -> bool {
        if self.sheet.rows() <= 1 {
            return false;
        }
        self.push_undo();
        let removed = self.sheet.remove_row();
        log::debug!("deleted row, now {} rows", self.sheet.rows());
        removed
    }

    /// Remove the last column. Returns false (and records nothing) when
    /// only one column is left.
    pub fn delete_column(&mut self) -> bool {
        if self.sheet.cols() <= 1 {
            return false;
        }
        self.push_undo();
        let removed = self.sheet.remove_column();
        log::debug!("deleted column, now {} columns", self.sheet.cols());
        removed
    }

    /// Undo the last action
    pub fn undo(&mut self) -> Result<()> {
        let previous = self
            .history
            .undo(&self.sheet)
            .ok_or(SheetError::NothingToUndo)?;
        self.sheet = previous;
        self.modified = true;
        log::debug!("undo ({} left)", self.history.undo_len());
        Ok(())
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> Result<()> {
        let next = self
            .history
            .redo(&self.sheet)
            .ok_or(SheetError::NothingToRedo)?;
        self.sheet = next;
        self.modified = true;
        log::debug!("redo ({} left)", self.history.redo_len());
        Ok(())
    }

    /// A copy of the cell at `cell_ref`.
    pub fn cell(&self, cell_ref: &CellRef) -> Option<Cell> {
        self.sheet.cell(cell_ref)
    }

    /// The displayed value of a cell, empty outside the sheet.
    pub fn get_cell_display(&self, cell_ref: &CellRef) -> String {
        self.sheet.value(cell_ref).unwrap_or_default()
    }

    /// Numeric values of the given cells for charting; non-numeric cells
    /// read as 0.
    pub fn values_for_coordinates(&self, coords: &[CellRef]) -> Vec<f64> {
        chart::values_for_coordinates(&self.sheet, coords)
    }

    /// Set a column width in pixels, clamped to the minimum.
    pub fn set_column_width(&mut self, col: usize, width: f64) {
        let width = if width.is_finite() { width.max(MIN_COLUMN_WIDTH) } else { DEFAULT_COLUMN_WIDTH };
        self.column_widths.insert(col, width);
    }

    /// Set a row height in pixels, clamped to the minimum.
    pub fn set_row_height(&mut self, row: usize, height: f64) {
        let height = if height.is_finite() { height.max(MIN_ROW_HEIGHT) } else { DEFAULT_ROW_HEIGHT };
        self.row_heights.insert(row, height);
    }

    pub fn column_width(&self, col: usize) -> f64 {
        self.column_widths.get(&col).copied().unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn row_height(&self, row: usize) -> f64 {
        self.row_heights.get(&row).copied().unwrap_or(DEFAULT_ROW_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PropagationMode, SheetConfig};
    use cellgrid_engine::engine::{CIRCULAR, INVALID};

    fn a1(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn small_doc() -> Document {
        Document::with_config(SheetConfig {
            initial_rows: 5,
            initial_cols: 5,
            ..SheetConfig::default()
        })
    }

    #[test]
    fn test_plain_edit_stores_formula_and_value() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "hello").unwrap();
        let cell = doc.cell(&a1("A1")).unwrap();
        assert_eq!(cell.formula, "hello");
        assert_eq!(cell.value, "hello");
        assert!(doc.modified);
    }

    #[test]
    fn test_sum_over_column() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "1").unwrap();
        doc.on_edit(&a1("A2"), "2").unwrap();
        doc.on_edit(&a1("A3"), "x").unwrap();
        doc.on_edit(&a1("B1"), "=SUM(A1:A3)").unwrap();
        assert_eq!(doc.get_cell_display(&a1("B1")), "3");
    }

    #[test]
    fn test_forward_chain_converges_in_one_edit() {
        let mut doc = small_doc();
        doc.on_edit(&a1("B1"), "=A1*2").unwrap();
        doc.on_edit(&a1("C1"), "=B1+1").unwrap();
        doc.on_edit(&a1("A1"), "5").unwrap();
        assert_eq!(doc.get_cell_display(&a1("B1")), "10");
        assert_eq!(doc.get_cell_display(&a1("C1")), "11");
    }

    #[test]
    fn test_backward_chain_is_stale_after_single_pass() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "=B1+1").unwrap();
        doc.on_edit(&a1("B1"), "=C1*2").unwrap();
        doc.on_edit(&a1("C1"), "3").unwrap();
        assert_eq!(doc.get_cell_display(&a1("B1")), "6");
        // A1 was visited before B1 picked up the new C1.
        assert_eq!(doc.get_cell_display(&a1("A1")), "1");

        doc.on_edit(&a1("D1"), "anything").unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), "7");
    }

    #[test]
    fn test_fixed_point_mode_settles_backward_chain() {
        let mut doc = Document::with_config(SheetConfig {
            initial_rows: 2,
            initial_cols: 3,
            propagation: PropagationMode::FixedPoint,
            ..SheetConfig::default()
        });
        doc.on_edit(&a1("A1"), "=B1+1").unwrap();
        doc.on_edit(&a1("B1"), "=C1*2").unwrap();
        doc.on_edit(&a1("C1"), "3").unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), "7");
    }

    #[test]
    fn test_self_reference() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "=A1+1").unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), CIRCULAR);
    }

    #[test]
    fn test_number_type_rejects_text_but_keeps_formula() {
        let mut doc = small_doc();
        doc.set_data_type(&a1("A1"), DataType::Number).unwrap();
        doc.on_edit(&a1("A1"), "abc").unwrap();
        let cell = doc.cell(&a1("A1")).unwrap();
        assert_eq!(cell.value, INVALID);
        assert_eq!(cell.formula, "abc");
    }

    #[test]
    fn test_dependent_type_not_checked_during_propagation() {
        let mut doc = small_doc();
        doc.set_data_type(&a1("B1"), DataType::Number).unwrap();
        doc.on_edit(&a1("B1"), "=UPPER(A1)").unwrap();
        doc.on_edit(&a1("A1"), "12").unwrap();
        assert_eq!(doc.get_cell_display(&a1("B1")), "12");
        doc.on_edit(&a1("A1"), "twelve").unwrap();
        assert_eq!(doc.get_cell_display(&a1("B1")), "TWELVE");
        assert_eq!(doc.cell(&a1("B1")).unwrap().data_type, DataType::Number);
    }

    #[test]
    fn test_edit_outside_sheet_is_rejected_without_snapshot() {
        let mut doc = small_doc();
        let err = doc.on_edit(&CellRef::new(99, 0), "1").unwrap_err();
        assert!(matches!(err, SheetError::OutOfBounds { .. }));
        assert!(!doc.history().can_undo());
        assert!(!doc.modified);
    }

    #[test]
    fn test_undo_redo_restore_exact_sheets() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "1").unwrap();
        let before = doc.sheet().clone();
        doc.on_edit(&a1("A1"), "2").unwrap();
        let after = doc.sheet().clone();

        doc.undo().unwrap();
        assert_eq!(*doc.sheet(), before);
        doc.redo().unwrap();
        assert_eq!(*doc.sheet(), after);
    }

    #[test]
    fn test_undo_redo_on_empty_history() {
        let mut doc = small_doc();
        let before = doc.sheet().clone();
        assert!(matches!(doc.undo(), Err(SheetError::NothingToUndo)));
        assert!(matches!(doc.redo(), Err(SheetError::NothingToRedo)));
        assert_eq!(*doc.sheet(), before);
    }

    #[test]
    fn test_undo_structural_change_restores_dimensions() {
        let mut doc = small_doc();
        doc.add_row();
        doc.add_column();
        assert_eq!((doc.rows(), doc.cols()), (6, 6));
        doc.undo().unwrap();
        doc.undo().unwrap();
        assert_eq!((doc.rows(), doc.cols()), (5, 5));
        assert_eq!(doc.sheet().len(), 25);
    }

    #[test]
    fn test_deleting_last_line_is_noop() {
        let mut doc = Document::with_config(SheetConfig {
            initial_rows: 1,
            initial_cols: 1,
            ..SheetConfig::default()
        });
        assert!(!doc.delete_row());
        assert!(!doc.delete_column());
        assert_eq!((doc.rows(), doc.cols()), (1, 1));
        assert!(!doc.history().can_undo());
    }

    #[test]
    fn test_delete_row_then_undo() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A5"), "bottom").unwrap();
        assert!(doc.delete_row());
        assert_eq!(doc.rows(), 4);
        assert!(doc.cell(&a1("A5")).is_none());
        doc.undo().unwrap();
        assert_eq!(doc.get_cell_display(&a1("A5")), "bottom");
    }

    #[test]
    fn test_style_changes_are_undoable() {
        let mut doc = small_doc();
        doc.set_style(&a1("A1"), StyleChange::ToggleBold).unwrap();
        doc.set_alignment(&a1("A1"), Alignment::Right).unwrap();
        let style = doc.cell(&a1("A1")).unwrap().style;
        assert!(style.bold);
        assert_eq!(style.align, Alignment::Right);

        doc.undo().unwrap();
        doc.undo().unwrap();
        let style = doc.cell(&a1("A1")).unwrap().style;
        assert!(!style.bold);
        assert_eq!(style.align, Alignment::Left);
    }

    #[test]
    fn test_history_limit_from_config() {
        let mut doc = Document::with_config(SheetConfig {
            history_limit: 2,
            ..SheetConfig::default()
        });
        for i in 0..5 {
            doc.on_edit(&a1("A1"), &i.to_string()).unwrap();
        }
        assert_eq!(doc.history().undo_len(), 2);
    }

    #[test]
    fn test_values_for_coordinates() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "4").unwrap();
        doc.on_edit(&a1("A2"), "text").unwrap();
        let values = doc.values_for_coordinates(&[a1("A1"), a1("A2"), a1("A3")]);
        assert_eq!(values, vec![4.0, 0.0, 0.0]);
    }

    #[test]
    fn test_view_sizes_clamp_and_skip_history() {
        let mut doc = small_doc();
        assert_eq!(doc.column_width(0), 80.0);
        assert_eq!(doc.row_height(0), 24.0);
        doc.set_column_width(0, 10.0);
        doc.set_row_height(0, 30.0);
        assert_eq!(doc.column_width(0), 40.0);
        assert_eq!(doc.row_height(0), 30.0);
        assert!(!doc.history().can_undo());
    }
}
