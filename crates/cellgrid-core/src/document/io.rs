use super::Document;
use crate::error::{Result, SheetError};
use crate::storage::{parse_state, write_state};
use cellgrid_engine::engine::{Cell, CellRef, MAX_CELLS, Sheet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Serializable form of a document: every cell keyed by its A1 name plus
/// the sheet dimensions and view sizes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetState {
    pub grid: BTreeMap<CellRef, Cell>,
    pub row_count: usize,
    pub col_count: usize,
    pub column_widths: BTreeMap<usize, f64>,
    pub row_heights: BTreeMap<usize, f64>,
}

impl Document {
    /// Snapshot the full document for persistence.
    pub fn export_state(&self) -> SheetState {
        SheetState {
            grid: self.sheet.entries().into_iter().collect(),
            row_count: self.sheet.rows(),
            col_count: self.sheet.cols(),
            column_widths: self.column_widths.clone(),
            row_heights: self.row_heights.clone(),
        }
    }

    /// Replace the document with `state`. Undoable.
    ///
    /// Dimensions are clamped to at least 1, cells outside the rectangle are
    /// dropped and missing cells are filled with defaults. Stored values are
    /// taken as-is, not recomputed. Dimensions beyond [`MAX_CELLS`] are
    /// refused with [`SheetError::TooLarge`] and leave the document as it was.
    pub fn import_state(&mut self, state: SheetState) -> Result<()> {
        if !Sheet::fits(state.row_count, state.col_count) {
            return Err(SheetError::TooLarge {
                rows: state.row_count,
                cols: state.col_count,
                max: MAX_CELLS,
            });
        }
        self.history.snapshot(&self.sheet);

        let rows = state.row_count.max(1);
        let cols = state.col_count.max(1);
        if rows != state.row_count || cols != state.col_count {
            log::warn!(
                "imported dimensions {}x{} clamped to {}x{}",
                state.row_count,
                state.col_count,
                rows,
                cols
            );
        }
        let mut dropped = 0;
        for cell_ref in state.grid.keys() {
            if cell_ref.row >= rows || cell_ref.col >= cols {
                log::warn!("dropping imported cell {} outside {}x{}", cell_ref, rows, cols);
                dropped += 1;
            }
        }

        let (sheet, fixed) = Sheet::from_cells(rows, cols, state.grid);
        let defaulted = fixed.saturating_sub(dropped);
        if defaulted > 0 {
            log::warn!("{} missing cell(s) filled with defaults", defaulted);
        }

        self.sheet = sheet;
        self.column_widths = state.column_widths;
        self.row_heights = state.row_heights;
        self.modified = true;
        Ok(())
    }

    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = self.file_path.clone() else {
            return Err(SheetError::NoFilePath);
        };
        self.save_as(&path)?;
        Ok(path)
    }

    /// Save to `path` and make it the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        write_state(path, &self.export_state())?;
        log::info!("saved {}", path.display());
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Load from file. The previous sheet stays on the undo stack.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let state = parse_state(path)?;
        self.import_state(state)?;
        log::info!("loaded {} ({}x{})", path.display(), self.rows(), self.cols());
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use cellgrid_engine::engine::DataType;

    fn a1(name: &str) -> CellRef {
        CellRef::from_str(name).unwrap()
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "cellgrid_{}_{}_{}_{:?}.json",
            tag,
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            std::thread::current().id(),
        ))
    }

    struct Cleanup(PathBuf);
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn small_doc() -> Document {
        Document::with_config(SheetConfig {
            initial_rows: 3,
            initial_cols: 2,
            ..SheetConfig::default()
        })
    }

    #[test]
    fn test_export_uses_a1_keys_and_camel_case() {
        let mut doc = small_doc();
        doc.on_edit(&a1("B2"), "=1+1").unwrap();
        doc.set_column_width(1, 120.0);
        let json = serde_json::to_value(doc.export_state()).unwrap();

        assert_eq!(json["rowCount"], 3);
        assert_eq!(json["colCount"], 2);
        assert_eq!(json["grid"]["B2"]["value"], "2");
        assert_eq!(json["grid"]["B2"]["formula"], "=1+1");
        assert_eq!(json["grid"]["B2"]["dataType"], "text");
        assert_eq!(json["grid"].as_object().unwrap().len(), 6);
        assert_eq!(json["columnWidths"]["1"], 120.0);
    }

    #[test]
    fn test_import_replaces_state_and_is_undoable() {
        let mut source = small_doc();
        source.on_edit(&a1("A1"), "7").unwrap();
        source.add_row();
        let state = source.export_state();

        let mut doc = small_doc();
        let before = doc.sheet().clone();
        doc.import_state(state.clone()).unwrap();
        assert_eq!(doc.export_state(), state);

        doc.undo().unwrap();
        assert_eq!(*doc.sheet(), before);
    }

    #[test]
    fn test_import_normalises_inconsistent_state() {
        let mut grid = BTreeMap::new();
        let mut cell = Cell::new_empty();
        cell.value = "kept".to_string();
        cell.data_type = DataType::Number;
        grid.insert(a1("A1"), cell.clone());
        grid.insert(a1("Z9"), Cell::new_empty());

        let mut doc = small_doc();
        doc.import_state(SheetState {
            grid,
            row_count: 0,
            col_count: 2,
            ..SheetState::default()
        })
        .unwrap();

        assert_eq!((doc.rows(), doc.cols()), (1, 2));
        assert_eq!(doc.sheet().len(), 2);
        assert_eq!(doc.cell(&a1("A1")), Some(cell));
        assert_eq!(doc.cell(&a1("B1")), Some(Cell::new_empty()));
    }

    #[test]
    fn test_import_does_not_recompute() {
        let mut grid = BTreeMap::new();
        let mut cell = Cell::new_empty();
        cell.formula = "=1+1".to_string();
        cell.value = "stale".to_string();
        grid.insert(a1("A1"), cell);

        let mut doc = small_doc();
        doc.import_state(SheetState {
            grid,
            row_count: 1,
            col_count: 1,
            ..SheetState::default()
        })
        .unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), "stale");
    }

    #[test]
    fn test_import_refuses_oversized_dimensions() {
        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "kept").unwrap();
        let before = doc.sheet().clone();
        let undo_len = doc.history().undo_len();

        for (rows, cols) in [(usize::MAX / 2, 4), (1_000_000, 1_000_000), (MAX_CELLS + 1, 1)] {
            let result = doc.import_state(SheetState {
                row_count: rows,
                col_count: cols,
                ..SheetState::default()
            });
            assert!(matches!(result, Err(SheetError::TooLarge { .. })), "{}x{}", rows, cols);
        }

        assert_eq!(*doc.sheet(), before);
        assert_eq!(doc.history().undo_len(), undo_len);
    }

    #[test]
    fn test_load_refuses_oversized_file() {
        let path = temp_path("oversized_dims");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, r#"{"grid": {}, "rowCount": 9223372036854775807, "colCount": 4}"#)
            .unwrap();

        let mut doc = small_doc();
        let before = doc.sheet().clone();
        assert!(matches!(doc.load_file(&path), Err(SheetError::TooLarge { .. })));
        assert_eq!(*doc.sheet(), before);
        assert!(doc.file_path.is_none());
        assert!(Document::with_file(Some(path.clone()), SheetConfig::default()).is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("round_trip");
        let _cleanup = Cleanup(path.clone());

        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "3").unwrap();
        doc.on_edit(&a1("A2"), "=A1*3").unwrap();
        doc.set_row_height(2, 48.0);
        doc.save_as(&path).unwrap();
        assert!(!doc.modified);

        let loaded = Document::with_file(Some(path.clone()), SheetConfig::default()).unwrap();
        assert_eq!(loaded.get_cell_display(&a1("A2")), "9");
        assert_eq!(loaded.row_height(2), 48.0);
        assert_eq!((loaded.rows(), loaded.cols()), (3, 2));
        assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
        assert!(!loaded.history().can_undo());
    }

    #[test]
    fn test_load_file_is_undoable() {
        let path = temp_path("undoable_load");
        let _cleanup = Cleanup(path.clone());

        let mut other = small_doc();
        other.on_edit(&a1("A1"), "from file").unwrap();
        other.save_as(&path).unwrap();

        let mut doc = small_doc();
        doc.on_edit(&a1("A1"), "local").unwrap();
        doc.load_file(&path).unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), "from file");
        doc.undo().unwrap();
        assert_eq!(doc.get_cell_display(&a1("A1")), "local");
    }

    #[test]
    fn test_save_without_path() {
        let mut doc = small_doc();
        assert!(matches!(doc.save_file(), Err(SheetError::NoFilePath)));
    }

    #[test]
    fn test_with_missing_file_sets_target() {
        let path = temp_path("missing");
        let doc = Document::with_file(Some(path.clone()), SheetConfig::default()).unwrap();
        assert_eq!(doc.file_path, Some(path));
        assert_eq!((doc.rows(), doc.cols()), (20, 10));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let path = temp_path("malformed");
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "{ not json").unwrap();

        let mut doc = small_doc();
        let before = doc.sheet().clone();
        assert!(matches!(doc.load_file(&path), Err(SheetError::Json(_))));
        assert_eq!(*doc.sheet(), before);
        assert!(doc.file_path.is_none());
    }
}
