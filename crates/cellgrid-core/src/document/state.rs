use crate::config::SheetConfig;
use crate::error::Result;
use cellgrid_engine::engine::Sheet;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::History;

/// Default column width in pixels.
pub(crate) const DEFAULT_COLUMN_WIDTH: f64 = 80.0;
/// Default row height in pixels.
pub(crate) const DEFAULT_ROW_HEIGHT: f64 = 24.0;
pub(crate) const MIN_COLUMN_WIDTH: f64 = 40.0;
pub(crate) const MIN_ROW_HEIGHT: f64 = 20.0;

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The cell grid
    pub(crate) sheet: Sheet,
    /// Undo/redo snapshots of `sheet`
    pub(crate) history: History,
    pub(crate) config: SheetConfig,
    /// Column widths that differ from the default
    pub(crate) column_widths: BTreeMap<usize, f64>,
    /// Row heights that differ from the default
    pub(crate) row_heights: BTreeMap<usize, f64>,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the sheet has been modified since the last save or load
    pub modified: bool,
}

impl Document {
    /// Create a new document with the default configuration.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_config(SheetConfig::default())
    }

    pub fn with_config(config: SheetConfig) -> Self {
        let config = config.normalized();
        Document {
            sheet: Sheet::new(config.initial_rows, config.initial_cols),
            history: History::new(config.history_limit),
            config,
            column_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
            file_path: None,
            modified: false,
        }
    }

    /// Create a new document and load a file if provided. A path that does
    /// not exist yet becomes the save target.
    pub fn with_file(path: Option<PathBuf>, config: SheetConfig) -> Result<Self> {
        let mut doc = Self::with_config(config);
        if let Some(p) = path {
            if p.exists() {
                doc.load_file(&p)?;
                doc.history.clear();
            } else {
                doc.file_path = Some(p);
                doc.modified = false;
            }
        }
        Ok(doc)
    }

    /// The current grid.
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn rows(&self) -> usize {
        self.sheet.rows()
    }

    pub fn cols(&self) -> usize {
        self.sheet.cols()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
