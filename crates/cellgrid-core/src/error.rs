//! Error types for Cellgrid core.

use thiserror::Error;

use cellgrid_engine::engine::CellRef;

/// Errors that can occur while editing, saving or loading a sheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cell {cell} is outside the sheet")]
    OutOfBounds { cell: CellRef },

    #[error("A {rows}x{cols} sheet exceeds the limit of {max} cells")]
    TooLarge { rows: usize, cols: usize, max: usize },

    #[error("No file path set")]
    NoFilePath,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

pub type Result<T> = std::result::Result<T, SheetError>;
