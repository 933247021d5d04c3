//! cellgrid-core - Document model, propagation, history and storage.

pub mod config;
pub mod document;
pub mod error;
pub mod storage;

pub use config::{PropagationMode, SheetConfig};
pub use document::{Document, History, SheetState};
pub use error::{Result, SheetError};

pub use cellgrid_engine::engine::CellRef;
