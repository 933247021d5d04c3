//! File storage for documents.
//!
//! Documents are stored as a single JSON object (see [`SheetState`]).
//!
//! [`SheetState`]: crate::document::SheetState

pub mod json;

pub use json::{parse_state, parse_state_content, write_state, write_state_content};
