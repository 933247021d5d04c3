//! Reader and writer for the JSON document format

use crate::document::SheetState;
use crate::error::{Result, SheetError};
use std::fs;
use std::path::Path;

/// Refuse to read files larger than this.
const MAX_DOCUMENT_BYTES: u64 = 64 * 1_048_576; // 64 MiB

/// Write a state to a JSON file
pub fn write_state(path: &Path, state: &SheetState) -> Result<()> {
    let content = write_state_content(state)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write a state to a pretty-printed JSON string
pub fn write_state_content(state: &SheetState) -> Result<String> {
    let mut content = serde_json::to_string_pretty(state)?;
    content.push('\n');
    Ok(content)
}

/// Parse a JSON document file
pub fn parse_state(path: &Path) -> Result<SheetState> {
    let meta = fs::metadata(path)?;
    if meta.len() > MAX_DOCUMENT_BYTES {
        return Err(SheetError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_DOCUMENT_BYTES
            ),
        )));
    }
    let content = fs::read_to_string(path)?;
    parse_state_content(&content)
}

/// Parse JSON document content from a string
pub fn parse_state_content(content: &str) -> Result<SheetState> {
    Ok(serde_json::from_str(content)?)
}
