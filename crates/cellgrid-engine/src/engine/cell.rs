//! Cell records stored in the grid.
//!
//! This module provides the data types for a single cell:
//! - [`Cell`] - Raw formula text, computed value, style and data-type hint
//! - [`CellStyle`], [`Alignment`], [`StyleChange`] - Presentation attributes
//! - [`DataType`] - Validation hint applied to evaluated values

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::format::parse_float;

/// Sentinel stored when an evaluated value fails its cell's data type.
pub const INVALID: &str = "#INVALID";

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    /// Displayed/computed result.
    pub value: String,
    /// Raw user input. Formulas start with '='.
    pub formula: String,
    pub style: CellStyle,
    pub data_type: DataType,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::default()
    }

    /// Whether the stored input is a formula that takes part in propagation.
    pub fn is_formula(&self) -> bool {
        self.formula.starts_with('=')
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Presentation attributes. Opaque to the evaluator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size: u16,
    pub color: String,
    pub align: Alignment,
}

impl Default for CellStyle {
    fn default() -> Self {
        CellStyle {
            bold: false,
            italic: false,
            underline: false,
            font_size: 14,
            color: "#000".to_string(),
            align: Alignment::Left,
        }
    }
}

/// A single formatting edit, as issued by a toolbar.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleChange {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    FontSize(u16),
    Color(String),
}

impl CellStyle {
    pub fn apply(&mut self, change: StyleChange) {
        match change {
            StyleChange::ToggleBold => self.bold = !self.bold,
            StyleChange::ToggleItalic => self.italic = !self.italic,
            StyleChange::ToggleUnderline => self.underline = !self.underline,
            StyleChange::FontSize(size) => self.font_size = size,
            StyleChange::Color(color) => self.color = color,
        }
    }
}

/// Validation hint applied after evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Number,
    Date,
}

impl DataType {
    /// Return the value to store for `value`: the value itself, or
    /// [`INVALID`] when it does not satisfy this type.
    pub fn validate(self, value: String) -> String {
        let ok = match self {
            DataType::Text => true,
            DataType::Number => parse_float(&value).is_some(),
            DataType::Date => is_date(&value),
        };
        if ok { value } else { INVALID.to_string() }
    }
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(DataType::Text),
            "number" => Ok(DataType::Number),
            "date" => Ok(DataType::Date),
            other => Err(format!("Unknown data type: {}", other)),
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Whether `text` reads as a calendar date or timestamp.
pub fn is_date(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(text).is_ok() || DateTime::parse_from_rfc2822(text).is_ok() {
        return true;
    }
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(text, fmt).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(text, fmt).is_ok())
}
