//! Spreadsheet engine API.
//!
//! This module provides the computation side of the spreadsheet:
//!
//! - [`Cell`], [`CellStyle`], [`DataType`] - Per-coordinate records
//! - [`Sheet`], [`Grid`] - The rectangular grid store
//! - [`CellRef`] - Cell reference parsing (A1 notation <-> row/col indices)
//! - [`evaluate`] - Formula evaluation against a sheet
//! - [`eval_arithmetic`] - The arithmetic expression parser
//! - [`format_number`] - Number display

mod arith;
mod cell;
mod cell_ref;
mod deps;
mod eval;
mod format;
mod sheet;

pub use arith::{ArithError, BinaryOp, Expr, eval_arithmetic, parse_expression};
pub use cell::{Alignment, Cell, CellStyle, DataType, INVALID, StyleChange, is_date};
pub use cell_ref::{CellRef, parse_range};
pub use deps::{extract_references, substitute_references};
pub use eval::{CIRCULAR, ERROR, evaluate, range_numbers, range_rows, resolve_argument};
pub use format::{format_number, parse_float, parse_float_or_nan};
pub use sheet::{Grid, MAX_CELLS, Sheet};
