//! Formula evaluation.
//!
//! [`evaluate`] turns a cell's raw input into the text stored as its value.
//! Input without a leading `=` is returned as-is. A formula is either a
//! built-in function call (`=SUM(A1:A3)`) or an arithmetic expression whose
//! cell references are replaced by the referenced values before parsing
//! (`=A1*2 + B1`).
//!
//! Evaluation never fails: problems are reported in-band with the
//! [`ERROR`] and [`CIRCULAR`] sentinels.

use regex::Regex;
use std::sync::OnceLock;

use super::arith::eval_arithmetic;
use super::cell_ref::{CellRef, parse_range};
use super::deps::{extract_references, substitute_references};
use super::format::{format_number, parse_float};
use super::sheet::Sheet;

/// Malformed formula, unknown function, or failed arithmetic.
pub const ERROR: &str = "#ERROR";
/// The formula refers to its own cell.
pub const CIRCULAR: &str = "#CIRCULAR!";

/// `NAME(args)` spanning the whole formula body.
fn function_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_]+)\((.*)\)$").expect("function call regex must compile")
    })
}

/// A single upper-case A1 reference, as written in a function argument.
fn argument_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\$?[A-Z]+\$?[0-9]+$").expect("argument reference regex must compile")
    })
}

/// Evaluate `formula` as entered in `self_ref`, reading values from `sheet`.
pub fn evaluate(formula: &str, self_ref: &CellRef, sheet: &Sheet) -> String {
    let Some(body) = formula.strip_prefix('=') else {
        return formula.to_string();
    };
    let expr = body.trim();

    if let Some(caps) = function_call_re().captures(expr) {
        let name = caps[1].to_ascii_uppercase();
        return crate::builtins::call(&name, &caps[2], sheet);
    }

    evaluate_arithmetic(expr, self_ref, sheet)
}

fn evaluate_arithmetic(expr: &str, self_ref: &CellRef, sheet: &Sheet) -> String {
    // Only direct self-reference is detected; longer cycles just read stale values.
    if extract_references(expr).iter().any(|r| r == self_ref) {
        return CIRCULAR.to_string();
    }

    let substituted = substitute_references(expr, |cell_ref| {
        match sheet.value(cell_ref) {
            Some(value) if !value.is_empty() => value,
            _ => "0".to_string(),
        }
    });

    match eval_arithmetic(&substituted) {
        Ok(n) => format_number(n),
        Err(e) => {
            log::trace!("arithmetic '{}' failed: {}", substituted, e);
            ERROR.to_string()
        }
    }
}

/// Resolve one function argument to text.
///
/// A single upper-case cell reference yields that cell's value (empty when
/// it lies outside the sheet), a quoted token yields its contents, anything
/// else (including lower-case `abc1`) is returned trimmed.
pub fn resolve_argument(arg: &str, sheet: &Sheet) -> String {
    let trimmed = arg.trim();
    if argument_reference_re().is_match(trimmed) {
        if let Some(cell_ref) = CellRef::from_str(trimmed) {
            return sheet.value(&cell_ref).unwrap_or_default();
        }
    }
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted {
        return trimmed[1..trimmed.len() - 1].to_string();
    }
    trimmed.to_string()
}

/// Row and column bounds of `range`, clamped to the sheet. `None` when the
/// range is malformed or has no rows. Columns may come back reversed
/// (`B1:A3`); callers then see each row with no cells.
fn range_bounds(range: &str, sheet: &Sheet) -> Option<(CellRef, CellRef)> {
    let (start, end) = parse_range(range)?;
    let last_row = end.row.min(sheet.rows().saturating_sub(1));
    let last_col = end.col.min(sheet.cols().saturating_sub(1));
    if start.row > last_row {
        return None;
    }
    Some((start, CellRef::new(last_row, last_col)))
}

/// Values of `range` as numbers, row-major; non-numeric cells count as 0.
pub fn range_numbers(range: &str, sheet: &Sheet) -> Vec<f64> {
    let Some((start, end)) = range_bounds(range, sheet) else {
        return Vec::new();
    };
    let mut values = Vec::new();
    for row in start.row..=end.row {
        for col in start.col..=end.col {
            let value = sheet.value(&CellRef::new(row, col)).unwrap_or_default();
            values.push(parse_float(&value).unwrap_or(0.0));
        }
    }
    values
}

/// Raw values of `range` as rows of text.
pub fn range_rows(range: &str, sheet: &Sheet) -> Vec<Vec<String>> {
    let Some((start, end)) = range_bounds(range, sheet) else {
        return Vec::new();
    };
    (start.row..=end.row)
        .map(|row| {
            (start.col..=end.col)
                .map(|col| sheet.value(&CellRef::new(row, col)).unwrap_or_default())
                .collect()
        })
        .collect()
}
