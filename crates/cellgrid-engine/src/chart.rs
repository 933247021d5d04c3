//! Chart data preparation.
//!
//! This module provides:
//! - [`values_for_coordinates`]: numeric values of a list of cells
//! - [`ChartData`]: prepared data for rendering (frontend-agnostic)
//!
//! Frontends pick the cells to plot; this module only turns their stored
//! values into numbers and axis ranges.

use crate::engine::{CellRef, Sheet, parse_float, parse_range};

/// Numeric value of each coordinate, in order. Cells that are empty,
/// non-numeric or outside the sheet contribute 0.
pub fn values_for_coordinates(sheet: &Sheet, coords: &[CellRef]) -> Vec<f64> {
    coords
        .iter()
        .map(|cell_ref| numeric_value(sheet, cell_ref).unwrap_or(0.0))
        .collect()
}

fn numeric_value(sheet: &Sheet, cell_ref: &CellRef) -> Option<f64> {
    let value = sheet.value(cell_ref)?;
    parse_float(&value).filter(|n| n.is_finite())
}

/// Coordinates of `range` in row-major order, corners in either order,
/// clamped to the sheet.
pub fn range_coordinates(range: &str, sheet: &Sheet) -> Vec<CellRef> {
    let Some((a, b)) = parse_range(range) else {
        return Vec::new();
    };
    let r1 = a.row.min(b.row);
    let r2 = a.row.max(b.row).min(sheet.rows().saturating_sub(1));
    let c1 = a.col.min(b.col);
    let c2 = a.col.max(b.col).min(sheet.cols().saturating_sub(1));
    if r1 > r2 || c1 > c2 {
        return Vec::new();
    }
    let mut coords = Vec::with_capacity((r2 - r1 + 1) * (c2 - c1 + 1));
    for row in r1..=r2 {
        for col in c1..=c2 {
            coords.push(CellRef::new(row, col));
        }
    }
    coords
}

/// Prepared data for rendering a bar chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartData {
    /// A1 name of each plotted cell.
    pub labels: Vec<String>,
    /// Data points as (index, value) pairs.
    pub points: Vec<(f32, f32)>,
    /// Y-axis range (min, max), never empty.
    pub y_range: (f32, f32),
    /// Warnings about data quality (e.g., cells treated as 0).
    pub warnings: Vec<String>,
}

impl ChartData {
    /// Build chart data from the given cells.
    pub fn from_cells(sheet: &Sheet, coords: &[CellRef]) -> Result<Self, String> {
        if coords.is_empty() {
            return Err("No data points to plot".to_string());
        }

        let mut skipped = 0;
        let mut points = Vec::with_capacity(coords.len());
        for (i, cell_ref) in coords.iter().enumerate() {
            let y = match numeric_value(sheet, cell_ref) {
                Some(v) => v as f32,
                None => {
                    skipped += 1;
                    0.0
                }
            };
            points.push((i as f32, y));
        }

        let mut warnings = Vec::new();
        if skipped > 0 {
            warnings.push(format!("{} non-numeric cell(s) treated as 0", skipped));
        }

        let (mut ymin, mut ymax) = (points[0].1, points[0].1);
        for (_, y) in &points {
            ymin = ymin.min(*y);
            ymax = ymax.max(*y);
        }
        if ymax == ymin {
            ymax = ymin + 1.0;
        }

        Ok(ChartData {
            labels: coords.iter().map(CellRef::to_string).collect(),
            points,
            y_range: (ymin, ymax),
            warnings,
        })
    }

    /// Build chart data from a range such as `A1:A10`.
    pub fn from_range(sheet: &Sheet, range: &str) -> Result<Self, String> {
        let coords = range_coordinates(range, sheet);
        if coords.is_empty() {
            return Err(format!("Invalid range: {}", range));
        }
        Self::from_cells(sheet, &coords)
    }
}
