//! Text output for the command line.

use cellgrid_core::Document;
#[cfg(feature = "chart")]
use cellgrid_engine::chart::ChartData;

/// `REF: value` for every cell with a non-empty value, row-major.
pub fn format_values(doc: &Document) -> String {
    let mut out = String::new();
    for (cell_ref, cell) in doc.sheet().entries() {
        if cell.value.is_empty() {
            continue;
        }
        out.push_str(&format!("{}: {}\n", cell_ref, cell.value));
    }
    out
}

/// Render chart data as a bar chart using textplots.
///
/// `width` and `height` are in Braille points (2x4 per terminal character).
#[cfg(feature = "chart")]
pub fn render_chart(data: &ChartData, width: u32, height: u32) -> String {
    use textplots::{Chart, LabelBuilder, LabelFormat, Plot, Shape};

    let (ymin, ymax) = data.y_range;
    let span_x = data.points.len() as f32;

    // Shift points so the minimum maps to 0 (textplots draws axes at y=0)
    let shifted_points: Vec<(f32, f32)> = data
        .points
        .iter()
        .map(|(x, y)| (*x, y - ymin))
        .collect();

    let mut chart = Chart::new_with_y_range(width, height, 0.0, span_x, 0.0, ymax - ymin);
    let shape = Shape::Bars(&shifted_points);
    let labels = data.labels.clone();
    let chart = chart
        .x_label_format(LabelFormat::Custom(Box::new(move |v| {
            labels
                .get(v.max(0.0) as usize)
                .cloned()
                .unwrap_or_default()
        })))
        .y_label_format(LabelFormat::Custom(Box::new(move |v| {
            format!("{:.1}", v + ymin)
        })))
        .lineplot(&shape);
    chart.borders();
    chart.axis();
    chart.figures();

    let mut out = chart.frame();
    if !data.warnings.is_empty() {
        out.push_str(&format!("\nWarning: {}", data.warnings.join("; ")));
    }
    out
}
