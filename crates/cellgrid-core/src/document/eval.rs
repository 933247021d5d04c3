use super::Document;
use crate::config::PropagationMode;
use cellgrid_engine::engine::{CellRef, Sheet, evaluate};

/// Evaluate `formula` as entered in `cell_ref` and apply the cell's data type.
pub(crate) fn evaluate_cell(sheet: &Sheet, cell_ref: &CellRef, formula: &str) -> String {
    let value = evaluate(formula, cell_ref, sheet);
    match sheet.data_type(cell_ref) {
        Some(data_type) => data_type.validate(value),
        None => value,
    }
}

/// Re-evaluate every formula cell once, in row-major order. Each cell reads
/// the values already written earlier in the pass. Data types are not
/// applied here; only the edited cell is validated. Returns how many values
/// changed.
pub(crate) fn propagate_once(sheet: &Sheet) -> usize {
    let formulas = sheet.formula_cells();
    let mut changed = 0;
    for cell_ref in &formulas {
        let Some(formula) = sheet.formula(cell_ref) else {
            continue;
        };
        let value = evaluate(&formula, cell_ref, sheet);
        log::trace!("{} = {:?}", cell_ref, value);
        if sheet.value(cell_ref).as_deref() != Some(value.as_str()) {
            changed += 1;
        }
        sheet.set_value(cell_ref, value);
    }
    changed
}

impl Document {
    /// Refresh formula values according to the configured propagation mode.
    pub(crate) fn propagate(&mut self) {
        let passes = match self.config.propagation {
            PropagationMode::SinglePass => 1,
            PropagationMode::FixedPoint => self.config.max_passes,
        };
        for pass in 1..=passes {
            let changed = propagate_once(&self.sheet);
            log::debug!("propagation pass {}: {} value(s) changed", pass, changed);
            if changed == 0 {
                break;
            }
        }
    }
}
