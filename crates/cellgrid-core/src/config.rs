//! Document settings.
//!
//! Frontends deserialize [`SheetConfig`] from their own config files; every
//! field is optional and falls back to its default.

use cellgrid_engine::engine::MAX_CELLS;
use serde::{Deserialize, Serialize};

/// How values are refreshed after an edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationMode {
    /// One row-major pass over all formula cells. Cells that depend on a
    /// cell visited later keep their stale value until the next edit.
    #[default]
    SinglePass,
    /// Repeat the pass until no value changes or `max_passes` ran.
    FixedPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    pub initial_rows: usize,
    pub initial_cols: usize,
    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,
    pub propagation: PropagationMode,
    /// Upper bound on passes in fixed-point mode.
    pub max_passes: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            initial_rows: 20,
            initial_cols: 10,
            history_limit: 100,
            propagation: PropagationMode::SinglePass,
            max_passes: 16,
        }
    }
}

impl SheetConfig {
    /// Clamp every limit to at least 1, and the initial sheet to at most
    /// [`MAX_CELLS`] cells (rows win, columns shrink to fit).
    pub fn normalized(mut self) -> Self {
        self.initial_rows = self.initial_rows.clamp(1, MAX_CELLS);
        self.initial_cols = self.initial_cols.clamp(1, MAX_CELLS / self.initial_rows);
        self.history_limit = self.history_limit.max(1);
        self.max_passes = self.max_passes.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SheetConfig::default();
        assert_eq!((config.initial_rows, config.initial_cols), (20, 10));
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.propagation, PropagationMode::SinglePass);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: SheetConfig =
            serde_json::from_str(r#"{"propagation": "fixed-point", "initial_rows": 3}"#).unwrap();
        assert_eq!(config.propagation, PropagationMode::FixedPoint);
        assert_eq!(config.initial_rows, 3);
        assert_eq!(config.initial_cols, 10);
    }

    #[test]
    fn test_normalized_clamps_zero() {
        let config = SheetConfig {
            initial_rows: 0,
            history_limit: 0,
            max_passes: 0,
            ..SheetConfig::default()
        }
        .normalized();
        assert_eq!(config.initial_rows, 1);
        assert_eq!(config.history_limit, 1);
        assert_eq!(config.max_passes, 1);
    }

    #[test]
    fn test_normalized_bounds_initial_sheet() {
        let config = SheetConfig {
            initial_rows: usize::MAX,
            initial_cols: usize::MAX,
            ..SheetConfig::default()
        }
        .normalized();
        assert_eq!((config.initial_rows, config.initial_cols), (MAX_CELLS, 1));

        let config = SheetConfig {
            initial_rows: 2_000,
            initial_cols: 2_000,
            ..SheetConfig::default()
        }
        .normalized();
        assert_eq!((config.initial_rows, config.initial_cols), (2_000, 500));
    }
}
