//! cellgrid_engine - Cell records, grid store and formula evaluation.

pub mod builtins;
pub mod chart;
pub mod engine;
