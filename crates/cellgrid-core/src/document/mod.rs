//! Document state and logic (UI-agnostic).

mod eval;
mod history;
mod io;
mod ops;
mod state;

pub use history::History;
pub use io::SheetState;
pub use state::Document;
