//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and mirrors controller state for
//! rendering, plus the query and cursor owned by the terminal front-end.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
