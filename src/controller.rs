//! The playback controller: owns the result list and transport state, runs
//! debounced searches, drives the engine and reports every change to a
//! single observer.
//!
//! Everything here runs on one thread. Search workers and the audio thread
//! never touch controller state; they post to the controller's inbox, which
//! is drained by `Controller::poll`.

mod executor;
mod model;
mod notify;
mod state;

pub use executor::*;
pub use model::*;
pub use notify::*;
pub use state::*;
