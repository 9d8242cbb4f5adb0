//! Playback engine capability and its `rodio` implementation.
//!
//! The controller talks to the engine only through `PlaybackEngine`. The
//! shipped `RodioEngine` is a handle to a dedicated audio thread; commands are
//! sent over a channel and events come back through the observer callback.

mod handle;
mod source;
mod state;
mod thread;
mod types;

pub use handle::RodioEngine;
pub use types::*;

#[cfg(test)]
mod tests;
