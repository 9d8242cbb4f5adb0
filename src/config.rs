//! Configuration loader and schema types.
//!
//! This module exposes the configuration schema used to drive the search
//! client, the playback engine and the terminal front-end, plus helpers to
//! load it from disk and the environment.

mod load;
mod schema;

pub use schema::*;

#[cfg(test)]
mod tests;
