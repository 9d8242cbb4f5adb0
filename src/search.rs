//! Catalog search: the wire model, the HTTP client and the debounce primitive
//! used to coalesce keystrokes into a single request.

mod client;
mod debounce;
mod model;

pub use client::*;
pub use debounce::*;
pub use model::*;
