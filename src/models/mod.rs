//! Data models for the roster service.
//!
//! Field names are camelCase on the wire to match the browser client.

mod character;
mod session;
mod snapshot;

pub use character::*;
pub use session::*;
pub use snapshot::*;
