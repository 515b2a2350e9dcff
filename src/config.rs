//! Configuration loader and schema types.
//!
//! Settings cover the media origin, library discovery, startup playback
//! defaults, the output device cadence, key bindings and logging. Nothing in
//! here is required: every field has a default.

mod load;
mod schema;

pub use schema::*;
