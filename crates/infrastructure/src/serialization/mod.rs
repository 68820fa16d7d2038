//! Deterministic JSON serialization for files written by Relay.
//!
//! Output uses 2-space indentation and a trailing newline, in UTF-8
//! without BOM.

mod json;

pub use json::*;
