//! REST server for grid connect matches.
//!
//! Exposed as a library so integration tests can drive the router directly.

pub mod api;
pub mod config;
pub mod logging;
