// McNotify - platform/mod.rs
//
// Platform abstraction layer: filesystem helpers, config and data
// directories, and the Discord REST client.
// Must NOT depend on: app internals other than the sink trait.

pub mod config;
pub mod discord;
pub mod fs;
