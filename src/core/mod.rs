// McNotify - core/mod.rs
//
// Core business logic layer.
// Dependencies: util layer, regex, serde derive.
// Must NOT depend on: app, platform, or perform any I/O.

pub mod classifier;
pub mod debounce;
pub mod model;
pub mod template;
