//! Framework-free report model: grid cells, widget configs, the builder state manager,
//! persistence payloads, and local storage.

pub mod builder;
pub mod config;
pub mod context;
pub mod error;
pub mod format;
pub mod grid;
pub mod platform;
pub mod storage;
pub mod widgets;
