//! CLI library components for the trial results viewer.

pub mod commands;
pub mod logging;
pub mod summary;
