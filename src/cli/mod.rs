//! CLI command handlers

pub mod commands;

pub use commands::{call, files, sheets, tools};
