//! Excel API server module
//!
//! HTTP REST front end over the tool dispatcher.
//! Run with `excel-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
