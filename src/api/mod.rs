//! Stockledger API Server module
//!
//! HTTP REST API for the inventory dashboard.
//! Run with `stockledger-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
