//! Gateway library for InProcess service calls
//!
//! This module exposes the HTTP surface as a library so the router can be
//! driven directly from tests and other binaries.

pub mod api_error;
pub mod bootstrap;
pub mod config;
pub mod extract;
pub mod handlers;
pub mod router;

pub use api_error::ApiError;
pub use bootstrap::{initialize_app_state, Storage};
pub use config::GatewayConfig;
pub use router::{build_router, AppState};
