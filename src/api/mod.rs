//! HTTP API for the site's interactive widgets.
//!
//! Exposes the chat widget sessions, the pre-screening form description and
//! the confirmation-email endpoint as JSON routes under `/api/`.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{ApiServer, ApiServerSession};
pub use types::ApiContext;
