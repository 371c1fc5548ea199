//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Layers (outermost → innermost):
//! 1. CORS (only when a site origin is configured) → 2. Cache-Control → 3. Access log

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    let allowed_origin = ctx.core.config.allowed_origin.clone();

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/sessions", post(endpoints::sessions::create))
        .route(
            "/sessions/:id",
            get(endpoints::sessions::detail).delete(endpoints::sessions::remove),
        )
        .route("/sessions/:id/open", post(endpoints::sessions::open))
        .route("/sessions/:id/close", post(endpoints::sessions::close))
        .route("/sessions/:id/toggle", post(endpoints::sessions::toggle))
        .route("/sessions/:id/messages", post(endpoints::sessions::send))
        .route("/sessions/:id/cancel", post(endpoints::sessions::cancel))
        .route("/prescreening", post(endpoints::prescreening::submit))
        .route("/prescreening/form", get(endpoints::prescreening::form))
        .route("/confirmation", post(endpoints::confirmation::send))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let router = Router::new().nest("/api", api);

    match allowed_origin.as_deref().and_then(cors_layer) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(value) => Some(
            CorsLayer::new()
                .allow_origin(value)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        ),
        Err(_) => {
            tracing::warn!(origin, "Ignoring invalid allowed origin");
            None
        }
    }
}
