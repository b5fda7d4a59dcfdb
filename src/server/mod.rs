//! HTTP transport for the bus. Maps the EventBridge-style HTTP surface onto
//! an [`EventBridge`](crate::EventBridge).
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /subscriptions` (alias `/rules`) - `{ "status": 200, "body": [rule, …] }`.
//! - `POST /subscriptions` (alias `/rules`) - register a function's
//!   `eventBridge` events; returns one id (or `{ "error" }`) per event.
//! - `DELETE /subscriptions/:id` (alias `/rules/:id`) - always `{ "status": 200, "body": "OK" }`.
//! - `POST /` - `PutEvents`: `{ "Entries": [...] }` → delivery report.
//!   A missing `Entries` (or an empty body) is an empty batch.
//!
//! Bodies are parsed as JSON whatever their `Content-Type` (`application/json`,
//! `application/x-amz-json-1.1`, or none at all). Every response carries
//! permissive CORS headers.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use offline_eventbridge::{server, EventBridge};
//!
//! let bridge = Arc::new(EventBridge::new());
//!
//! // Get the router to compose with other axum routes
//! let app = server::router(bridge.clone());
//!
//! // Or serve directly
//! server::serve(bridge, "localhost:4002").await?;
//! ```

mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName};
use axum::routing::{any, delete, get};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::EventBridge;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Build an axum `Router` serving the bus.
pub fn router(bridge: Arc<EventBridge>) -> Router {
    Router::new()
        .route("/", any(routes::put_events))
        .route("/rules", get(routes::list_rules).post(routes::create_rules))
        .route("/rules/:id", delete(routes::delete_rule))
        .route(
            "/subscriptions",
            get(routes::list_rules).post(routes::create_rules),
        )
        .route("/subscriptions/:id", delete(routes::delete_rule))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors())
        .with_state(bridge)
}

/// Serve the bus over HTTP at the given address (e.g. `"localhost:4002"`).
pub async fn serve(bridge: Arc<EventBridge>, addr: &str) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(bridge)).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    bridge: Arc<EventBridge>,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(bridge))
        .with_graceful_shutdown(shutdown)
        .await
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
}
