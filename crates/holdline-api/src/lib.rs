//! holdline-api — HTTP surface for the keep-alive responder.
//!
//! [`keepalive_response`] turns any [`Operation`](holdline_core::Operation)
//! into a `200 text/plain` response whose body streams heartbeat lines
//! until the operation settles. Handlers that kick off slow work return it
//! directly instead of holding the connection silent.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/healthz` | Liveness probe |
//! | POST | `/api/v1/tasks/delay?seconds=N&fail=bool` | Run a timed task behind a keep-alive stream |

pub mod handlers;
pub mod stream;

use axum::Router;
use axum::routing::{get, post};
use holdline_core::KeepAlive;

pub use stream::keepalive_response;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub responder: KeepAlive,
}

/// Build the API router.
pub fn build_router(responder: KeepAlive) -> Router {
    let state = ApiState { responder };

    let api_routes = Router::new()
        .route("/tasks/delay", post(handlers::delay_task))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
}
