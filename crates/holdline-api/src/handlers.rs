//! HTTP handlers.

use std::io;
use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use holdline_core::Operation;
use serde::Deserialize;
use tracing::info;

use crate::ApiState;
use crate::stream::keepalive_response;

/// Longest delay a caller may request.
pub const MAX_DELAY_SECS: u64 = 3600;

fn error_response(msg: &str, status: StatusCode) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": msg,
        })),
    )
        .into_response()
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Query parameters for the delay task.
#[derive(Debug, Deserialize)]
pub struct DelayParams {
    pub seconds: u64,
    #[serde(default)]
    pub fail: bool,
}

/// POST /api/v1/tasks/delay
///
/// Sleeps for `seconds`, then succeeds (or fails when `fail=true`), while
/// the response streams keep-alive lines.
pub async fn delay_task(
    State(state): State<ApiState>,
    Query(params): Query<DelayParams>,
) -> Response {
    if params.seconds > MAX_DELAY_SECS {
        return error_response(
            &format!("seconds {} exceeds max {MAX_DELAY_SECS}", params.seconds),
            StatusCode::BAD_REQUEST,
        );
    }

    info!(seconds = params.seconds, fail = params.fail, "delay task accepted");

    let DelayParams { seconds, fail } = params;
    let operation = Operation::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        if fail {
            Err(io::Error::other("delay task failed on request"))
        } else {
            Ok(())
        }
    });

    keepalive_response(operation, state.responder.clone())
}

#[cfg(test)]
mod tests {
    use holdline_core::{KeepAlive, KeepAliveConfig};
    use http_body_util::BodyExt;

    use super::*;

    fn test_state() -> ApiState {
        ApiState {
            responder: KeepAlive::new(KeepAliveConfig::default()),
        }
    }

    #[tokio::test]
    async fn healthz_ok() {
        let resp = healthz().await.into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn delay_rejects_excessive_seconds() {
        let params = DelayParams {
            seconds: MAX_DELAY_SECS + 1,
            fail: false,
        };
        let resp = delay_task(State(test_state()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_delay_streams_started_and_success() {
        let params = DelayParams {
            seconds: 0,
            fail: false,
        };
        let resp = delay_task(State(test_state()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Started\nSuccess\n");
    }

    #[tokio::test]
    async fn requested_failure_breaks_the_stream() {
        let params = DelayParams {
            seconds: 0,
            fail: true,
        };
        let resp = delay_task(State(test_state()), Query(params)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.into_body().collect().await.is_err());
    }
}
