//! Streaming keep-alive responses.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use holdline_core::{ChannelSink, KeepAlive, Operation};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

/// Lines buffered between the responder task and the HTTP body.
const LINE_BUFFER: usize = 16;

/// Respond immediately with a `text/plain` body that heartbeats until
/// `operation` settles.
///
/// Status and headers are committed before the outcome is known: a fault
/// is logged and cuts the body off with a stream error rather than
/// changing the status code.
pub fn keepalive_response(operation: Operation, responder: KeepAlive) -> Response {
    let (mut sink, rx) = ChannelSink::new(LINE_BUFFER);

    tokio::spawn(async move {
        match responder.run(operation, &mut sink).await {
            Ok(()) => debug!("keep-alive stream finished"),
            Err(e) => error!(error = %e, "keep-alive stream terminated"),
        }
    });

    let body = Body::from_stream(ReceiverStream::new(rx));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}
