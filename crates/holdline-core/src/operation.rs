//! The long-running unit of work a request is kept alive for.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::{JoinError, JoinHandle};

use crate::error::BoxError;

/// Terminal state observed once an operation resolves.
#[derive(Debug)]
pub enum Settled {
    Succeeded,
    Faulted(BoxError),
    /// The task was cancelled before producing a result.
    Incomplete,
}

/// An in-flight operation running on its own tokio task.
///
/// The responder only observes it; dropping an `Operation` detaches the
/// task rather than cancelling it.
#[derive(Debug)]
pub struct Operation {
    handle: JoinHandle<Result<(), BoxError>>,
}

impl Operation {
    /// Spawn `work` onto the runtime and track it.
    pub fn spawn<F, E>(work: F) -> Self
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        let handle = tokio::spawn(async move { work.await.map_err(Into::into) });
        Self { handle }
    }

    /// Track a task the caller already spawned.
    pub fn from_handle(handle: JoinHandle<Result<(), BoxError>>) -> Self {
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the underlying task. A responder waiting on it finishes with
    /// [`Settled::Incomplete`].
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for Operation {
    type Output = Settled;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Settled> {
        Pin::new(&mut self.handle).poll(cx).map(settle)
    }
}

fn settle(joined: Result<Result<(), BoxError>, JoinError>) -> Settled {
    match joined {
        Ok(Ok(())) => Settled::Succeeded,
        Ok(Err(cause)) => Settled::Faulted(cause),
        Err(e) if e.is_cancelled() => Settled::Incomplete,
        Err(e) => Settled::Faulted(panic_cause(e)),
    }
}

fn panic_cause(e: JoinError) -> BoxError {
    let payload = match e.try_into_panic() {
        Ok(payload) => payload,
        Err(e) => return Box::new(e),
    };
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "operation panicked".to_string()
    };
    format!("operation panicked: {message}").into()
}
