//! Keep-alive responder — heartbeat loop around a pending operation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::config::KeepAliveConfig;
use crate::error::{KeepAliveError, KeepAliveResult};
use crate::operation::{Operation, Settled};
use crate::sink::LineSink;

pub const STARTED_LINE: &str = "Started";
pub const SUCCESS_LINE: &str = "Success";
pub const WORKING_SUFFIX: &str = " - Working...";

/// Streams heartbeat lines to a sink until an operation settles.
///
/// Cheap to clone; one responder can serve many requests.
#[derive(Clone)]
pub struct KeepAlive {
    interval: Duration,
    clock: Arc<dyn Clock>,
}

impl KeepAlive {
    pub fn new(config: KeepAliveConfig) -> Self {
        Self {
            interval: config.interval,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the timestamp source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the heartbeat loop until `operation` settles.
    ///
    /// Writes `Started`, then one `{timestamp} - Working...` line for every
    /// full interval the operation is still pending, then `Success`. A
    /// faulted or cancelled operation returns an error instead of the
    /// `Success` line. The sink is closed before returning in all cases.
    pub async fn run<S>(&self, operation: Operation, sink: &mut S) -> KeepAliveResult<()>
    where
        S: LineSink + ?Sized,
    {
        let result = self.stream(operation, sink).await;

        if let Err(ref e) = result {
            sink.abort(e).await;
        }
        if let Err(e) = sink.close().await {
            warn!(error = %e, "failed to close keep-alive stream");
        }

        result
    }

    async fn stream<S>(&self, mut operation: Operation, sink: &mut S) -> KeepAliveResult<()>
    where
        S: LineSink + ?Sized,
    {
        write_best_effort(sink, STARTED_LINE).await;
        sink.flush_detached();
        debug!(interval = ?self.interval, "keep-alive started");

        let mut heartbeats: u64 = 0;
        let settled = loop {
            tokio::select! {
                // An operation finishing exactly on an interval boundary
                // still gets that boundary's heartbeat.
                biased;
                _ = tokio::time::sleep(self.interval) => {
                    heartbeats += 1;
                    let line = format!("{}{WORKING_SUFFIX}", format_timestamp(self.clock.now()));
                    write_best_effort(sink, &line).await;
                    sink.flush_detached();
                    debug!(heartbeats, "keep-alive heartbeat");
                }
                settled = &mut operation => break settled,
            }
        };

        match settled {
            Settled::Incomplete => Err(KeepAliveError::OperationIncomplete),
            Settled::Faulted(cause) => Err(KeepAliveError::OperationFaulted(cause)),
            Settled::Succeeded => {
                write_best_effort(sink, SUCCESS_LINE).await;
                info!(heartbeats, "keep-alive operation succeeded");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for KeepAlive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAlive")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

async fn write_best_effort<S>(sink: &mut S, line: &str)
where
    S: LineSink + ?Sized,
{
    if let Err(e) = sink.write_line(line).await {
        warn!(error = %e, line, "keep-alive write failed");
    }
}
