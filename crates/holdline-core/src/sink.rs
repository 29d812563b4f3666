//! Output streams the responder writes heartbeat lines into.
//!
//! [`WriterSink`] adapts any tokio writer, such as a socket or a duplex
//! pipe. [`ChannelSink`] forwards each line as a `Bytes` record, which is
//! what a streaming HTTP body consumes.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::error::KeepAliveError;

/// A write-only, line-oriented output stream.
///
/// The responder owns the sink exclusively for one run and never writes
/// concurrently. `close` is called exactly once, on every exit path.
#[async_trait]
pub trait LineSink: Send {
    /// Append `line` followed by a newline.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Start a flush without waiting for it. Failures are discarded.
    fn flush_detached(&mut self);

    /// Called before `close` when the run ends in a fatal error, so a
    /// transport can cut the stream instead of ending it cleanly.
    async fn abort(&mut self, _reason: &KeepAliveError) {}

    async fn close(&mut self) -> io::Result<()>;
}

// ── Writer-backed sink ─────────────────────────────────────────

/// Line sink over a buffered tokio writer.
///
/// The writer sits behind an async mutex so a detached flush can run on
/// its own task while the responder keeps going.
pub struct WriterSink<W> {
    writer: Arc<Mutex<BufWriter<W>>>,
    closed: bool,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(BufWriter::new(writer))),
            closed: false,
        }
    }
}

#[async_trait]
impl<W> LineSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "sink closed"));
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await
    }

    fn flush_detached(&mut self) {
        if self.closed {
            return;
        }
        let writer = Arc::clone(&self.writer);
        tokio::spawn(async move {
            if let Err(e) = writer.lock().await.flush().await {
                debug!(error = %e, "background flush failed");
            }
        });
    }

    async fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut writer = self.writer.lock().await;
        writer.flush().await?;
        writer.shutdown().await
    }
}

// ── Channel-backed sink ────────────────────────────────────────

/// Item type carried from a [`ChannelSink`] to its consumer.
pub type LineChunk = io::Result<Bytes>;

/// How long a send may wait for buffer space before the line is dropped.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Line sink that forwards every line as its own `Bytes` chunk.
///
/// Dropping the sender on `close` ends the stream; `abort` pushes an error
/// item first so the consumer sees a broken stream rather than a clean end.
/// A consumer that stops reading stalls each send for at most the send
/// timeout.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<LineChunk>>,
    send_timeout: Duration,
}

impl ChannelSink {
    /// Create a sink and the receiving half, buffering up to `capacity` lines.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<LineChunk>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            tx: Some(tx),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        };
        (sink, rx)
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    async fn send(&self, chunk: LineChunk) -> io::Result<()> {
        let Some(tx) = &self.tx else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "sink closed"));
        };
        tx.send_timeout(chunk, self.send_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => {
                    io::Error::new(io::ErrorKind::TimedOut, "receiver not reading")
                }
                SendTimeoutError::Closed(_) => {
                    io::Error::new(io::ErrorKind::BrokenPipe, "receiver dropped")
                }
            })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.as_ref().is_none_or(|tx| tx.is_closed())
    }
}

#[async_trait]
impl LineSink for ChannelSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.send(Ok(Bytes::from(format!("{line}\n")))).await
    }

    fn flush_detached(&mut self) {
        // Each line is already its own chunk.
    }

    async fn abort(&mut self, reason: &KeepAliveError) {
        if let Err(e) = self.send(Err(io::Error::other(reason.to_string()))).await {
            debug!(error = %e, "could not deliver stream abort");
        }
    }

    async fn close(&mut self) -> io::Result<()> {
        self.tx.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn writer_sink_writes_lines_and_closes() {
        let (client, mut server) = tokio::io::duplex(1024);
        let mut sink = WriterSink::new(client);

        sink.write_line("Started").await.unwrap();
        sink.flush_detached();
        sink.write_line("Success").await.unwrap();
        sink.close().await.unwrap();

        let mut out = String::new();
        server.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "Started\nSuccess\n");
    }

    #[tokio::test]
    async fn writer_sink_rejects_writes_after_close() {
        let (client, _server) = tokio::io::duplex(64);
        let mut sink = WriterSink::new(client);
        sink.close().await.unwrap();

        let err = sink.write_line("late").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        // Second close is a no-op.
        sink.close().await.unwrap();
    }

    #[tokio::test]
    async fn channel_sink_forwards_chunks() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.write_line("Started").await.unwrap();
        sink.close().await.unwrap();
        assert!(sink.is_closed());

        let chunk = rx.recv().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"Started\n");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn channel_sink_abort_sends_error_item() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.abort(&KeepAliveError::OperationIncomplete).await;
        sink.close().await.unwrap();

        let err = rx.recv().await.unwrap().unwrap_err();
        assert_eq!(err.to_string(), "process did not complete");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn channel_sink_times_out_when_receiver_stalls() {
        let (sink, mut rx) = ChannelSink::new(1);
        let mut sink = sink.with_send_timeout(Duration::from_secs(5));
        sink.write_line("Started").await.unwrap();

        let start = tokio::time::Instant::now();
        let err = sink.write_line("Success").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(5));

        // Abort is bounded the same way.
        sink.abort(&KeepAliveError::OperationIncomplete).await;
        sink.close().await.unwrap();

        assert_eq!(&rx.recv().await.unwrap().unwrap()[..], b"Started\n");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn channel_sink_reports_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::new(1);
        drop(rx);
        let err = sink.write_line("Started").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
