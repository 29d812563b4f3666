//! holdline-core — keep-alive responder for long-running requests.
//!
//! Wraps a slow background [`Operation`] and writes heartbeat text to a
//! [`LineSink`] while it runs, so that load balancers and proxies do not
//! drop an idle-looking connection.
//!
//! # Output
//!
//! ```text
//! Started
//! 2026-10-19 12:00:30 UTC - Working...
//! 2026-10-19 12:01:00 UTC - Working...
//! Success
//! ```
//!
//! A faulted or cancelled operation ends the stream without a `Success`
//! line and surfaces a [`KeepAliveError`] to the caller. The sink is
//! closed on every path.
//!
//! # Architecture
//!
//! ```text
//! KeepAlive::run(operation, sink)
//!   ├── write "Started", flush in background
//!   ├── loop: select! { operation settled | interval elapsed → heartbeat }
//!   ├── finalize: Success | OperationFaulted | OperationIncomplete
//!   └── sink.close()
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod operation;
pub mod responder;
pub mod sink;

pub use clock::{Clock, SystemClock};
pub use config::{KeepAliveConfig, parse_duration};
pub use error::{BoxError, ConfigError, KeepAliveError, KeepAliveResult};
pub use operation::{Operation, Settled};
pub use responder::KeepAlive;
pub use sink::{ChannelSink, LineSink, WriterSink};
