//! Buffered response writing for ESI middleware.
//!
//! Resolving `include` tags changes a document's length, so the middleware
//! cannot let the original response framing reach the client. This crate
//! provides the stand-in: [`wrap`] takes the real [`ResponseSink`] plus a
//! caller-supplied buffer writer and returns a [`BufferedResponse`] that
//! captures every body write, accumulates headers, and releases corrected
//! headers to the sink exactly once via
//! [`flush_header`](BufferedResponse::flush_header).
//!
//! # Capabilities
//!
//! Real sinks differ in what they support beyond writing: disconnect
//! observation, flushing transmitted bytes, connection takeover, bulk
//! copies, server push. [`ResponseSink`] models these as optional accessor
//! hooks, and the proxy preserves them through a fixed [`Variant`] chosen
//! at construction. A capability the sink lacks degrades to absence or, for
//! push, to silent success, never to a forced failure.
//!
//! # Example
//!
//! ```
//! use std::io;
//!
//! use esi_response::{ResponseSink, wrap};
//! use http::header::CONTENT_LENGTH;
//! use http::{HeaderMap, StatusCode};
//!
//! /// The real client connection, reduced to its essentials.
//! #[derive(Default)]
//! struct WireSink {
//!     headers: HeaderMap,
//!     status: Option<StatusCode>,
//!     wire: Vec<u8>,
//! }
//!
//! impl ResponseSink for WireSink {
//!     fn headers_mut(&mut self) -> &mut HeaderMap {
//!         &mut self.headers
//!     }
//!     fn set_status(&mut self, status: StatusCode) {
//!         self.status = Some(status);
//!     }
//!     fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
//!         self.wire.extend_from_slice(buf);
//!         Ok(buf.len())
//!     }
//! }
//!
//! let mut body = Vec::new();
//! let mut proxy = wrap(&mut body, WireSink::default());
//!
//! proxy.headers_mut().insert(CONTENT_LENGTH, "100".parse().unwrap());
//! proxy.write(b"rewritten document").unwrap();
//! // The resolved fragments added 42 bytes over the original body.
//! proxy.flush_header(42);
//!
//! let (_, sink) = proxy.into_parts();
//! assert_eq!(sink.headers.get(CONTENT_LENGTH).unwrap(), "142");
//! assert_eq!(sink.status, Some(StatusCode::OK));
//! assert!(sink.wire.is_empty()); // the body is still the caller's to release
//! ```

mod buffered;
mod sink;

pub use buffered::{BufferedResponse, Variant, wrap};
pub use sink::{
    CloseNotifySink, Connection, CopyFromSink, FlushSink, HijackSink, PushSink, ResponseSink,
};
