//! The response sink contract and its optional capabilities.

use std::io::{self, Read, Write};

use http::{HeaderMap, StatusCode};

/// The base write/header contract of a real response sink.
///
/// A sink is whatever ultimately transmits a response to the client: a
/// server connection, a test recorder, or another proxy layer. Beyond the
/// base contract, a sink may expose optional capabilities through the
/// `as_*` accessor hooks; each defaults to `None` and is overridden by
/// sinks that support the capability. The hooks form a closed set; there
/// is no open-ended capability discovery.
pub trait ResponseSink {
    /// The sink's header store.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Record the response status line.
    fn set_status(&mut self, status: StatusCode);

    /// Transmit body bytes.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Client-disconnect observation, when supported.
    fn as_close_notify(&mut self) -> Option<&dyn CloseNotifySink> {
        None
    }

    /// Explicit flush of already-transmitted bytes, when supported.
    fn as_flush(&mut self) -> Option<&mut dyn FlushSink> {
        None
    }

    /// Raw connection takeover, when supported.
    fn as_hijack(&mut self) -> Option<&mut dyn HijackSink> {
        None
    }

    /// Bulk copy-from-source writing, when supported.
    fn as_copy_from(&mut self) -> Option<&mut dyn CopyFromSink> {
        None
    }

    /// Server push, when supported.
    fn as_push(&mut self) -> Option<&mut dyn PushSink> {
        None
    }
}

/// Observation of the client connection going away.
pub trait CloseNotifySink {
    /// True once the client has disconnected.
    fn client_gone(&self) -> bool;
}

/// Flushing of bytes the sink has already accepted for transmission.
pub trait FlushSink {
    /// Push buffered transmitted bytes toward the client.
    fn flush(&mut self);
}

/// A raw connection surrendered by a sink through [`HijackSink`].
pub trait Connection: Read + Write + Send {}

impl<T: Read + Write + Send> Connection for T {}

/// Takeover of the underlying client connection.
///
/// After a successful hijack the sink no longer manages the connection;
/// the caller owns it outright.
pub trait HijackSink {
    /// Surrender the client connection.
    fn hijack(&mut self) -> io::Result<Box<dyn Connection>>;
}

/// Bulk copying from a byte source into the sink.
pub trait CopyFromSink {
    /// Copy `src` to exhaustion, returning the number of bytes copied.
    fn copy_from(&mut self, src: &mut dyn Read) -> io::Result<u64>;
}

/// Server push of a related resource.
pub trait PushSink {
    /// Ask the sink to push `target` to the client.
    fn push(&mut self, target: &str) -> io::Result<()>;
}
