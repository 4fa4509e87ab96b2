//! The buffered response proxy.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::sink::{
    CloseNotifySink, CopyFromSink, FlushSink, HijackSink, PushSink, ResponseSink,
};

/// The capability variant fixed for a proxy at construction.
///
/// Selection mirrors the sink's own capabilities: `Full` when the sink
/// supports close-notify, flush, hijack, and copy-from all at once,
/// `FlushOnly` when it supports flush, `Minimal` otherwise. The variant
/// never changes for the proxy's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// All four optional capabilities.
    Full,
    /// Only the flush capability.
    FlushOnly,
    /// The base write/header contract alone.
    Minimal,
}

/// A response proxy that buffers the body instead of transmitting it.
///
/// `write` always lands in the supplied buffer writer, never in the wrapped
/// sink, so the caller can rewrite the whole document before any byte
/// reaches the client. Once the final length is known, [`flush_header`]
/// corrects the Content-Length framing and releases headers and status to
/// the sink, exactly once. Releasing the buffered body afterward is the
/// caller's job; the buffer is handed back by [`into_parts`].
///
/// The buffer is unbounded by design: a very large response costs that much
/// memory until flush. Operators should treat that as a resource-exhaustion
/// risk, not expect the proxy to bound it.
///
/// [`flush_header`]: Self::flush_header
/// [`into_parts`]: Self::into_parts
pub struct BufferedResponse<W, S> {
    sink: S,
    buf: W,
    headers: HeaderMap,
    status: Option<StatusCode>,
    flushed: AtomicBool,
    variant: Variant,
}

/// Wrap a real sink, returning a proxy that buffers all body writes.
///
/// The sink's capability hooks are probed once, here, and the proxy's
/// [`Variant`] is fixed from the result.
pub fn wrap<W: Write, S: ResponseSink>(buf: W, mut sink: S) -> BufferedResponse<W, S> {
    let cn = sink.as_close_notify().is_some();
    let fl = sink.as_flush().is_some();
    let hj = sink.as_hijack().is_some();
    let cf = sink.as_copy_from().is_some();

    let variant = if cn && fl && hj && cf {
        Variant::Full
    } else if fl {
        Variant::FlushOnly
    } else {
        Variant::Minimal
    };

    BufferedResponse {
        sink,
        buf,
        headers: HeaderMap::new(),
        status: None,
        flushed: AtomicBool::new(false),
        variant,
    }
}

impl<W: Write, S: ResponseSink> BufferedResponse<W, S> {
    /// The capability variant selected at construction.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Correct the length framing and release headers to the real sink.
    ///
    /// Reads the accumulated `Content-Length` (missing or unparseable
    /// counts as zero), adds `delta`, writes the value back, copies every
    /// accumulated header into the sink, and records the status (200 when
    /// never set). Runs exactly once per proxy: any later call is a no-op
    /// regardless of its delta.
    pub fn flush_header(&mut self, delta: i64) {
        // Check and transition in one atomic step; overlapping callers
        // collapse to a single flush.
        if self
            .flushed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let current = self
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0);
        self.headers
            .insert(CONTENT_LENGTH, HeaderValue::from(current + delta));

        let sink_headers = self.sink.headers_mut();
        for name in self.headers.keys() {
            let mut values = self.headers.get_all(name).iter();
            if let Some(first) = values.next() {
                sink_headers.insert(name.clone(), first.clone());
                for value in values {
                    sink_headers.append(name.clone(), value.clone());
                }
            }
        }

        self.sink.set_status(self.status.unwrap_or(StatusCode::OK));
        tracing::debug!(delta, content_length = current + delta, "flushed header");
    }

    /// Hand back the buffer and the wrapped sink.
    ///
    /// The caller releases the buffered body to the sink once it is final.
    #[must_use]
    pub fn into_parts(self) -> (W, S) {
        (self.buf, self.sink)
    }
}

impl<W: Write, S: ResponseSink> ResponseSink for BufferedResponse<W, S> {
    /// The proxy's own header store; transferred to the sink on flush.
    /// Mutation after flush is accepted but no longer transmitted.
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First call wins; later calls are ignored, not an error.
    fn set_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Append to the pending buffer. Never forwarded to the sink.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.write(buf)
    }

    fn as_close_notify(&mut self) -> Option<&dyn CloseNotifySink> {
        if self.variant == Variant::Full {
            self.sink.as_close_notify()
        } else {
            None
        }
    }

    fn as_flush(&mut self) -> Option<&mut dyn FlushSink> {
        match self.variant {
            Variant::Full | Variant::FlushOnly => self.sink.as_flush(),
            Variant::Minimal => None,
        }
    }

    fn as_hijack(&mut self) -> Option<&mut dyn HijackSink> {
        if self.variant == Variant::Full {
            self.sink.as_hijack()
        } else {
            None
        }
    }

    fn as_copy_from(&mut self) -> Option<&mut dyn CopyFromSink> {
        if self.variant == Variant::Full {
            Some(self)
        } else {
            None
        }
    }

    fn as_push(&mut self) -> Option<&mut dyn PushSink> {
        if self.variant == Variant::Full {
            Some(self)
        } else {
            None
        }
    }
}

impl<W: Write, S: ResponseSink> CopyFromSink for BufferedResponse<W, S> {
    /// Bulk copies land in the pending buffer exactly as `write` does;
    /// nothing reaches the wire before the flush.
    fn copy_from(&mut self, src: &mut dyn Read) -> io::Result<u64> {
        io::copy(src, &mut self.buf)
    }
}

impl<W: Write, S: ResponseSink> PushSink for BufferedResponse<W, S> {
    /// Delegates when the sink supports push; otherwise reports success
    /// doing nothing, so the caller cannot distinguish absence from
    /// success.
    fn push(&mut self, target: &str) -> io::Result<()> {
        match self.sink.as_push() {
            Some(push) => push.push(target),
            None => Ok(()),
        }
    }
}
