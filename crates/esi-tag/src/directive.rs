//! Located directive records.

use crate::attrs::DirectiveAttrs;

/// Literal byte sequence opening an ESI tag.
pub const OPEN_MARKER: &[u8] = b"<esi:";

/// Literal byte sequence closing an ESI tag.
pub const CLOSE_MARKER: &[u8] = b"/>";

/// Half-open byte-offset range `[start, end)` into the original document.
///
/// `start` is the index of the first byte of the opening marker; `end` is one
/// past the last byte of the closing marker, so
/// `document[span.start..span.end]` is the full on-the-wire occurrence of the
/// tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// Index of the first byte of the opening marker.
    pub start: usize,
    /// One past the last byte of the closing marker.
    pub end: usize,
}

impl Span {
    /// Number of bytes the tag occupies in the document.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True only for a span that covers no bytes; never produced by the
    /// scanner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// One discovered `include` tag: its exact source text and byte span.
///
/// `raw` holds the bytes between the opening and closing markers verbatim,
/// embedded NUL bytes and whitespace included. Directives are produced only
/// by [`parse`](crate::parse) and are read-only afterward; replacement
/// content is spliced by the caller using [`Span`] offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directive {
    raw: Vec<u8>,
    span: Span,
}

impl Directive {
    pub(crate) fn new(raw: Vec<u8>, span: Span) -> Self {
        Self { raw, span }
    }

    /// The tag's source text, markers excluded, byte-for-byte as it appeared
    /// in the document.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Byte offsets of the full tag occurrence in the original document.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Re-extract the tag's attributes from the raw text.
    ///
    /// The scanner has already validated the `src` scheme and the `timeout`
    /// format; everything else is interpreted by the resolver.
    #[must_use]
    pub fn attrs(&self) -> DirectiveAttrs<'_> {
        DirectiveAttrs::parse(&self.raw)
    }
}
