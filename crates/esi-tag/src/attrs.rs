//! Attribute extraction from raw tag text.
//!
//! A directive stores only its exact source text; the semantic attributes
//! stay embedded in it. This module is the shared re-parser: the scanner
//! uses it to validate the `src` scheme and the `timeout` format at discovery
//! time, and the resolver uses it again to interpret the tag.

use std::time::Duration;

use crate::duration;
use crate::error::ParseError;

/// URL schemes the `src` attribute may carry.
const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Attribute values extracted from one tag's raw text.
///
/// Values borrow from the raw text and are plain bytes: attribute values are
/// not normalized and may legally contain NUL or other non-text bytes.
/// Attribute names are matched ASCII-case-insensitively; only double-quoted
/// values are recognized and an unterminated value ends extraction.
///
/// # Example
///
/// ```
/// use esi_tag::DirectiveAttrs;
///
/// let raw = br#"include src="https://micro.service/cart" timeout="8ms" onerror="nocart.html""#;
/// let attrs = DirectiveAttrs::parse(raw);
/// assert_eq!(attrs.src(), Some(&b"https://micro.service/cart"[..]));
/// assert_eq!(attrs.onerror(), Some(&b"nocart.html"[..]));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveAttrs<'a> {
    src: Option<&'a [u8]>,
    timeout: Option<&'a [u8]>,
    onerror: Option<&'a [u8]>,
    forward_headers: Option<&'a [u8]>,
}

impl<'a> DirectiveAttrs<'a> {
    /// Extract the known attributes from raw tag text.
    ///
    /// The first occurrence of each attribute wins.
    #[must_use]
    pub fn parse(raw: &'a [u8]) -> Self {
        let mut attrs = Self::default();

        let mut i = 0;
        while i < raw.len() {
            if !raw[i].is_ascii_alphabetic() {
                i += 1;
                continue;
            }

            let name_start = i;
            while i < raw.len() && (raw[i].is_ascii_alphanumeric() || raw[i] == b'-' || raw[i] == b'_')
            {
                i += 1;
            }
            let name = &raw[name_start..i];

            if i + 1 >= raw.len() || raw[i] != b'=' || raw[i + 1] != b'"' {
                continue;
            }
            i += 2;

            let Some(len) = raw[i..].iter().position(|&b| b == b'"') else {
                break;
            };
            let value = &raw[i..i + len];
            i += len + 1;

            attrs.record(name, value);
        }

        attrs
    }

    fn record(&mut self, name: &[u8], value: &'a [u8]) {
        let slot = if name.eq_ignore_ascii_case(b"src") {
            &mut self.src
        } else if name.eq_ignore_ascii_case(b"timeout") {
            &mut self.timeout
        } else if name.eq_ignore_ascii_case(b"onerror") {
            &mut self.onerror
        } else if name.eq_ignore_ascii_case(b"forwardheaders") {
            &mut self.forward_headers
        } else {
            return;
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// The source URL to resolve, byte-for-byte as written.
    #[must_use]
    pub fn src(&self) -> Option<&'a [u8]> {
        self.src
    }

    /// The error fallback path, byte-for-byte as written.
    #[must_use]
    pub fn onerror(&self) -> Option<&'a [u8]> {
        self.onerror
    }

    /// The resolve timeout, parsed from its duration literal.
    ///
    /// Returns `Ok(None)` when the attribute is absent.
    pub fn timeout(&self) -> Result<Option<Duration>, ParseError> {
        let Some(value) = self.timeout else {
            return Ok(None);
        };
        std::str::from_utf8(value)
            .ok()
            .and_then(duration::parse)
            .map(Some)
            .ok_or_else(|| ParseError::InvalidTimeout {
                value: String::from_utf8_lossy(value).into_owned(),
            })
    }

    /// Header names to forward to the backend, split on commas and trimmed.
    #[must_use]
    pub fn forward_headers(&self) -> Vec<String> {
        let Some(value) = self.forward_headers else {
            return Vec::new();
        };
        String::from_utf8_lossy(value)
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Validate the typed attributes the scanner must reject.
    pub(crate) fn validate(&self) -> Result<(), ParseError> {
        if let Some(src) = self.src {
            if let Some(scheme) = scheme_of(src) {
                if !ALLOWED_SCHEMES
                    .iter()
                    .any(|allowed| scheme.eq_ignore_ascii_case(allowed))
                {
                    return Err(ParseError::UnsupportedScheme {
                        scheme: scheme.to_owned(),
                    });
                }
            }
        }
        self.timeout()?;
        Ok(())
    }
}

/// Extract the URL scheme, if the value has one.
///
/// A scheme is a leading alphabetic byte followed by alphanumerics, `+`,
/// `-`, or `.`, terminated by a colon. A scheme-less value (a relative or
/// bare reference) yields `None`.
fn scheme_of(url: &[u8]) -> Option<&str> {
    let colon = url.iter().position(|&b| b == b':')?;
    let candidate = &url[..colon];
    if !candidate.first()?.is_ascii_alphabetic() {
        return None;
    }
    if !candidate
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
    {
        return None;
    }
    // All bytes are ASCII at this point.
    std::str::from_utf8(candidate).ok()
}
