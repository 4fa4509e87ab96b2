//! Single-pass byte scanner for `include` tags.
//!
//! The scanner walks the stream once, byte by byte, tracking a global offset
//! counter that is independent of internal read-buffer boundaries, so marker
//! literals split across two refills still match and offsets stay exact.
//! The input is treated as opaque binary: NUL bytes are plain data.

use std::io::{ErrorKind, Read};

use crate::attrs::DirectiveAttrs;
use crate::directive::{CLOSE_MARKER, Directive, OPEN_MARKER, Span};
use crate::error::ParseError;

/// Only the `include` directive name is recognized; any other name after the
/// opening marker is re-read as plain data.
const INCLUDE_NAME: &[u8] = b"include";

/// Read-buffer size for stream refills.
const SCRATCH_LEN: usize = 8 * 1024;

/// Scan a byte stream for `include` tags.
///
/// Returns the located directives in order of appearance, or `None` when the
/// stream contains no complete valid tag (an empty stream included); callers
/// treat "no collection" and "zero directives" identically. A validation
/// failure aborts the whole parse: the error is returned and all directives
/// found so far are dropped.
///
/// A tag whose closing marker never appears before the stream ends is
/// discarded silently; directives completed earlier are still returned.
pub fn parse<R: Read>(mut input: R) -> Result<Option<Vec<Directive>>, ParseError> {
    let mut scanner = Scanner::new();
    let mut scratch = [0_u8; SCRATCH_LEN];

    loop {
        let n = match input.read(&mut scratch) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &scratch[..n] {
            scanner.feed(byte)?;
            scanner.pos += 1;
        }
    }

    Ok(scanner.finish())
}

/// Scanner state: where we are relative to the current candidate tag.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Looking for the opening marker; `matched` bytes of it seen so far.
    Seeking { matched: usize },
    /// Opening marker done; matching the directive name.
    Name { matched: usize },
    /// Name done; capturing raw text while watching for the closing marker.
    Body,
}

struct Scanner {
    state: State,
    /// Global offset of the byte currently being examined.
    pos: usize,
    /// Offset of the opening marker of the candidate tag.
    tag_start: usize,
    /// Raw text accumulator for the tag being captured.
    raw: Vec<u8>,
    found: Vec<Directive>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::Seeking { matched: 0 },
            pos: 0,
            tag_start: 0,
            raw: Vec::new(),
            found: Vec::new(),
        }
    }

    fn feed(&mut self, byte: u8) -> Result<(), ParseError> {
        loop {
            match self.state {
                State::Seeking { matched } => {
                    if byte == OPEN_MARKER[matched] {
                        if matched == 0 {
                            self.tag_start = self.pos;
                        }
                        let matched = matched + 1;
                        self.state = if matched == OPEN_MARKER.len() {
                            State::Name { matched: 0 }
                        } else {
                            State::Seeking { matched }
                        };
                    } else if byte == OPEN_MARKER[0] {
                        // A failed partial match may itself open a tag.
                        self.tag_start = self.pos;
                        self.state = State::Seeking { matched: 1 };
                    } else if matched != 0 {
                        self.state = State::Seeking { matched: 0 };
                    }
                    return Ok(());
                }
                State::Name { matched } => {
                    if byte == INCLUDE_NAME[matched] {
                        let matched = matched + 1;
                        if matched == INCLUDE_NAME.len() {
                            self.raw.clear();
                            self.raw.extend_from_slice(INCLUDE_NAME);
                            self.state = State::Body;
                        } else {
                            self.state = State::Name { matched };
                        }
                        return Ok(());
                    }
                    // Not an include tag. Re-examine this byte as plain
                    // data; it may open the next candidate.
                    self.state = State::Seeking { matched: 0 };
                }
                State::Body => {
                    self.raw.push(byte);
                    if self.raw.ends_with(CLOSE_MARKER) {
                        self.raw.truncate(self.raw.len() - CLOSE_MARKER.len());
                        self.emit()?;
                    }
                    return Ok(());
                }
            }
        }
    }

    /// Validate the captured tag and append it to the result.
    fn emit(&mut self) -> Result<(), ParseError> {
        let raw = std::mem::take(&mut self.raw);
        DirectiveAttrs::parse(&raw).validate()?;

        let span = Span {
            start: self.tag_start,
            end: self.pos + 1,
        };
        tracing::debug!(start = span.start, end = span.end, "located include tag");
        self.found.push(Directive::new(raw, span));
        self.state = State::Seeking { matched: 0 };
        Ok(())
    }

    fn finish(self) -> Option<Vec<Directive>> {
        if matches!(self.state, State::Body) {
            tracing::debug!(
                start = self.tag_start,
                "dropping tag truncated by end of stream"
            );
        }
        if self.found.is_empty() {
            None
        } else {
            Some(self.found)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;

    /// Assert the reconstruction invariant: the span slice of the document
    /// is exactly the markers around the raw text.
    fn assert_reconstructs(document: &[u8], directive: &Directive) {
        let mut expected = OPEN_MARKER.to_vec();
        expected.extend_from_slice(directive.raw());
        expected.extend_from_slice(CLOSE_MARKER);
        assert_eq!(
            &document[directive.span().start..directive.span().end],
            &expected[..]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse(&b""[..]).unwrap().is_none());
    }

    #[test]
    fn test_no_opening_marker() {
        let page = b"<html><body><p>plain page</p></body></html>";
        assert!(parse(&page[..]).unwrap().is_none());
    }

    #[test]
    fn test_multiple_tags_exact_offsets() {
        let page = &b"abcdefg<esi:include src=\"url1\"/>u p<esi:include src=\"url2\" />k"[..];
        let found = parse(page).unwrap().unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].raw(), b"include src=\"url1\"");
        assert_eq!(found[0].span(), Span { start: 7, end: 32 });
        assert_eq!(found[1].raw(), b"include src=\"url2\" ");
        assert_eq!(found[1].span(), Span { start: 35, end: 61 });
        for directive in &found {
            assert_reconstructs(page, directive);
        }
    }

    #[test]
    fn test_document_order_and_whitespace_preserved() {
        let tags = [
            "include   src=\"https://micro1.service1/esi/foo\"\n  ",
            "include src=\"https://micro2.service2/esi/foo\"\n",
            "include\nsrc=\"https://micro3.service3/esi/foo\"",
            "include src=\"https://micro4.service4/esi/foo\" timeout=\"8ms\" onerror=\"foo.html\"",
        ];
        let mut page = String::new();
        let mut expected_spans = Vec::new();
        for raw in tags {
            page.push('@');
            let start = page.len();
            page.push_str("<esi:");
            page.push_str(raw);
            page.push_str("/>");
            expected_spans.push(Span {
                start,
                end: page.len(),
            });
        }
        page.push('@');

        let found = parse(page.as_bytes()).unwrap().unwrap();
        assert_eq!(found.len(), tags.len());
        for ((directive, raw), span) in found.iter().zip(tags).zip(expected_spans) {
            assert_eq!(directive.raw(), raw.as_bytes());
            assert_eq!(directive.span(), span);
            assert_reconstructs(page.as_bytes(), directive);
        }
    }

    #[test]
    fn test_nul_bytes_are_data() {
        let page = &b"x \x00 <i>x</i>          \x00<esi:include\x00 src=\"https://...\" />\x00"[..];
        let found = parse(page).unwrap().unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw(), b"include\x00 src=\"https://...\" ");
        assert_eq!(found[0].span(), Span { start: 23, end: 57 });
        assert_reconstructs(page, &found[0]);
    }

    #[test]
    fn test_unsupported_scheme_aborts() {
        let page = &b"x \x00 <i>x</i>          \x00<esi:include\x00 src=\"ftp://...\" />\x00"[..];
        match parse(page).unwrap_err() {
            ParseError::UnsupportedScheme { scheme } => assert_eq!(scheme, "ftp"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_timeout_aborts() {
        let page = &br#"<esi:include src="gopher1" timeout="10xyz" />"#[..];
        match parse(page).unwrap_err() {
            ParseError::InvalidTimeout { value } => assert_eq!(value, "10xyz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_abort_drops_earlier_directives() {
        let page = &br#"<esi:include src="https://ok"/><esi:include src="ftp://bad"/>"#[..];
        assert!(matches!(
            parse(page),
            Err(ParseError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_missing_close_marker() {
        let page = &br#"<esi:include src="..." <b>"#[..];
        assert!(parse(page).unwrap().is_none());
    }

    #[test]
    fn test_truncated_tag_keeps_earlier_directives() {
        let page = &br#"a<esi:include src="https://one"/>b<esi:include src="https://two""#[..];
        let found = parse(page).unwrap().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw(), br#"include src="https://one""#);
    }

    #[test]
    fn test_other_directive_names_are_data() {
        let page = &br#"<esi:vars name="x"/><esi:comment text="y"/>"#[..];
        assert!(parse(page).unwrap().is_none());
    }

    #[test]
    fn test_include_found_inside_rejected_name() {
        let page = &br#"<esi:vars <esi:include src="https://inner"/>"#[..];
        let found = parse(page).unwrap().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw(), br#"include src="https://inner""#);
        assert_reconstructs(page, &found[0]);
    }

    #[test]
    fn test_repeated_angle_bracket_restarts_match() {
        let page = &br#"<es<esi:include src="https://a"/>"#[..];
        let found = parse(page).unwrap().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span().start, 3);
        assert_reconstructs(page, &found[0]);
    }

    /// Reader that yields its data in fixed-size slivers, forcing marker
    /// literals to straddle refill boundaries.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(self.data.len()).min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_markers_split_across_refills() {
        let page = &b"abcdefg<esi:include src=\"url1\"/>u p<esi:include src=\"url2\" />k"[..];
        for step in 1..=7 {
            let found = parse(Trickle { data: page, step }).unwrap().unwrap();
            assert_eq!(found.len(), 2, "step {step}");
            assert_eq!(found[0].span(), Span { start: 7, end: 32 });
            assert_eq!(found[1].span(), Span { start: 35, end: 61 });
        }
    }

    /// Reader that raises `Interrupted` before every productive read.
    struct Interrupting<'a> {
        data: &'a [u8],
        interrupt_next: bool,
    }

    impl Read for Interrupting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.interrupt_next = true;
            let n = 1.min(self.data.len()).min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let page = &br#"<esi:include src="https://a"/>"#[..];
        let found = parse(Interrupting {
            data: page,
            interrupt_next: true,
        })
        .unwrap()
        .unwrap();
        assert_eq!(found.len(), 1);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "gone"))
        }
    }

    #[test]
    fn test_stream_failure_surfaces() {
        assert!(matches!(parse(FailingReader), Err(ParseError::Io(_))));
    }
}
