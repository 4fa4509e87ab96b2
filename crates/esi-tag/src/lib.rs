//! Locating ESI `include` tags in byte streams.
//!
//! This crate is the discovery half of an edge-side-includes middleware: it
//! scans a document stream for `<esi:include …/>` tags and reports each one
//! as a [`Directive`] carrying the tag's exact source text and its byte
//! [`Span`] in the document. Fetching the referenced content and splicing it
//! over the spans belongs to the caller.
//!
//! The scanner is a single forward pass over raw bytes. It never builds a
//! DOM, accepts arbitrary binary input (NUL bytes included), and keeps
//! offsets exact across internal read-buffer refills. Tags carrying a `src`
//! scheme outside http/https or a malformed `timeout` literal abort the
//! parse; everything else about a tag's meaning is left to the resolver,
//! which re-reads the attributes through [`DirectiveAttrs`].
//!
//! # Example
//!
//! ```
//! let page = &b"<html><esi:include src=\"https://micro.service/cart\" timeout=\"8ms\"/></html>"[..];
//!
//! let found = esi_tag::parse(page).unwrap().expect("page has one include tag");
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].span().start, 6);
//! assert_eq!(
//!     found[0].raw(),
//!     &b"include src=\"https://micro.service/cart\" timeout=\"8ms\""[..],
//! );
//! ```

mod attrs;
mod directive;
mod duration;
mod error;
mod scanner;

pub use attrs::DirectiveAttrs;
pub use directive::{CLOSE_MARKER, Directive, OPEN_MARKER, Span};
pub use error::ParseError;
pub use scanner::parse;
