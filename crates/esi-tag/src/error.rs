//! Scanner error types.

use std::io;

/// Errors that abort a whole parse call.
///
/// An error is terminal: no partial directive collection is returned
/// alongside it. A tag whose closing marker never appears is not an error;
/// it is dropped silently.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The `src` attribute carries a URL scheme outside {http, https}.
    #[error("unsupported scheme {scheme:?} in src attribute")]
    UnsupportedScheme {
        /// The offending scheme as it appeared in the document.
        scheme: String,
    },

    /// The `timeout` attribute is not a valid duration literal.
    #[error("invalid timeout duration {value:?}")]
    InvalidTimeout {
        /// The offending attribute value, lossily decoded for display.
        value: String,
    },

    /// The input stream failed mid-parse.
    #[error(transparent)]
    Io(#[from] io::Error),
}
