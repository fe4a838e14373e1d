//! Unified error type.

use http::Method;
use thiserror::Error;

/// A boxed, thread-safe error raised by a handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by sento's fallible operations.
///
/// An unmatched route is *not* an error: [`App::handle`](crate::App::handle)
/// answers it with `404 Not Found`. Registration problems surface here at the
/// registration call site; handler failures surface from `handle` untouched.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed route pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("route `{method} {pattern}` conflicts with an existing route: {source}")]
    RouteConflict {
        method: Method,
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("invalid header: {0}")]
    InvalidHeader(#[from] http::Error),

    #[error("invalid socket address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPattern { pattern: pattern.to_owned(), reason: reason.into() }
    }

    /// Unwraps the error a handler raised, if this is a handler failure.
    pub fn into_handler_error(self) -> Option<BoxError> {
        match self {
            Self::Handler(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
