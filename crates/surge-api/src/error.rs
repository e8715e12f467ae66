use thiserror::Error;

/// Top-level error type for the `surge-api` crate.
///
/// Every request fails with exactly one of the five request-time variants
/// (`Authentication`, `Connectivity`, `Server`, `BadRequest`, `Format`).
/// `InvalidUrl` and `Tls` can only come out of client construction.
/// `surge-core` maps these into its own `CoreError`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request-time ────────────────────────────────────────────────
    /// HTTP 401: the `X-Key` header was missing or rejected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The host could not be reached (DNS, refused, reset, timeout).
    #[error("Cannot reach {url}: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP 5xx.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// HTTP 4xx other than 401.
    #[error("Bad request (HTTP {status}): {message}")]
    BadRequest { status: u16, message: String },

    /// A response that is not a usable JSON answer, with the raw body for debugging.
    #[error("Invalid API response: {message}")]
    Format { message: String, body: String },

    // ── Construction ────────────────────────────────────────────────
    /// Base URL could not be built from host and port.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Server { status, .. } | Self::BadRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a 404, which Surge uses for unknown features and groups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BadRequest { status: 404, .. })
    }

    /// Returns `true` if the failure happened before an HTTP answer arrived.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Returns `true` if the request timed out (a subset of connectivity failures).
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Connectivity { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
