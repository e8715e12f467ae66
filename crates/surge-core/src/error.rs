// ── Core error types ──
//
// User-facing errors from surge-core. The `From<surge_api::Error>` impl
// translates transport-layer errors into the same taxonomy; `kind()`
// folds every variant onto the six kinds callers match on.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::model::ResourceId;

/// The six failure kinds callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing API key.
    Authentication,
    /// Host unreachable, refused, or timed out.
    Connectivity,
    /// Remote 5xx.
    Server,
    /// Remote 4xx other than 401.
    BadRequest,
    /// 2xx answer that is not the expected JSON.
    Format,
    /// Rejected locally before anything was sent.
    Validation,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Remote / transport ───────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Cannot reach Surge: {message}")]
    Connectivity { message: String, timed_out: bool },

    #[error("Surge server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Surge rejected the request (HTTP {status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Invalid response from Surge: {message}")]
    Format { message: String },

    // ── Local ────────────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Unknown resource: {id}")]
    UnknownResource { id: ResourceId },

    #[error("Coordinator has been stopped")]
    Stopped,

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Setup failed: {source}")]
    Setup {
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Fold this error onto the six-kind taxonomy.
    ///
    /// Local rejections (unknown resource, stopped coordinator, bad
    /// configuration) are validation failures; a setup failure has the
    /// kind of whatever made the probe fail.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::Server { .. } => ErrorKind::Server,
            Self::BadRequest { .. } => ErrorKind::BadRequest,
            Self::Format { .. } => ErrorKind::Format,
            Self::Validation { .. }
            | Self::UnknownResource { .. }
            | Self::Stopped
            | Self::Config { .. } => ErrorKind::Validation,
            Self::Setup { source } => source.kind(),
        }
    }

    /// Returns `true` for a remote 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BadRequest { status: 404, .. })
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn setup(source: CoreError) -> Self {
        Self::Setup {
            source: Box::new(source),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<surge_api::Error> for CoreError {
    fn from(err: surge_api::Error) -> Self {
        match err {
            surge_api::Error::Authentication { message } => Self::Authentication { message },
            surge_api::Error::Connectivity { ref source, .. } => Self::Connectivity {
                timed_out: source.is_timeout(),
                message: err.to_string(),
            },
            surge_api::Error::Server { status, message } => Self::Server { status, message },
            surge_api::Error::BadRequest { status, message } => {
                Self::BadRequest { status, message }
            }
            surge_api::Error::Format { message, body: _ } => Self::Format { message },
            surge_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            surge_api::Error::Tls(message) => Self::Config {
                message: format!("TLS error: {message}"),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ResourceKind;

    #[test]
    fn api_errors_keep_their_kind() {
        let cases = [
            (
                surge_api::Error::Authentication {
                    message: "x".into(),
                },
                ErrorKind::Authentication,
            ),
            (
                surge_api::Error::Server {
                    status: 503,
                    message: "x".into(),
                },
                ErrorKind::Server,
            ),
            (
                surge_api::Error::BadRequest {
                    status: 404,
                    message: "x".into(),
                },
                ErrorKind::BadRequest,
            ),
            (
                surge_api::Error::Format {
                    message: "x".into(),
                    body: String::new(),
                },
                ErrorKind::Format,
            ),
        ];
        for (api, kind) in cases {
            assert_eq!(CoreError::from(api).kind(), kind);
        }
    }

    #[test]
    fn local_rejections_are_validation() {
        let unknown = CoreError::UnknownResource {
            id: ResourceId::new(ResourceKind::PolicyGroup, "Proxy"),
        };
        assert_eq!(unknown.kind(), ErrorKind::Validation);
        assert_eq!(CoreError::Stopped.kind(), ErrorKind::Validation);
    }

    #[test]
    fn setup_reports_cause_kind() {
        let err = CoreError::setup(CoreError::Authentication {
            message: "bad key".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("bad key"));
    }

    #[test]
    fn kind_round_trips_through_strum() {
        assert_eq!(ErrorKind::BadRequest.to_string(), "bad_request");
        assert_eq!(
            "connectivity".parse::<ErrorKind>().unwrap(),
            ErrorKind::Connectivity
        );
    }
}
