//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use surge_config::ConfigError;
use surge_core::{CoreError, ErrorKind, ResourceKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const API: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Surge: {message}")]
    #[diagnostic(
        code(surge::connection_failed),
        help(
            "Check that Surge is running with the HTTP API enabled\n\
             (http-api = key@0.0.0.0:6171 in the [General] section)."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(surge::timeout),
        help("Increase the timeout with --timeout or check that the host is reachable.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(surge::auth_failed),
        help(
            "Verify the key configured as http-api in Surge.\n\
             Run: surgectl config set-key --instance {instance}"
        )
    )]
    AuthFailed { instance: String },

    #[error("No API key configured for instance '{instance}'")]
    #[diagnostic(
        code(surge::no_credentials),
        help(
            "Store one with: surgectl config set-key --instance {instance}\n\
             Or set the SURGE_API_KEY environment variable."
        )
    )]
    NoCredentials { instance: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(surge::not_found),
        help("Run: surgectl {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Surge returned HTTP {status}: {message}")]
    #[diagnostic(code(surge::api_error))]
    ApiError { status: u16, message: String },

    #[error("{resource} is unavailable: {message}")]
    #[diagnostic(
        code(surge::unavailable),
        help("The last refresh failed. Run with -v for details.")
    )]
    Unavailable {
        resource: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("Unexpected response from Surge: {message}")]
    #[diagnostic(
        code(surge::invalid_response),
        help("Is the port pointing at the Surge HTTP API and not some other service?")
    )]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(surge::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Instance '{name}' not found in configuration")]
    #[diagnostic(
        code(surge::instance_not_found),
        help("Available instances: {available}")
    )]
    InstanceNotFound { name: String, available: String },

    #[error("No Surge instance configured")]
    #[diagnostic(
        code(surge::no_config),
        help(
            "Pass --host and --api-key, or add an instance to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(surge::config))]
    Config(ConfigError),

    #[error("Session stopped")]
    #[diagnostic(code(surge::stopped))]
    Stopped,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::InstanceNotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError { .. } | Self::InvalidResponse { .. } => exit_code::API,
            Self::Unavailable { kind, .. } => match kind {
                ErrorKind::Authentication => exit_code::AUTH,
                ErrorKind::Connectivity => exit_code::CONNECTION,
                ErrorKind::Validation => exit_code::USAGE,
                ErrorKind::Server | ErrorKind::BadRequest | ErrorKind::Format => exit_code::API,
            },
            Self::Validation { .. } | Self::NoConfig { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Stopped | Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub(crate) fn not_found(kind: ResourceKind, identifier: impl Into<String>) -> Self {
        let (resource_type, list_command) = match kind {
            ResourceKind::PolicyGroup => ("policy group", "group list"),
            ResourceKind::FeatureToggle => ("feature", "feature list"),
            ResourceKind::Profile => ("profile", "profile list"),
            ResourceKind::OutboundMode | ResourceKind::Traffic => ("resource", "status"),
        };
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Setup { source } => Self::from(*source),

            CoreError::Authentication { message: _ } => Self::AuthFailed {
                instance: "current".into(),
            },

            CoreError::Connectivity {
                message,
                timed_out: true,
            } => Self::Timeout { message },

            CoreError::Connectivity { message, .. } => Self::ConnectionFailed { message },

            CoreError::Server { status, message } | CoreError::BadRequest { status, message } => {
                Self::ApiError { status, message }
            }

            CoreError::Format { message } => Self::InvalidResponse { message },

            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::UnknownResource { id } => Self::not_found(id.kind, id.key),

            CoreError::Stopped => Self::Stopped,

            CoreError::Config { message } => Self::Validation {
                field: "connection".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { instance } => Self::NoCredentials { instance },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownInstance { instance } => Self::InstanceNotFound {
                name: instance,
                available: String::new(),
            },
            other => Self::Config(other),
        }
    }
}
