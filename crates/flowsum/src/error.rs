//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use flowsum_config::ConfigError;
use flowsum_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid period '{input}'")]
    #[diagnostic(
        code(flowsum::invalid_period),
        help(
            "Use a number with an optional unit suffix:\n  \
             -p 1     1 hour (hours are implicit)\n  \
             -p 1.5   an hour and a half\n  \
             -p 30s   30 seconds\n  \
             -p 15m   15 minutes\n  \
             -p 2d    2 days"
        )
    )]
    InvalidPeriod { input: String },

    #[error("Invalid source IP prefix '{input}': {reason}")]
    #[diagnostic(
        code(flowsum::invalid_prefix),
        help("Must take the form of 1.1.1.0/24 or 2.2.2.2/32")
    )]
    InvalidPrefix { input: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(flowsum::validation))]
    Validation { field: String, reason: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(flowsum::connection_failed),
        help(
            "Check the controller URL and your network.\n\
             Override it with --controller, or use --insecure (-k) for lab controllers \
             with self-signed certificates.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(flowsum::timeout),
        help("Increase timeout with --timeout or narrow the query with a shorter --period.")
    )]
    Timeout { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(flowsum::auth_failed),
        help(
            "Check the token passed via --token, --authtokenfile, X_AUTH_TOKEN or AUTH_TOKEN,\n\
             or unset them all to log in interactively."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials available")]
    #[diagnostic(
        code(flowsum::no_credentials),
        help(
            "Pass --token or --authtokenfile, set X_AUTH_TOKEN, or run from an \
             interactive terminal to log in with email and password."
        )
    )]
    NoCredentials,

    // ── Resources ────────────────────────────────────────────────────
    #[error("No {resource_type}s found to match against")]
    #[diagnostic(
        code(flowsum::not_found),
        help("The tenant has no {resource_type}s visible to this account.")
    )]
    NotFound { resource_type: String },

    #[error("Could not list {resource}s: {message}")]
    #[diagnostic(code(flowsum::directory_unavailable))]
    DirectoryUnavailable { resource: String, message: String },

    #[error("Flow query failed: {message}")]
    #[diagnostic(code(flowsum::query_failed))]
    QueryFailed { message: String },

    #[error("Unexpected flow data: {message}")]
    #[diagnostic(
        code(flowsum::flow_data),
        help("The controller returned a flow without a priority class; rerun with -vv to see the request.")
    )]
    FlowData { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(flowsum::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(flowsum::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    #[diagnostic(code(flowsum::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidPeriod { .. }
            | Self::InvalidPrefix { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::AuthFailed { .. } | Self::NoCredentials => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::DirectoryUnavailable { .. }
            | Self::QueryFailed { .. }
            | Self::FlowData { .. }
            | Self::Io(_)
            | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPeriod { input } => CliError::InvalidPeriod { input },

            CoreError::InvalidPrefix { input, reason } => CliError::InvalidPrefix { input, reason },

            CoreError::InvalidWindow { reason } => CliError::Validation {
                field: "days".into(),
                reason,
            },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::AuthenticationFailed { message } | CoreError::AuthRequired { message } => {
                CliError::AuthFailed { message }
            }

            CoreError::Timeout { message } => CliError::Timeout { message },

            CoreError::DirectoryUnavailable { resource, message } => {
                CliError::DirectoryUnavailable { resource, message }
            }

            CoreError::QueryFailed { message } => CliError::QueryFailed { message },

            CoreError::NoCandidates { entity_type } => CliError::NotFound {
                resource_type: entity_type,
            },

            err @ CoreError::MissingPriorityClass { .. } => CliError::FlowData {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },

            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
                path: flowsum_config::config_path().display().to_string(),
            },

            err @ ConfigError::TokenFile { .. } => CliError::Validation {
                field: "authtokenfile".into(),
                reason: err.to_string(),
            },

            ConfigError::Figment(err) => CliError::Config(err),
        }
    }
}
