// ── Core error types ──
//
// User-facing errors from flowsum-core. Consumers never see HTTP status
// codes or JSON parse failures directly: API errors are translated per
// call site, because the same transport failure means "directory
// unavailable" during resolution and "query failed" during the fetch.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors (raised before any network activity) ────────────
    #[error("Invalid period '{input}': expected a number with optional m/d/s/h suffix")]
    InvalidPeriod { input: String },

    #[error("Invalid time window: {reason}")]
    InvalidWindow { reason: String },

    #[error("Invalid source prefix '{input}': {reason}")]
    InvalidPrefix { input: String, reason: String },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not authenticated: {message}")]
    AuthRequired { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    // ── Collaborator errors (raised with a live session) ─────────────
    #[error("Directory unavailable while listing {resource}: {message}")]
    DirectoryUnavailable { resource: String, message: String },

    #[error("Flow query failed: {message}")]
    QueryFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("No {entity_type}s available to match against")]
    NoCandidates { entity_type: String },

    #[error("Flow #{index} has no usable priority_class ({found})")]
    MissingPriorityClass { index: usize, found: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Translate an API error raised while listing a directory resource.
    pub(crate) fn directory(resource: &str, err: flowsum_api::Error) -> Self {
        Self::from_api(err, |message| CoreError::DirectoryUnavailable {
            resource: resource.into(),
            message,
        })
    }

    /// Translate an API error raised by the flow query.
    pub(crate) fn query(err: flowsum_api::Error) -> Self {
        Self::from_api(err, |message| CoreError::QueryFailed { message })
    }

    /// Shared mapping: auth, timeout and connect failures keep their own
    /// variants; everything else becomes the call-site variant.
    fn from_api(err: flowsum_api::Error, fallback: impl FnOnce(String) -> Self) -> Self {
        if err.is_auth() {
            return CoreError::AuthRequired {
                message: err.to_string(),
            };
        }
        if err.is_timeout() {
            return CoreError::Timeout {
                message: err.to_string(),
            };
        }
        if let flowsum_api::Error::Transport(ref e) = err {
            if e.is_connect() {
                return CoreError::ConnectionFailed {
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                    reason: err.to_string(),
                };
            }
        }
        fallback(err.to_string())
    }
}

// ── Conversion used during session setup ─────────────────────────────

impl From<flowsum_api::Error> for CoreError {
    fn from(err: flowsum_api::Error) -> Self {
        match err {
            flowsum_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            flowsum_api::Error::NotAuthenticated => CoreError::AuthRequired {
                message: "no session established".into(),
            },
            flowsum_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            flowsum_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            other => Self::from_api(other, |message| CoreError::AuthenticationFailed {
                message,
            }),
        }
    }
}
