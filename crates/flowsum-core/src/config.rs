// ── Runtime connection configuration ──
//
// These types describe *how* to reach the controller and who to log in
// as. They never touch disk: the CLI reads profiles and hands these in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the controller.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Pre-issued `X-Auth-Token`.
    Token(SecretString),
    /// Interactive email/password login.
    Password { email: String, password: SecretString },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (lab controllers, intercepting proxies).
    DangerAcceptInvalid,
}

/// Connection settings for a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API base URL, e.g. `https://api.elcapitan.cloudgenix.com`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
