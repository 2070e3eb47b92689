//! Configuration for the flowsum CLI.
//!
//! TOML profiles, the token credential chain, and translation to
//! `flowsum_core::ControllerConfig`. Core never reads files; the binary
//! loads a [`Config`] here and hands core a pre-built connection config.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use flowsum_core::{ControllerConfig, TlsVerification};

/// Public SD-WAN controller endpoint used when no profile names one.
pub const DEFAULT_CONTROLLER: &str = "https://api.elcapitan.cloudgenix.com";

/// Environment variables consulted for a token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["X_AUTH_TOKEN", "AUTH_TOKEN"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to read token file {}: {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Match scores below this are reported as low confidence.
    #[serde(default = "default_match_warn_below")]
    pub match_warn_below: u8,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            match_warn_below: default_match_warn_below(),
        }
    }
}

fn default_output() -> String {
    "text".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_match_warn_below() -> u8 {
    60
}

/// A named controller profile. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL.
    pub controller: Option<String>,

    /// Pre-filled email for interactive login.
    pub email: Option<String>,

    /// File holding an auth token.
    pub token_file: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

impl Config {
    /// Look up the active profile.
    ///
    /// An explicitly requested profile must exist. When falling back to
    /// `default_profile`, a missing entry yields an empty profile so a bare
    /// install works without any config file.
    pub fn profile(&self, requested: Option<&str>) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .map(|p| (name.to_string(), p.clone()))
                .ok_or_else(|| {
                    let mut available: Vec<String> = self.profiles.keys().cloned().collect();
                    available.sort();
                    ConfigError::ProfileNotFound {
                        name: name.into(),
                        available,
                    }
                });
        }

        let name = self
            .default_profile
            .clone()
            .unwrap_or_else(|| "default".into());
        let profile = self.profiles.get(&name).cloned().unwrap_or_default();
        Ok((name, profile))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "flowsum", "flowsum").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("flowsum");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `FLOWSUM_` env vars.
///
/// Nested keys use a double underscore:
/// `FLOWSUM_DEFAULTS__MATCH_WARN_BELOW=40`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLOWSUM_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Connection settings ─────────────────────────────────────────────

/// Command-line values that win over profile and defaults.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub controller: Option<String>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

/// Build a `ControllerConfig`: CLI flag, then profile, then defaults.
pub fn controller_config(
    defaults: &Defaults,
    profile: &Profile,
    overrides: &ConnectionOverrides,
) -> Result<ControllerConfig, ConfigError> {
    let raw = overrides
        .controller
        .as_deref()
        .or(profile.controller.as_deref())
        .unwrap_or(DEFAULT_CONTROLLER);

    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "controller".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "controller".into(),
            reason: format!("expected an http(s) URL, got {raw}"),
        });
    }

    let insecure = overrides.insecure || profile.insecure.unwrap_or(defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = overrides
        .timeout
        .or(profile.timeout)
        .unwrap_or(defaults.timeout);

    Ok(ControllerConfig::new(url)
        .with_tls(tls)
        .with_timeout(Duration::from_secs(timeout)))
}

// ── Token resolution ────────────────────────────────────────────────

/// Where a token came from. Shown to the user, never the token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    File(PathBuf),
    Env(&'static str),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("token from --token"),
            Self::File(path) => write!(f, "token from file {}", path.display()),
            Self::Env(var) => write!(f, "token from environment variable {var}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedToken {
    pub token: SecretString,
    pub source: TokenSource,
}

/// Walk the token chain: flag, file, `X_AUTH_TOKEN`, `AUTH_TOKEN`.
///
/// `Ok(None)` means no token is configured and the caller should fall
/// back to interactive login. Blank values count as unset; an unreadable
/// or blank token file is an error.
pub fn resolve_token_with(
    flag: Option<&str>,
    file: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<ResolvedToken>, ConfigError> {
    if let Some(token) = flag.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some(ResolvedToken {
            token: SecretString::from(token.to_string()),
            source: TokenSource::Flag,
        }));
    }

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::TokenFile {
            path: path.to_path_buf(),
            source,
        })?;
        let token = contents.trim();
        if token.is_empty() {
            return Err(ConfigError::Validation {
                field: "token file".into(),
                reason: format!("{} is empty", path.display()),
            });
        }
        return Ok(Some(ResolvedToken {
            token: SecretString::from(token.to_string()),
            source: TokenSource::File(path.to_path_buf()),
        }));
    }

    for var in TOKEN_ENV_VARS {
        if let Some(token) = lookup(var).filter(|t| !t.trim().is_empty()) {
            return Ok(Some(ResolvedToken {
                token: SecretString::from(token.trim().to_string()),
                source: TokenSource::Env(var),
            }));
        }
    }

    Ok(None)
}

/// [`resolve_token_with`] against the process environment.
pub fn resolve_token(
    flag: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<ResolvedToken>, ConfigError> {
    resolve_token_with(flag, file, |var| std::env::var(var).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |var| {
            pairs
                .iter()
                .find(|(k, _)| *k == var)
                .map(|(_, v)| (*v).to_string())
        }
    }

    fn resolve(
        flag: Option<&str>,
        file: Option<&Path>,
        vars: &'static [(&'static str, &'static str)],
    ) -> Option<(String, TokenSource)> {
        resolve_token_with(flag, file, env(vars))
            .unwrap()
            .map(|r| (r.token.expose_secret().to_string(), r.source))
    }

    // ── Token chain ─────────────────────────────────────────────────

    #[test]
    fn flag_beats_everything() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "from-file").unwrap();

        let got = resolve(Some("from-flag"), Some(&file), &[("X_AUTH_TOKEN", "from-env")]);
        assert_eq!(got, Some(("from-flag".into(), TokenSource::Flag)));
    }

    #[test]
    fn file_is_trimmed_and_beats_env() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "  from-file\n").unwrap();

        let got = resolve(None, Some(&file), &[("X_AUTH_TOKEN", "from-env")]);
        assert_eq!(got, Some(("from-file".into(), TokenSource::File(file))));
    }

    #[test]
    fn x_auth_token_beats_auth_token() {
        let got = resolve(None, None, &[("AUTH_TOKEN", "b"), ("X_AUTH_TOKEN", "a")]);
        assert_eq!(got, Some(("a".into(), TokenSource::Env("X_AUTH_TOKEN"))));

        let got = resolve(None, None, &[("AUTH_TOKEN", "b")]);
        assert_eq!(got, Some(("b".into(), TokenSource::Env("AUTH_TOKEN"))));
    }

    #[test]
    fn blank_values_fall_through_to_interactive() {
        let got = resolve(Some("  "), None, &[("X_AUTH_TOKEN", ""), ("AUTH_TOKEN", " ")]);
        assert_eq!(got, None);
    }

    #[test]
    fn missing_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_token_with(None, Some(&dir.path().join("nope")), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::TokenFile { .. }));
    }

    #[test]
    fn empty_token_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("token");
        std::fs::write(&file, "\n").unwrap();
        let err = resolve_token_with(None, Some(&file), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    // ── Profiles ────────────────────────────────────────────────────

    #[test]
    fn file_values_override_defaults() {
        let mut cfg = Config::default();
        cfg.defaults.match_warn_below = 40;
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                controller: Some("https://lab.example.com".into()),
                email: Some("ops@example.com".into()),
                ..Profile::default()
            },
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml::to_string_pretty(&cfg).unwrap()).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.match_warn_below, 40);
        assert_eq!(loaded.defaults.timeout, 30);
        assert_eq!(
            loaded.profiles["lab"].email.as_deref(),
            Some("ops@example.com")
        );
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.defaults, Defaults::default());
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let mut cfg = Config::default();
        cfg.profiles.insert("prod".into(), Profile::default());
        cfg.profiles.insert("lab".into(), Profile::default());

        match cfg.profile(Some("staging")).unwrap_err() {
            ConfigError::ProfileNotFound { name, available } => {
                assert_eq!(name, "staging");
                assert_eq!(available, vec!["lab".to_string(), "prod".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_default_profile_is_empty() {
        let (name, profile) = Config::default().profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile, Profile::default());
    }

    // ── Controller config ───────────────────────────────────────────

    #[test]
    fn controller_defaults_to_public_endpoint() {
        let cc = controller_config(
            &Defaults::default(),
            &Profile::default(),
            &ConnectionOverrides::default(),
        )
        .unwrap();
        assert_eq!(cc.url.as_str(), "https://api.elcapitan.cloudgenix.com/");
        assert_eq!(cc.tls, TlsVerification::SystemDefaults);
        assert_eq!(cc.timeout, Duration::from_secs(30));
    }

    #[test]
    fn flags_beat_profile_beat_defaults() {
        let profile = Profile {
            controller: Some("https://profile.example.com".into()),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            timeout: Some(10),
            ..Profile::default()
        };

        let cc = controller_config(&Defaults::default(), &profile, &ConnectionOverrides::default())
            .unwrap();
        assert_eq!(cc.url.host_str(), Some("profile.example.com"));
        assert_eq!(cc.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem")));
        assert_eq!(cc.timeout, Duration::from_secs(10));

        let overrides = ConnectionOverrides {
            controller: Some("https://flag.example.com".into()),
            insecure: true,
            timeout: Some(5),
        };
        let cc = controller_config(&Defaults::default(), &profile, &overrides).unwrap();
        assert_eq!(cc.url.host_str(), Some("flag.example.com"));
        assert_eq!(cc.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cc.timeout, Duration::from_secs(5));
    }

    #[test]
    fn non_http_controller_is_rejected() {
        let overrides = ConnectionOverrides {
            controller: Some("ftp://example.com".into()),
            ..ConnectionOverrides::default()
        };
        let err = controller_config(&Defaults::default(), &Profile::default(), &overrides)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "controller"));
    }
}
