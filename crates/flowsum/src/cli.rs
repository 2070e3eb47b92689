//! Clap derive structures for the `flowsum` CLI.
//!
//! Only depends on clap so `build.rs` can include it to render the man page.

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// flowsum -- flow statistics for an SD-WAN site
#[derive(Debug, Parser)]
#[command(
    name = "flowsum",
    version,
    about = "Summarize SD-WAN flow statistics for a site",
    long_about = "Queries the SD-WAN controller for the flows seen at a site over a time \
        window and prints averaged byte, reset, retransmit and out-of-order counters \
        plus a priority-class breakdown.\n\n\
        Site and application names are matched fuzzily: the closest name wins.\n\n\
        Authentication tries --token, --authtokenfile, X_AUTH_TOKEN, AUTH_TOKEN, \
        then an interactive email/password login."
)]
pub struct Cli {
    /// Auth token (X-Auth-Token)
    #[arg(long, short = 't')]
    pub token: Option<String>,

    /// File containing an auth token
    #[arg(long = "authtokenfile", short = 'f', value_name = "PATH")]
    pub auth_token_file: Option<PathBuf>,

    /// Site name to search for (closest match wins)
    #[arg(long = "site-name", short = 's', value_name = "NAME")]
    pub site_name: String,

    /// Time period: a number with optional suffix m, d, s or h (hours if none)
    #[arg(long, short = 'p', default_value = "1", allow_hyphen_values = true)]
    pub period: String,

    /// Only count flows from this IPv4 source network
    #[arg(
        long = "src-ip-prefix",
        short = 'i',
        value_name = "CIDR",
        default_value = "0.0.0.0/0"
    )]
    pub src_ip_prefix: String,

    /// Application name to filter on, or "all"
    #[arg(long, short = 'a', default_value = "all")]
    pub app: String,

    /// Start the window this many days ago (0 = now)
    #[arg(long, short = 'd', default_value_t = 0)]
    pub days: u32,

    #[command(flatten)]
    pub global: GlobalOpts,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, env = "FLOWSUM_PROFILE")]
    pub profile: Option<String>,

    /// Controller API URL (overrides profile)
    #[arg(long, short = 'c', env = "FLOWSUM_CONTROLLER")]
    pub controller: Option<String>,

    /// Report format [default: text]
    #[arg(long, short = 'o')]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the report and all non-error output
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k')]
    pub insecure: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}
