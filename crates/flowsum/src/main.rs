mod auth;
mod cli;
mod error;
mod output;

use clap::{Parser, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use flowsum_config::{ConnectionOverrides, Defaults};
use flowsum_core::{Controller, Entity, Match, Period, SourcePrefix, SummaryRequest, TimeWindow};

use crate::cli::{Cli, ColorMode, OutputFormat};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Run and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Validate input before any network activity
    let period = Period::parse(&cli.period)?;
    let prefix: SourcePrefix = cli.src_ip_prefix.parse()?;
    let window = TimeWindow::anchored(chrono::Utc::now(), cli.days, &period)?;

    let request = SummaryRequest::new(cli.site_name.as_str(), period, window)
        .with_app(&cli.app)
        .with_source_prefix(prefix);
    debug!(?request, "summary request");

    let cfg = flowsum_config::load_config()?;
    let (profile_name, profile) = cfg.profile(cli.global.profile.as_deref())?;
    debug!(profile = %profile_name, "using profile");

    let format = resolve_format(cli.global.output, &cfg.defaults)?;
    let color = output::should_color(resolve_color(cli.global.color, &cfg.defaults)?);

    let overrides = ConnectionOverrides {
        controller: cli.global.controller.clone(),
        insecure: cli.global.insecure,
        timeout: cli.global.timeout,
    };
    let controller_config = flowsum_config::controller_config(&cfg.defaults, &profile, &overrides)?;
    let mut controller = Controller::new(controller_config)?;

    let token_file = cli.auth_token_file.as_deref().or(profile.token_file.as_deref());
    auth::authenticate(
        &mut controller,
        cli.token.as_deref(),
        token_file,
        profile.email.as_deref(),
    )
    .await?;

    let spinner = output::spinner("Fetching flows...", cli.global.quiet);
    let result = flowsum_core::run(&mut controller, &request).await;
    spinner.finish_and_clear();
    let report = result?;

    warn_if_weak(&report.site, cfg.defaults.match_warn_below);
    if let Some(app) = &report.app {
        warn_if_weak(app, cfg.defaults.match_warn_below);
    }

    let rendered = output::render_report(&report, format, color)?;
    output::print_output(&rendered, cli.global.quiet)
}

/// Log a low-confidence match. The match is still used.
fn warn_if_weak(found: &Match<Entity>, threshold: u8) {
    if found.score < threshold {
        warn!(
            score = found.score,
            matched = %found.entity.display_name,
            "closest {} is a weak match",
            found.entity.kind
        );
    }
}

fn resolve_format(flag: Option<OutputFormat>, defaults: &Defaults) -> Result<OutputFormat, CliError> {
    match flag {
        Some(format) => Ok(format),
        None => OutputFormat::from_str(&defaults.output, true).map_err(|reason| {
            CliError::Validation {
                field: "defaults.output".into(),
                reason,
            }
        }),
    }
}

fn resolve_color(flag: Option<ColorMode>, defaults: &Defaults) -> Result<ColorMode, CliError> {
    match flag {
        Some(mode) => Ok(mode),
        None => ColorMode::from_str(&defaults.color, true).map_err(|reason| CliError::Validation {
            field: "defaults.color".into(),
            reason,
        }),
    }
}
