//! Report output: text or JSON on stdout.
//!
//! Text mode styles the tagged report lines from `flowsum_core::lines`;
//! JSON serializes the whole report via serde.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use flowsum_core::{LineKind, SummaryReport};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color ────────────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn paint(kind: LineKind, text: &str) -> String {
    match kind {
        LineKind::Heading => text.bold().to_string(),
        LineKind::Warning => text.yellow().bold().to_string(),
        LineKind::NoData => text.dimmed().to_string(),
        LineKind::Detail | LineKind::Blank => text.to_string(),
    }
}

// ── Render ───────────────────────────────────────────────────────────

/// Render a report in the chosen format.
pub fn render_report(
    report: &SummaryReport,
    format: OutputFormat,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(flowsum_core::lines(report)
            .iter()
            .map(|line| {
                if color {
                    paint(line.kind, &line.text)
                } else {
                    line.text.clone()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) -> Result<(), CliError> {
    if quiet || output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr while the controller works. Hidden unless stderr
/// is a terminal, so piped runs stay clean.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use flowsum_core::{
        Aggregation, Entity, EntityKind, Match, Period, SourcePrefix, TimeWindow,
    };

    use super::*;

    fn report() -> SummaryReport {
        let period = Period::parse("30s").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 11, 12, 0, 0).unwrap();
        SummaryReport {
            period,
            window: TimeWindow::anchored(now, 0, &period).unwrap(),
            site: Match {
                entity: Entity::new(EntityKind::Site, "1500", "Chicago-1"),
                score: 88,
            },
            app: None,
            source_prefix: SourcePrefix::ANY,
            aggregation: Aggregation::Empty,
        }
    }

    #[test]
    fn plain_text_matches_core_rendering() {
        let text = render_report(&report(), OutputFormat::Text, false).unwrap();
        assert_eq!(text, flowsum_core::render(&report()).join("\n"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn colored_text_carries_escape_codes() {
        let text = render_report(&report(), OutputFormat::Text, true).unwrap();
        assert!(text.contains('\u{1b}'));
        assert!(text.contains("No flows found"));
    }

    #[test]
    fn json_is_the_serialized_report() {
        let text = render_report(&report(), OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["period"]["unit"], "seconds");
        assert_eq!(value["window"]["end"], "2024-06-11T12:00:30Z");
    }

    #[test]
    fn explicit_color_modes() {
        assert!(should_color(ColorMode::Always));
        assert!(!should_color(ColorMode::Never));
    }
}
