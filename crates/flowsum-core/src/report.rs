// ── Report rendering ──
//
// Pure formatting of a finished run. `lines` tags every line with a kind
// so front ends can style warnings and gaps; `render` drops the tags.

use serde::Serialize;

use crate::aggregate::{Aggregation, FlowStats, MetricSummary, MetricValue, TRUNCATION_THRESHOLD};
use crate::model::{Entity, Match};
use crate::period::Period;
use crate::prefix::SourcePrefix;
use crate::window::TimeWindow;

/// Everything one run produced, ready to render or serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub period: Period,
    pub window: TimeWindow,
    pub site: Match<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<Match<Entity>>,
    pub source_prefix: SourcePrefix,
    pub aggregation: Aggregation,
}

/// Styling hint for a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Detail,
    Warning,
    NoData,
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

impl ReportLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineKind::Blank, "")
    }
}

/// Render a report as plain text lines.
pub fn render(report: &SummaryReport) -> Vec<String> {
    lines(report).into_iter().map(|line| line.text).collect()
}

/// Render a report as tagged lines, in display order.
pub fn lines(report: &SummaryReport) -> Vec<ReportLine> {
    let mut out = Vec::new();

    out.push(ReportLine::new(
        LineKind::Heading,
        format!("Time Period: {}", report.period),
    ));
    out.push(ReportLine::new(
        LineKind::Detail,
        format!(
            "Time period filter from {} to {}",
            report.window.start_rfc3339(),
            report.window.end_rfc3339()
        ),
    ));

    out.push(ReportLine::blank());
    push_entity(&mut out, "Site", &report.site);
    if let Some(app) = &report.app {
        push_entity(&mut out, "App", app);
    }

    if !report.source_prefix.is_any() {
        out.push(ReportLine::new(
            LineKind::Detail,
            format!("Filtering on source IP/subnet {}", report.source_prefix),
        ));
    }

    out.push(ReportLine::blank());
    match &report.aggregation {
        Aggregation::Empty => {
            out.push(ReportLine::new(LineKind::Detail, "Flows found: 0"));
            out.push(ReportLine::new(LineKind::NoData, "No flows found"));
        }
        Aggregation::Flows(stats) => push_stats(&mut out, stats),
    }

    out
}

fn push_entity(out: &mut Vec<ReportLine>, label: &str, found: &Match<Entity>) {
    let entity = &found.entity;
    out.push(ReportLine::new(LineKind::Heading, format!("Found {label}")));
    out.push(ReportLine::new(
        LineKind::Detail,
        format!("  Name:        {}", entity.display_name),
    ));
    out.push(ReportLine::new(
        LineKind::Detail,
        format!("  ID:          {}", entity.id),
    ));
    out.push(ReportLine::new(
        LineKind::Detail,
        format!(
            "  Description: {}",
            entity.description.as_deref().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
    ));
    out.push(ReportLine::new(
        LineKind::Detail,
        format!("  Match score: {}", found.score),
    ));
}

fn push_stats(out: &mut Vec<ReportLine>, stats: &FlowStats) {
    out.push(ReportLine::new(
        LineKind::Detail,
        format!("Flows found: {}", stats.flow_count),
    ));
    if stats.truncated {
        out.push(ReportLine::new(
            LineKind::Warning,
            format!(
                "WARNING: {TRUNCATION_THRESHOLD} or more flows returned, data will be incomplete"
            ),
        ));
    }

    out.push(ReportLine::new(LineKind::Heading, "Summary metrics"));
    out.extend(stats.metrics.iter().map(metric_line));

    out.push(ReportLine::blank());
    out.extend(stats.priorities.iter().map(|(class, count)| {
        ReportLine::new(
            LineKind::Detail,
            format!("Flows with priority {class}: {count}"),
        )
    }));
}

fn metric_line(metric: &MetricSummary) -> ReportLine {
    let name = metric.name;
    match metric.value {
        MetricValue::NoData => {
            ReportLine::new(LineKind::NoData, format!("Average {name}: 0 (No Data)"))
        }
        MetricValue::Plain { value } => ReportLine::new(
            LineKind::Detail,
            format!("Average {name}: {}", format_average(value)),
        ),
        MetricValue::Scaled { value, unit } => ReportLine::new(
            LineKind::Detail,
            format!("Average {name}: {} {unit}", format_average(value)),
        ),
    }
}

/// Round to three decimals, dropping trailing zeros but keeping at least
/// one fractional digit: `2.0`, `1.907`, `0.25`.
pub fn format_average(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}
