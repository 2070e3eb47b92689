//! Business logic between `flowsum-api` and the `flowsum` CLI.
//!
//! A run is linear: parse the period and source prefix, resolve the site
//! (and optionally an application) by fuzzy name, fetch one page of flows,
//! aggregate them and render a report.
//!
//! - **[`Controller`]** owns an authenticated API session and implements
//!   the [`Directory`], [`FlowStore`] and [`Session`] traits over HTTP.
//! - **[`summarize`] / [`run`]** drive a run against any backend that
//!   implements those traits; `run` always closes the session.
//! - **Pure stages** ([`Period`], [`TimeWindow`], [`SourcePrefix`],
//!   [`resolve()`], [`aggregate()`], [`render`]) take no I/O and are unit
//!   tested in place.

pub mod aggregate;
pub mod backend;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod period;
pub mod prefix;
pub mod report;
pub mod resolve;
pub mod summary;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{
    Aggregation, ByteUnit, FLOW_METRICS, FlowStats, MetricSummary, MetricValue,
    PriorityHistogram, TRUNCATION_THRESHOLD, aggregate,
};
pub use backend::{Directory, FlowQuery, FlowStore, Session};
pub use config::{ControllerConfig, Credentials, TlsVerification};
pub use controller::{Controller, Operator};
pub use error::CoreError;
pub use model::{Entity, EntityKind, FlowRecord, Match, Named};
pub use period::{Period, PeriodUnit};
pub use prefix::SourcePrefix;
pub use report::{LineKind, ReportLine, SummaryReport, format_average, lines, render};
pub use resolve::{resolve, similarity};
pub use summary::{ALL_APPS, SummaryRequest, run, summarize};
pub use window::TimeWindow;
