// ── Flow summary orchestration ──
//
// resolve site → resolve app (optional) → query flows → aggregate.
// `run` wraps `summarize` and closes the session on every path.

use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::backend::{Directory, FlowQuery, FlowStore, Session};
use crate::error::CoreError;
use crate::model::{Entity, EntityKind, Match};
use crate::period::Period;
use crate::prefix::SourcePrefix;
use crate::report::SummaryReport;
use crate::resolve::resolve;
use crate::window::TimeWindow;

/// App query that disables application filtering, case-insensitive.
pub const ALL_APPS: &str = "all";

/// Validated input for one summary run.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub site_query: String,
    /// `None` summarizes every application.
    pub app_query: Option<String>,
    pub source_prefix: SourcePrefix,
    pub period: Period,
    pub window: TimeWindow,
}

impl SummaryRequest {
    pub fn new(site_query: impl Into<String>, period: Period, window: TimeWindow) -> Self {
        Self {
            site_query: site_query.into(),
            app_query: None,
            source_prefix: SourcePrefix::ANY,
            period,
            window,
        }
    }

    /// Filter on an application. `all` (any case) and blank clear the filter.
    pub fn with_app(mut self, query: &str) -> Self {
        let query = query.trim();
        self.app_query = (!query.is_empty() && !query.eq_ignore_ascii_case(ALL_APPS))
            .then(|| query.to_string());
        self
    }

    pub fn with_source_prefix(mut self, prefix: SourcePrefix) -> Self {
        self.source_prefix = prefix;
        self
    }
}

/// Resolve the request against the directory, fetch and aggregate flows.
pub async fn summarize<B>(backend: &B, request: &SummaryRequest) -> Result<SummaryReport, CoreError>
where
    B: Directory + FlowStore,
{
    let sites = backend.list_sites().await?;
    let site = resolve(sites, &request.site_query, EntityKind::Site)?;
    log_match(&site);

    let app = match &request.app_query {
        Some(query) => {
            let apps = backend.list_applications().await?;
            let app = resolve(apps, query, EntityKind::Application)?;
            log_match(&app);
            Some(app)
        }
        None => None,
    };

    let query = FlowQuery {
        window: request.window,
        site_id: site.entity.id.clone(),
        app_id: app.as_ref().map(|m| m.entity.id.clone()),
        source_prefix: request.source_prefix.as_filter(),
    };
    debug!(?query, "flow query");

    let flows = backend.query_flows(&query).await?;
    info!(count = flows.len(), "flows retrieved");

    let aggregation = aggregate(&flows)?;

    Ok(SummaryReport {
        period: request.period,
        window: request.window,
        site,
        app,
        source_prefix: request.source_prefix,
        aggregation,
    })
}

/// Record what the flow query will target before it runs.
fn log_match(found: &Match<Entity>) {
    info!(
        id = %found.entity.id,
        name = %found.entity.display_name,
        score = found.score,
        "resolved {}",
        found.entity.kind
    );
}

/// [`summarize`], then log out whatever the outcome.
///
/// A logout failure is logged and never replaces the summary result.
pub async fn run<B>(backend: &mut B, request: &SummaryRequest) -> Result<SummaryReport, CoreError>
where
    B: Directory + FlowStore + Session,
{
    let result = summarize(&*backend, request).await;

    if let Err(e) = backend.logout().await {
        warn!(error = %e, "logout failed (non-fatal)");
    }

    result
}
