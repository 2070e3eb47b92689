// ── Collaborator interfaces ──
//
// The orchestrator talks to the controller through these three narrow
// traits. `Controller` implements all of them over HTTP; tests swap in
// an in-memory backend.

use std::future::Future;

use crate::error::CoreError;
use crate::model::{Entity, FlowRecord};
use crate::prefix::SourcePrefix;
use crate::window::TimeWindow;

/// Site and application lookup.
pub trait Directory {
    fn list_sites(&self) -> impl Future<Output = Result<Vec<Entity>, CoreError>>;

    fn list_applications(&self) -> impl Future<Output = Result<Vec<Entity>, CoreError>>;
}

/// Time-ranged flow lookup.
pub trait FlowStore {
    /// Fetch the flows matching `query`. The store caps the result and
    /// returns only its first page.
    fn query_flows(
        &self,
        query: &FlowQuery,
    ) -> impl Future<Output = Result<Vec<FlowRecord>, CoreError>>;
}

/// An authenticated session that must be closed.
pub trait Session {
    fn logout(&mut self) -> impl Future<Output = Result<(), CoreError>>;
}

/// Resolved filter for one flow query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowQuery {
    pub window: TimeWindow,
    pub site_id: String,
    /// `None` queries every application.
    pub app_id: Option<String>,
    /// `None` queries every source address.
    pub source_prefix: Option<SourcePrefix>,
}
