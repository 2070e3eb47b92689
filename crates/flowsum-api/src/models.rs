// Controller REST payload types
//
// List endpoints wrap their payload in `{ "count": N, "items": [...] }`.
// Fields use `#[serde(default)]` liberally because the controller omits
// or nulls optional fields depending on object age and API version.

use serde::{Deserialize, Serialize};

// ── Envelopes ────────────────────────────────────────────────────────

/// Standard list envelope returned by collection endpoints.
///
/// `items` may be absent or `null` on an empty tenant.
#[derive(Debug, Deserialize)]
pub struct ItemsResponse<T> {
    #[serde(default = "Option::default")]
    pub items: Option<Vec<T>>,
}

impl<T> ItemsResponse<T> {
    pub fn into_items(self) -> Vec<T> {
        self.items.unwrap_or_default()
    }
}

/// Error body returned alongside non-2xx statuses:
/// `{"_error": [{"code": "...", "message": "..."}]}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, rename = "_error")]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Response to `POST /api/login`.
///
/// The token is only present when the tenant allows token sessions;
/// otherwise the session lives in the cookie jar.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub x_auth_token: Option<String>,
}

/// The authenticated operator's profile. `tenant_id` is `None` when the
/// session is not valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorProfile {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

// ── Directory ────────────────────────────────────────────────────────

/// Site object from `GET /tenants/{tenant}/sites`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Catch-all for fields we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Application definition from `GET /tenants/{tenant}/appdefs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDef {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Flow monitor ─────────────────────────────────────────────────────

/// Body of `POST /tenants/{tenant}/monitor/flows`.
#[derive(Debug, Clone, Serialize)]
pub struct FlowsRequest {
    pub start_time: String,
    pub end_time: String,
    pub filter: FlowFilter,
    pub debug_level: String,
}

/// Filter clause of a flow query. Only `site` is mandatory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowFilter {
    pub site: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<SourceFilter>,
}

/// Per-flow match criteria nested under `filter.flow`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFilter {
    pub source_ip: Vec<String>,
}

/// Response of the flow monitor query.
///
/// An empty window may come back with `flows` or `items` absent or `null`.
#[derive(Debug, Deserialize)]
pub struct FlowsResponse {
    #[serde(default)]
    pub flows: Option<FlowPage>,
}

impl FlowsResponse {
    pub fn into_items(self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.flows
            .and_then(|page| page.items)
            .unwrap_or_default()
    }
}

/// One page of flow records. Records are kept as raw JSON maps because
/// the set of counters varies per flow and per controller release.
#[derive(Debug, Default, Deserialize)]
pub struct FlowPage {
    #[serde(default)]
    pub items: Option<Vec<serde_json::Map<String, serde_json::Value>>>,
}
