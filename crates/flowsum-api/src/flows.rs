// Flow monitor endpoint
//
// A single POST returns the first page of flows matching the filter.
// The controller caps the page at `MAX_FLOWS_PER_QUERY` records and
// offers no cursor on this endpoint.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{FlowsRequest, FlowsResponse};

/// Hard upper bound on records returned by one flow query.
pub const MAX_FLOWS_PER_QUERY: usize = 1000;

impl ApiClient {
    /// Query flow records for a time window and filter.
    ///
    /// `POST /v3.6/api/tenants/{tenant}/monitor/flows`
    pub async fn query_flows(
        &self,
        request: &FlowsRequest,
    ) -> Result<Vec<Map<String, Value>>, Error> {
        let url = self.tenant_url("v3.6", "monitor/flows")?;
        debug!(
            start = %request.start_time,
            end = %request.end_time,
            sites = ?request.filter.site,
            "querying flows"
        );
        let resp: FlowsResponse = self.post(url, request).await?;
        let flows = resp.into_items();
        debug!(count = flows.len(), "flows received");
        Ok(flows)
    }
}
