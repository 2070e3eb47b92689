// ── API-to-domain type conversions ──
//
// Bridges raw `flowsum_api` payloads into the domain model, and the
// domain flow query back into the wire request.

use flowsum_api::{AppDef, FlowFilter, FlowsRequest, Site, SourceFilter};

use crate::backend::FlowQuery;
use crate::model::{Entity, EntityKind};

/// Detail level requested from the flow monitor.
const FLOW_DEBUG_LEVEL: &str = "all";

impl From<Site> for Entity {
    fn from(s: Site) -> Self {
        Entity {
            id: s.id,
            display_name: s.name,
            description: s.description,
            kind: EntityKind::Site,
        }
    }
}

impl From<AppDef> for Entity {
    fn from(a: AppDef) -> Self {
        Entity {
            id: a.id,
            display_name: a.display_name,
            description: a.description,
            kind: EntityKind::Application,
        }
    }
}

impl From<&FlowQuery> for FlowsRequest {
    fn from(q: &FlowQuery) -> Self {
        FlowsRequest {
            start_time: q.window.start_rfc3339(),
            end_time: q.window.end_rfc3339(),
            filter: FlowFilter {
                site: vec![q.site_id.clone()],
                app: q.app_id.clone().map(|id| vec![id]),
                flow: q.source_prefix.map(|prefix| SourceFilter {
                    source_ip: vec![prefix.to_string()],
                }),
            },
            debug_level: FLOW_DEBUG_LEVEL.into(),
        }
    }
}
