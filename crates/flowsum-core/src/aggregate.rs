// ── Flow aggregation ──
//
// One pass over the flow list feeds a sum/count accumulator per counter
// and a priority-class histogram. Byte counters are rescaled by 1024
// steps for display; the kbps/mbps labels are a display convention on a
// byte average, no bit conversion happens.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::FlowRecord;

/// Counters averaged across flows, in report order.
pub const FLOW_METRICS: [&str; 11] = [
    "init_success",
    "bytes_c2s",
    "bytes_s2c",
    "reset_c2s",
    "reset_s2c",
    "retransmit_bytes_c2s",
    "retransmit_bytes_s2c",
    "retransmit_pkts_c2s",
    "retransmit_pkts_s2c",
    "ooo_pkts_c2s",
    "ooo_pkts_s2c",
];

/// Flow count at which the result is considered cut off by the store.
pub const TRUNCATION_THRESHOLD: usize = flowsum_api::MAX_FLOWS_PER_QUERY;

const PRIORITY_FIELD: &str = "priority_class";

// ── Accumulator ──────────────────────────────────────────────────────

/// Running sum and contributor count for one counter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricAccumulator {
    sum: f64,
    count: usize,
}

impl MetricAccumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// `None` when nothing contributed.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

// ── Unit scaling ─────────────────────────────────────────────────────

/// Display unit for byte counters, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ByteUnit {
    Bytes,
    Kbps,
    Mbps,
    Gbps,
    Tbps,
}

impl ByteUnit {
    /// Divide by 1024 while the value exceeds 1024, up to the top unit.
    pub fn scale(value: f64) -> (f64, Self) {
        let mut value = value;
        let mut units = Self::iter();
        let mut unit = units.next().unwrap_or(Self::Bytes);

        while value > 1024.0 {
            let Some(next) = units.next() else { break };
            value /= 1024.0;
            unit = next;
        }
        (value, unit)
    }
}

// ── Results ──────────────────────────────────────────────────────────

/// The averaged value of one counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricValue {
    NoData,
    Plain { value: f64 },
    Scaled { value: f64, unit: ByteUnit },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub name: &'static str,
    /// Flows that carried a usable value for this counter.
    pub contributors: usize,
    pub value: MetricValue,
}

impl MetricSummary {
    fn from_accumulator(name: &'static str, acc: &MetricAccumulator) -> Self {
        let value = match acc.average() {
            None => MetricValue::NoData,
            Some(avg) if name.contains("bytes") => {
                let (value, unit) = ByteUnit::scale(avg);
                MetricValue::Scaled { value, unit }
            }
            Some(value) => MetricValue::Plain { value },
        };
        Self {
            name,
            contributors: acc.count(),
            value,
        }
    }
}

/// Flow counts per priority class, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriorityHistogram(IndexMap<i64, usize>);

impl PriorityHistogram {
    pub fn record(&mut self, class: i64) {
        *self.0.entry(class).or_insert(0) += 1;
    }

    pub fn get(&self, class: i64) -> Option<usize> {
        self.0.get(&class).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, usize)> + '_ {
        self.0.iter().map(|(class, count)| (*class, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Statistics over a non-empty flow list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowStats {
    pub flow_count: usize,
    /// The store returned as many flows as it ever will; more may exist.
    pub truncated: bool,
    pub metrics: Vec<MetricSummary>,
    pub priorities: PriorityHistogram,
}

/// Outcome of aggregation. An empty flow list is a normal outcome,
/// distinct from a failed fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Aggregation {
    Empty,
    Flows(FlowStats),
}

impl Aggregation {
    pub fn flow_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Flows(stats) => stats.flow_count,
        }
    }
}

// ── Aggregator ───────────────────────────────────────────────────────

/// Aggregate a flow list into per-counter averages and a priority histogram.
///
/// Every flow must carry an integer `priority_class`; the first flow
/// without one aborts the run with [`CoreError::MissingPriorityClass`].
pub fn aggregate(flows: &[FlowRecord]) -> Result<Aggregation, CoreError> {
    if flows.is_empty() {
        debug!("no flows to aggregate");
        return Ok(Aggregation::Empty);
    }

    let truncated = flows.len() >= TRUNCATION_THRESHOLD;
    if truncated {
        warn!(
            count = flows.len(),
            "flow result hit the store cap, statistics cover a partial set"
        );
    }

    let mut accumulators = [MetricAccumulator::default(); FLOW_METRICS.len()];
    let mut priorities = PriorityHistogram::default();

    for (index, flow) in flows.iter().enumerate() {
        for (name, acc) in FLOW_METRICS.iter().zip(accumulators.iter_mut()) {
            if let Some(value) = flow.metric(name) {
                acc.add(value);
            }
        }
        priorities.record(priority_class(flow, index)?);
    }

    let metrics = FLOW_METRICS
        .iter()
        .zip(accumulators.iter())
        .map(|(&name, acc)| MetricSummary::from_accumulator(name, acc))
        .collect();

    Ok(Aggregation::Flows(FlowStats {
        flow_count: flows.len(),
        truncated,
        metrics,
        priorities,
    }))
}

fn priority_class(flow: &FlowRecord, index: usize) -> Result<i64, CoreError> {
    match flow.get(PRIORITY_FIELD) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| CoreError::MissingPriorityClass {
            index,
            found: n.to_string(),
        }),
        Some(other) => Err(CoreError::MissingPriorityClass {
            index,
            found: other.to_string(),
        }),
        None => Err(CoreError::MissingPriorityClass {
            index,
            found: "missing".into(),
        }),
    }
}
