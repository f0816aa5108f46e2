//! Ad manager roll-ups — per-agent performance and rating.

use crate::dashboard::{aggregate_refs, AggregatedMetrics};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use traffic_core::types::{CreativeRecord, CreativeStatus, Platform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceRating {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceRating {
    /// Rating tier for a ROI percentage.
    pub fn from_roi(roi: f64) -> Self {
        if roi >= 500.0 {
            Self::Excellent
        } else if roi >= 300.0 {
            Self::Good
        } else if roi >= 100.0 {
            Self::Average
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent: String,
    pub platforms: Vec<Platform>,
    pub creative_count: usize,
    pub active_creatives: usize,
    pub metrics: AggregatedMetrics,
    pub rating: PerformanceRating,
}

/// Group records by owning agent. Sorted by ROI descending, then by name.
pub fn agent_breakdown<R: Borrow<CreativeRecord>>(records: &[R]) -> Vec<AgentSummary> {
    let mut by_agent: BTreeMap<&str, Vec<&CreativeRecord>> = BTreeMap::new();
    for record in records {
        let record: &CreativeRecord = record.borrow();
        by_agent.entry(record.agent.as_str()).or_default().push(record);
    }

    let mut summaries: Vec<AgentSummary> = by_agent
        .into_iter()
        .map(|(agent, owned)| {
            let mut platforms: Vec<Platform> = owned.iter().map(|r| r.platform).collect();
            platforms.sort();
            platforms.dedup();

            let metrics = aggregate_refs(&owned);
            AgentSummary {
                agent: agent.to_string(),
                platforms,
                creative_count: owned.len(),
                active_creatives: owned
                    .iter()
                    .filter(|r| r.status == CreativeStatus::Active)
                    .count(),
                rating: PerformanceRating::from_roi(metrics.avg_roi),
                metrics,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.metrics
            .avg_roi
            .partial_cmp(&a.metrics.avg_roi)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    summaries
}
