//! Dashboard report builder — assembles every derived view for one filter
//! selection into a single serializable value.

use crate::agents::{agent_breakdown, AgentSummary};
use crate::cache::MetricsCache;
use crate::creatives::{rank_creatives, CreativeRanking, CreativeSummary};
use crate::dashboard::{AggregatedMetrics, Aggregator, PlatformSummary};
use crate::funnel::{FunnelInsights, FunnelStage, STAGE_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use traffic_core::error::CampaignResult;
use traffic_core::filter::{MetricsFilter, ReportingPeriod};
use traffic_core::source::RecordSnapshot;
use traffic_core::types::CreativeRecord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub snapshot_version: u64,
    pub filter: MetricsFilter,
    /// Creatives left after the platform and period filters.
    pub creative_count: usize,
    pub metrics: AggregatedMetrics,
    /// Always computed over the whole snapshot.
    pub funnel: [FunnelStage; STAGE_COUNT],
    pub insights: FunnelInsights,
    pub platform_breakdown: Vec<PlatformSummary>,
    pub agent_breakdown: Vec<AgentSummary>,
    /// Filtered creatives, highest ROI first.
    pub creatives: Vec<CreativeSummary>,
}

impl DashboardReport {
    pub fn to_json(&self, pretty: bool) -> CampaignResult<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub struct ReportBuilder {
    cache: Arc<MetricsCache>,
}

impl ReportBuilder {
    pub fn new(cache: Arc<MetricsCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<MetricsCache> {
        &self.cache
    }

    pub fn build(&self, snapshot: &RecordSnapshot, filter: &MetricsFilter) -> DashboardReport {
        if filter.period != ReportingPeriod::default() {
            debug!(period = %filter.period, "Reporting period selected; records carry no timestamp");
        }

        let selected: Vec<&CreativeRecord> = snapshot
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .collect();

        let metrics = self.cache.metrics(snapshot, filter);
        let funnel = self.cache.funnel(snapshot);
        let insights = FunnelInsights::from_stages(&funnel);

        info!(
            version = snapshot.version,
            platform = %filter.platform,
            creatives = selected.len(),
            total_spent = metrics.total_spent,
            avg_roi = metrics.avg_roi,
            "Dashboard report built"
        );

        DashboardReport {
            generated_at: Utc::now(),
            snapshot_version: snapshot.version,
            filter: *filter,
            creative_count: selected.len(),
            metrics,
            funnel,
            insights,
            platform_breakdown: Aggregator::platform_breakdown(&selected),
            agent_breakdown: agent_breakdown(&selected),
            creatives: rank_creatives(&selected, CreativeRanking::Roi, None),
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(Arc::new(MetricsCache::new(1024)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::filter::PlatformFilter;
    use traffic_core::types::{CreativeId, CreativeStatus, Platform};

    fn record(id: u64, platform: Platform, agent: &str) -> CreativeRecord {
        CreativeRecord {
            id: CreativeId::Numeric(id),
            name: format!("creative-{id}"),
            platform,
            agent: agent.into(),
            status: CreativeStatus::Active,
            impressions: 1_000,
            clicks: 50,
            landing_page_views: 40,
            applications_filled: 10,
            calls_scheduled: 8,
            calls_completed: 5,
            leads: 20,
            qualified_leads: 15,
            sales: 2,
            ad_spend: 100.0,
            revenue: 700.0,
            course_name: "Web Dev".into(),
            course_price: 3_990.0,
            reported: None,
        }
    }

    fn snapshot() -> RecordSnapshot {
        RecordSnapshot::new(
            3,
            vec![
                record(1, Platform::Facebook, "Anna Smirnova"),
                record(2, Platform::TikTok, "Maria Volkova"),
                record(3, Platform::TikTok, "Maria Volkova"),
            ],
        )
    }

    #[test]
    fn test_report_filters_metrics_but_not_funnel() {
        let builder = ReportBuilder::default();
        let filter = MetricsFilter::platform(PlatformFilter::Only(Platform::TikTok));
        let report = builder.build(&snapshot(), &filter);

        assert_eq!(report.snapshot_version, 3);
        assert_eq!(report.creative_count, 2);
        assert!((report.metrics.total_spent - 200.0).abs() < f64::EPSILON);
        assert_eq!(report.funnel[0].count, 3_000);
        assert_eq!(report.platform_breakdown.len(), 1);
        assert_eq!(report.agent_breakdown.len(), 1);
        assert_eq!(report.agent_breakdown[0].agent, "Maria Volkova");
        assert!((report.insights.close_rate - 40.0).abs() < 1e-9);
        assert_eq!(report.creatives.len(), 2);
        assert!(report.creatives.iter().all(|c| c.platform == Platform::TikTok));
    }

    #[test]
    fn test_report_uses_shared_cache() {
        let cache = Arc::new(MetricsCache::new(8));
        let builder = ReportBuilder::new(cache.clone());
        builder.build(&snapshot(), &MetricsFilter::default());
        builder.build(&snapshot(), &MetricsFilter::default());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_report_json() {
        let report = ReportBuilder::default().build(&snapshot(), &MetricsFilter::default());
        let json = report.to_json(false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["creative_count"], 3);
        assert_eq!(value["filter"]["platform"], "all");
        assert_eq!(value["filter"]["period"], "month");
        assert_eq!(value["funnel"].as_array().unwrap().len(), 7);
        assert_eq!(value["funnel"][2]["stage"], "Landing Page");
        assert_eq!(value["creatives"].as_array().unwrap().len(), 3);
        assert_eq!(value["creatives"][0]["roi"], 600.0);
        assert!(report.to_json(true).unwrap().contains('\n'));
    }
}
