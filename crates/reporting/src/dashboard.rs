//! Creative performance dashboard — KPI roll-ups over a record collection.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use traffic_core::filter::{MetricsFilter, PlatformFilter};
use traffic_core::types::{guarded_ratio, CreativeRecord, Platform};

/// Roll-up KPIs for one filter selection. Rates are percentages, ROAS is a
/// multiplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub total_spent: f64,
    pub total_revenue: f64,
    pub total_leads: u64,
    pub total_sales: u64,
    pub total_impressions: u64,
    pub total_clicks: u64,
    pub avg_cpl: f64,
    pub avg_cpa: f64,
    pub avg_roi: f64,
    pub avg_roas: f64,
    pub avg_ctr: f64,
    pub overall_conversion_rate: f64,
}

impl AggregatedMetrics {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a CreativeRecord>) -> Self {
        let mut m = Self::default();
        for r in records {
            m.total_spent += r.ad_spend;
            m.total_revenue += r.revenue;
            m.total_leads = m.total_leads.saturating_add(r.leads);
            m.total_sales = m.total_sales.saturating_add(r.sales);
            m.total_impressions = m.total_impressions.saturating_add(r.impressions);
            m.total_clicks = m.total_clicks.saturating_add(r.clicks);
        }

        let spent = m.total_spent;
        m.avg_cpl = guarded_ratio(spent, m.total_leads as f64);
        m.avg_cpa = guarded_ratio(spent, m.total_sales as f64);
        m.avg_roi = guarded_ratio(m.total_revenue - spent, spent) * 100.0;
        m.avg_roas = guarded_ratio(m.total_revenue, spent);
        m.avg_ctr = guarded_ratio(m.total_clicks as f64, m.total_impressions as f64) * 100.0;
        m.overall_conversion_rate =
            guarded_ratio(m.total_sales as f64, m.total_leads as f64) * 100.0;
        m
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: Platform,
    pub creative_count: usize,
    pub metrics: AggregatedMetrics,
    /// Share of total spend across all platforms, percent.
    pub spend_share: f64,
}

/// Stateless KPI aggregator.
pub struct Aggregator;

impl Aggregator {
    pub fn aggregate(records: &[CreativeRecord], platform: &PlatformFilter) -> AggregatedMetrics {
        AggregatedMetrics::from_records(records.iter().filter(|r| platform.matches(r)))
    }

    pub fn aggregate_filtered(records: &[CreativeRecord], filter: &MetricsFilter) -> AggregatedMetrics {
        AggregatedMetrics::from_records(records.iter().filter(|r| filter.matches(r)))
    }

    /// Per-platform roll-ups for every platform present, in
    /// [`Platform::ALL`] order. Accepts owned records or references.
    pub fn platform_breakdown<R: Borrow<CreativeRecord>>(records: &[R]) -> Vec<PlatformSummary> {
        let total_spent: f64 = records
            .iter()
            .map(|r| Borrow::<CreativeRecord>::borrow(r).ad_spend)
            .sum();

        Platform::ALL
            .iter()
            .filter_map(|&platform| {
                let selected: Vec<&CreativeRecord> = records
                    .iter()
                    .map(Borrow::<CreativeRecord>::borrow)
                    .filter(|r| r.platform == platform)
                    .collect();
                if selected.is_empty() {
                    return None;
                }
                let metrics = AggregatedMetrics::from_records(selected.iter().copied());
                Some(PlatformSummary {
                    platform,
                    creative_count: selected.len(),
                    spend_share: guarded_ratio(metrics.total_spent, total_spent) * 100.0,
                    metrics,
                })
            })
            .collect()
    }
}

pub(crate) fn aggregate_refs(records: &[&CreativeRecord]) -> AggregatedMetrics {
    AggregatedMetrics::from_records(records.iter().copied())
}
