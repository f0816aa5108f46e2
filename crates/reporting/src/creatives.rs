//! Per-creative performance table and rankings.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use traffic_core::error::{CampaignError, CampaignResult};
use traffic_core::types::{CreativeId, CreativeRecord, CreativeStatus, Platform};

/// Ordering key for creative rankings. Both rank highest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreativeRanking {
    #[default]
    Roi,
    Revenue,
}

impl CreativeRanking {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roi => "roi",
            Self::Revenue => "revenue",
        }
    }

    fn key(&self, summary: &CreativeSummary) -> f64 {
        match self {
            Self::Roi => summary.roi,
            Self::Revenue => summary.revenue,
        }
    }
}

impl FromStr for CreativeRanking {
    type Err = CampaignError;

    fn from_str(s: &str) -> CampaignResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "roi" => Ok(Self::Roi),
            "revenue" => Ok(Self::Revenue),
            _ => Err(CampaignError::invalid_filter("ranking", s)),
        }
    }
}

impl fmt::Display for CreativeRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the creative performance table. Every ratio is computed from
/// the record's counters; the platform-reported CTR only shows up as drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeSummary {
    pub id: CreativeId,
    pub name: String,
    pub platform: Platform,
    pub agent: String,
    pub status: CreativeStatus,
    pub course_name: String,
    pub course_price: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub leads: u64,
    pub sales: u64,
    pub ad_spend: f64,
    pub revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpl: f64,
    pub cpa: f64,
    pub roi: f64,
    pub roas: f64,
    pub conversion_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr_drift: Option<f64>,
}

impl From<&CreativeRecord> for CreativeSummary {
    fn from(r: &CreativeRecord) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            platform: r.platform,
            agent: r.agent.clone(),
            status: r.status,
            course_name: r.course_name.clone(),
            course_price: r.course_price,
            impressions: r.impressions,
            clicks: r.clicks,
            leads: r.leads,
            sales: r.sales,
            ad_spend: r.ad_spend,
            revenue: r.revenue,
            ctr: r.ctr(),
            cpc: r.cpc(),
            cpm: r.cpm(),
            cpl: r.cpl(),
            cpa: r.cpa(),
            roi: r.roi(),
            roas: r.roas(),
            conversion_rate: r.conversion_rate(),
            ctr_drift: r.ctr_drift(),
        }
    }
}

/// Creative rows sorted by `ranking`, highest first, ties by name. `limit`
/// keeps only the leading rows.
pub fn rank_creatives<R: Borrow<CreativeRecord>>(
    records: &[R],
    ranking: CreativeRanking,
    limit: Option<usize>,
) -> Vec<CreativeSummary> {
    let mut rows: Vec<CreativeSummary> = records
        .iter()
        .map(|r| CreativeSummary::from(Borrow::<CreativeRecord>::borrow(r)))
        .collect();

    rows.sort_by(|a, b| {
        ranking
            .key(b)
            .partial_cmp(&ranking.key(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    rows
}
