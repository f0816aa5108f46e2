//! Funnel analysis — impression-to-sale progression across the course sales
//! funnel.
//!
//! The funnel is computed over whatever slice it is given. The dashboard
//! passes the whole dataset, independent of the platform selector; callers
//! wanting a per-platform funnel filter the slice first.

use serde::{Deserialize, Serialize};
use traffic_core::types::{guarded_ratio, CreativeRecord};

pub const STAGE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStageKind {
    Impressions,
    Clicks,
    LandingPage,
    Applications,
    CallsScheduled,
    CallsCompleted,
    Sales,
}

impl FunnelStageKind {
    pub const ALL: [FunnelStageKind; STAGE_COUNT] = [
        FunnelStageKind::Impressions,
        FunnelStageKind::Clicks,
        FunnelStageKind::LandingPage,
        FunnelStageKind::Applications,
        FunnelStageKind::CallsScheduled,
        FunnelStageKind::CallsCompleted,
        FunnelStageKind::Sales,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Impressions => "Impressions",
            Self::Clicks => "Clicks",
            Self::LandingPage => "Landing Page",
            Self::Applications => "Applications",
            Self::CallsScheduled => "Calls Scheduled",
            Self::CallsCompleted => "Calls Completed",
            Self::Sales => "Sales",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub kind: FunnelStageKind,
    pub stage: String,
    pub count: u64,
    /// Percent of the previous stage that reached this one. Exceeds 100 when
    /// the upstream counters are inconsistent.
    pub conversion_rate: f64,
    /// Percent of the previous stage lost before this one. Negative when the
    /// upstream counters are inconsistent.
    pub drop_off_rate: f64,
}

pub struct FunnelCalculator;

impl FunnelCalculator {
    pub fn compute(records: &[CreativeRecord]) -> [FunnelStage; STAGE_COUNT] {
        let mut totals = [0u64; STAGE_COUNT];
        for record in records {
            for (total, count) in totals.iter_mut().zip(record.funnel_counts()) {
                *total = total.saturating_add(count);
            }
        }

        FunnelStageKind::ALL.map(|kind| {
            let i = kind.index();
            let count = totals[i];
            let (conversion_rate, drop_off_rate) = if i == 0 {
                (100.0, 0.0)
            } else {
                let previous = totals[i - 1] as f64;
                (
                    guarded_ratio(count as f64, previous) * 100.0,
                    guarded_ratio(previous - count as f64, previous) * 100.0,
                )
            };
            FunnelStage {
                kind,
                stage: kind.label().to_string(),
                count,
                conversion_rate,
                drop_off_rate,
            }
        })
    }
}

/// Headline figures derived from a computed funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelInsights {
    /// Percent of landing-page visitors who did not fill an application.
    pub application_drop_off: f64,
    /// Percent of completed calls that closed into a sale.
    pub close_rate: f64,
    /// Sales as a percent of impressions.
    pub overall_efficiency: f64,
}

impl FunnelInsights {
    pub fn from_stages(stages: &[FunnelStage; STAGE_COUNT]) -> Self {
        let impressions = &stages[FunnelStageKind::Impressions.index()];
        let applications = &stages[FunnelStageKind::Applications.index()];
        let sales = &stages[FunnelStageKind::Sales.index()];
        Self {
            application_drop_off: applications.drop_off_rate,
            close_rate: sales.conversion_rate,
            overall_efficiency: guarded_ratio(sales.count as f64, impressions.count as f64) * 100.0,
        }
    }
}
