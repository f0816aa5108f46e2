//! Creative performance reporting — KPI roll-ups, the course sales funnel,
//! platform, ad manager and per-creative breakdowns, and memoized dashboard
//! reports.

pub mod agents;
pub mod cache;
pub mod creatives;
pub mod dashboard;
pub mod funnel;
pub mod report_builder;

pub use agents::{agent_breakdown, AgentSummary, PerformanceRating};
pub use cache::MetricsCache;
pub use creatives::{rank_creatives, CreativeRanking, CreativeSummary};
pub use dashboard::{AggregatedMetrics, Aggregator, PlatformSummary};
pub use funnel::{FunnelCalculator, FunnelInsights, FunnelStage, FunnelStageKind};
pub use report_builder::{DashboardReport, ReportBuilder};
