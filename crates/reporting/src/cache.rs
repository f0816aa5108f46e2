//! Memoization of engine output keyed by (snapshot version, filter).
//! Backed by DashMap so one cache can be shared across threads.

use crate::dashboard::{AggregatedMetrics, Aggregator};
use crate::funnel::{FunnelCalculator, FunnelStage, STAGE_COUNT};
use dashmap::DashMap;
use tracing::debug;
use traffic_core::filter::MetricsFilter;
use traffic_core::source::RecordSnapshot;

pub struct MetricsCache {
    metrics: DashMap<(u64, MetricsFilter), AggregatedMetrics>,
    funnels: DashMap<u64, [FunnelStage; STAGE_COUNT]>,
    max_entries: usize,
}

impl MetricsCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            metrics: DashMap::new(),
            funnels: DashMap::new(),
            max_entries,
        }
    }

    pub fn metrics(&self, snapshot: &RecordSnapshot, filter: &MetricsFilter) -> AggregatedMetrics {
        let key = (snapshot.version, *filter);
        if let Some(hit) = self.metrics.get(&key) {
            metrics::counter!("reporting.cache.hit").increment(1);
            return hit.clone();
        }
        metrics::counter!("reporting.cache.miss").increment(1);

        let computed = Aggregator::aggregate_filtered(&snapshot.records, filter);
        // Over capacity: serve uncached until old versions are invalidated.
        if self.len() < self.max_entries {
            self.metrics.insert(key, computed.clone());
        }
        computed
    }

    pub fn funnel(&self, snapshot: &RecordSnapshot) -> [FunnelStage; STAGE_COUNT] {
        if let Some(hit) = self.funnels.get(&snapshot.version) {
            metrics::counter!("reporting.cache.hit").increment(1);
            return hit.clone();
        }
        metrics::counter!("reporting.cache.miss").increment(1);

        let computed = FunnelCalculator::compute(&snapshot.records);
        if self.len() < self.max_entries {
            self.funnels.insert(snapshot.version, computed.clone());
        }
        computed
    }

    /// Drop every entry computed from a snapshot other than `version`.
    pub fn retain_version(&self, version: u64) -> usize {
        // Counted per removal; len() may move under concurrent inserts.
        let mut evicted = 0usize;
        self.metrics.retain(|(v, _), _| {
            let keep = *v == version;
            evicted += usize::from(!keep);
            keep
        });
        self.funnels.retain(|v, _| {
            let keep = *v == version;
            evicted += usize::from(!keep);
            keep
        });
        if evicted > 0 {
            debug!(evicted, version, "Evicted stale metrics cache entries");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.metrics.len() + self.funnels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.funnels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::filter::PlatformFilter;
    use traffic_core::types::{CreativeId, CreativeRecord, CreativeStatus, Platform};

    fn record(platform: Platform, spend: f64) -> CreativeRecord {
        CreativeRecord {
            id: CreativeId::Numeric(9),
            name: "cached".into(),
            platform,
            agent: "Anna Smirnova".into(),
            status: CreativeStatus::Active,
            impressions: 500,
            clicks: 25,
            landing_page_views: 20,
            applications_filled: 4,
            calls_scheduled: 3,
            calls_completed: 2,
            leads: 5,
            qualified_leads: 4,
            sales: 1,
            ad_spend: spend,
            revenue: 400.0,
            course_name: "Python".into(),
            course_price: 1_995.0,
            reported: None,
        }
    }

    #[test]
    fn test_cached_values_match_direct_computation() {
        let cache = MetricsCache::new(16);
        let snap = RecordSnapshot::new(1, vec![record(Platform::Facebook, 100.0), record(Platform::TikTok, 50.0)]);
        let filter = MetricsFilter::platform(PlatformFilter::Only(Platform::TikTok));

        let first = cache.metrics(&snap, &filter);
        let second = cache.metrics(&snap, &filter);
        assert_eq!(first, second);
        assert_eq!(first, Aggregator::aggregate_filtered(&snap.records, &filter));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.funnel(&snap), FunnelCalculator::compute(&snap.records));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_versions_are_kept_apart() {
        let cache = MetricsCache::new(16);
        let filter = MetricsFilter::default();
        let v1 = RecordSnapshot::new(1, vec![record(Platform::YouTube, 100.0)]);
        let v2 = RecordSnapshot::new(2, vec![record(Platform::YouTube, 300.0)]);

        assert!((cache.metrics(&v1, &filter).total_spent - 100.0).abs() < f64::EPSILON);
        assert!((cache.metrics(&v2, &filter).total_spent - 300.0).abs() < f64::EPSILON);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.retain_version(2), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_limit_still_serves() {
        let cache = MetricsCache::new(1);
        let snap = RecordSnapshot::new(1, vec![record(Platform::Facebook, 10.0)]);
        cache.metrics(&snap, &MetricsFilter::default());
        let yt = MetricsFilter::platform(PlatformFilter::Only(Platform::YouTube));
        let m = cache.metrics(&snap, &yt);
        assert_eq!(m, AggregatedMetrics::default());
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_retain_version_during_concurrent_inserts() {
        let cache = MetricsCache::new(usize::MAX);
        let filter = MetricsFilter::default();
        let snapshots: Vec<RecordSnapshot> = (1..=200)
            .map(|v| RecordSnapshot::new(v, vec![record(Platform::Facebook, v as f64)]))
            .collect();

        let evicted = std::thread::scope(|s| {
            let writer = s.spawn(|| {
                for snap in &snapshots {
                    cache.metrics(snap, &filter);
                    cache.funnel(snap);
                }
            });
            let mut evicted = 0;
            while !writer.is_finished() {
                evicted += cache.retain_version(u64::MAX);
            }
            writer.join().unwrap();
            evicted + cache.retain_version(u64::MAX)
        });

        assert_eq!(evicted, 400);
        assert!(cache.is_empty());
    }
}
