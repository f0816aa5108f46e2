//! Record sources — the ingestion boundary in front of the engine.
//!
//! A source hands out immutable [`RecordSnapshot`]s. Every record that crosses
//! this boundary has been validated, so the engine itself only ever sees
//! finite, non-negative money amounts.

use crate::error::{CampaignError, CampaignResult};
use crate::types::CreativeRecord;
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable set of records plus a version that changes with the contents.
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    pub version: u64,
    pub records: Arc<[CreativeRecord]>,
}

impl RecordSnapshot {
    pub fn new(version: u64, records: Vec<CreativeRecord>) -> Self {
        Self {
            version,
            records: records.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub trait RecordSource: Send + Sync {
    fn snapshot(&self) -> CampaignResult<RecordSnapshot>;
}

/// Reject records whose money fields are negative or non-finite.
///
/// Counter ordering (clicks above impressions, a funnel stage above its
/// predecessor) is not rejected: it is logged and left for the funnel to
/// surface.
pub fn validate_record(record: &CreativeRecord) -> CampaignResult<()> {
    for (field, value) in [
        ("ad_spend", record.ad_spend),
        ("revenue", record.revenue),
        ("course_price", record.course_price),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(CampaignError::InvalidRecord {
                id: record.id.to_string(),
                reason: format!("{field} must be a finite non-negative amount, got {value}"),
            });
        }
    }

    let counts = record.funnel_counts();
    for (stage, pair) in counts.windows(2).enumerate() {
        if pair[1] > pair[0] {
            warn!(
                creative_id = %record.id,
                stage = stage + 1,
                previous = pair[0],
                count = pair[1],
                "Funnel counter exceeds its predecessor"
            );
        }
    }

    Ok(())
}

fn validate_all(records: &[CreativeRecord]) -> CampaignResult<()> {
    records.iter().try_for_each(validate_record)
}

/// Source backed by records held in memory. `replace` swaps the whole set
/// and bumps the version.
pub struct InMemorySource {
    current: RwLock<RecordSnapshot>,
}

impl InMemorySource {
    pub fn new(records: Vec<CreativeRecord>) -> CampaignResult<Self> {
        validate_all(&records)?;
        Ok(Self {
            current: RwLock::new(RecordSnapshot::new(1, records)),
        })
    }

    pub fn replace(&self, records: Vec<CreativeRecord>) -> CampaignResult<u64> {
        validate_all(&records)?;
        let mut current = self.current.write();
        let version = current.version + 1;
        *current = RecordSnapshot::new(version, records);
        debug!(version, records = current.len(), "Record set replaced");
        Ok(version)
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }
}

impl RecordSource for InMemorySource {
    fn snapshot(&self) -> CampaignResult<RecordSnapshot> {
        Ok(self.current.read().clone())
    }
}

/// Source that reads a JSON array of records from disk on every snapshot.
/// The version is a hash of the file contents.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFileSource {
    fn snapshot(&self) -> CampaignResult<RecordSnapshot> {
        let bytes = std::fs::read(&self.path)?;
        let records: Vec<CreativeRecord> = serde_json::from_slice(&bytes)?;
        validate_all(&records)?;

        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        let version = hasher.finish();

        metrics::counter!("source.records.loaded").increment(records.len() as u64);
        info!(
            path = %self.path.display(),
            records = records.len(),
            version,
            "Loaded creative records"
        );

        Ok(RecordSnapshot::new(version, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CreativeId, CreativeStatus, Platform};
    use std::io::Write;

    fn record(id: u64, spend: f64) -> CreativeRecord {
        CreativeRecord {
            id: CreativeId::Numeric(id),
            name: format!("creative-{id}"),
            platform: Platform::TikTok,
            agent: "Maria Volkova".into(),
            status: CreativeStatus::Active,
            impressions: 1_000,
            clicks: 50,
            landing_page_views: 40,
            applications_filled: 10,
            calls_scheduled: 8,
            calls_completed: 6,
            leads: 12,
            qualified_leads: 9,
            sales: 2,
            ad_spend: spend,
            revenue: 900.0,
            course_name: "SMM".into(),
            course_price: 450.0,
            reported: None,
        }
    }

    #[test]
    fn test_validate_rejects_bad_money() {
        assert!(validate_record(&record(1, 10.0)).is_ok());

        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            match validate_record(&record(7, bad)).unwrap_err() {
                CampaignError::InvalidRecord { id, reason } => {
                    assert_eq!(id, "7");
                    assert!(reason.contains("ad_spend"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_validate_allows_counter_anomalies() {
        let mut r = record(1, 10.0);
        r.applications_filled = r.landing_page_views + 100;
        assert!(validate_record(&r).is_ok());
    }

    #[test]
    fn test_in_memory_replace_bumps_version() {
        let source = InMemorySource::new(vec![record(1, 10.0)]).unwrap();
        assert_eq!(source.version(), 1);

        let v = source.replace(vec![record(1, 10.0), record(2, 20.0)]).unwrap();
        assert_eq!(v, 2);
        let snap = source.snapshot().unwrap();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.len(), 2);

        assert!(source.replace(vec![record(3, -5.0)]).is_err());
        assert_eq!(source.version(), 2);
    }

    #[test]
    fn test_json_file_source_reads_and_versions_by_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![record(1, 10.0), record(2, 20.0)]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let source = JsonFileSource::new(file.path());
        let first = source.snapshot().unwrap();
        let second = source.snapshot().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first.version, second.version);

        let json = serde_json::to_string(&vec![record(1, 10.0)]).unwrap();
        std::fs::write(file.path(), json).unwrap();
        let third = source.snapshot().unwrap();
        assert_eq!(third.len(), 1);
        assert_ne!(third.version, first.version);
    }

    #[test]
    fn test_json_file_source_errors() {
        let missing = JsonFileSource::new("/definitely/not/here.json");
        assert!(matches!(missing.snapshot(), Err(CampaignError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let broken = JsonFileSource::new(file.path());
        assert!(matches!(broken.snapshot(), Err(CampaignError::Serialization(_))));
    }
}
