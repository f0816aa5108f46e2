//! Creative record model, filters, record sources, errors and configuration
//! shared by the reporting engine and the CLI.

pub mod config;
pub mod error;
pub mod filter;
pub mod source;
pub mod types;

pub use config::AppConfig;
pub use error::{CampaignError, CampaignResult};
pub use filter::{MetricsFilter, PlatformFilter, ReportingPeriod};
pub use source::{InMemorySource, JsonFileSource, RecordSnapshot, RecordSource};
pub use types::{CreativeId, CreativeRecord, CreativeStatus, Platform, PlatformReported};
