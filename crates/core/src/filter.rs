//! Dimensional filters applied before aggregation.
//!
//! Selector strings come straight from the caller (CLI flags, config), so
//! parsing is strict: anything unrecognised is rejected with
//! [`CampaignError::InvalidFilter`] instead of silently matching nothing.

use crate::error::{CampaignError, CampaignResult};
use crate::types::{CreativeRecord, Platform};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    pub fn matches(&self, record: &CreativeRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(platform) => record.platform == *platform,
        }
    }
}

impl FromStr for PlatformFilter {
    type Err = CampaignError;

    fn from_str(s: &str) -> CampaignResult<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Platform::parse_known(s)
            .map(Self::Only)
            .ok_or_else(|| CampaignError::invalid_filter("platform", s))
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(platform) => write!(f, "{platform}"),
        }
    }
}

/// Reporting window selector.
///
/// Records carry no timestamp, so every period currently selects every
/// record. The selector is still parsed and validated so callers get the
/// same error behaviour as for platforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl ReportingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    pub fn matches(&self, _record: &CreativeRecord) -> bool {
        true
    }
}

impl FromStr for ReportingPeriod {
    type Err = CampaignError;

    fn from_str(s: &str) -> CampaignResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(CampaignError::invalid_filter("period", s)),
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full filter selection for one dashboard query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricsFilter {
    pub platform: PlatformFilter,
    pub period: ReportingPeriod,
}

impl MetricsFilter {
    pub fn new(platform: PlatformFilter, period: ReportingPeriod) -> Self {
        Self { platform, period }
    }

    pub fn platform(platform: PlatformFilter) -> Self {
        Self {
            platform,
            ..Default::default()
        }
    }

    pub fn parse(platform: &str, period: &str) -> CampaignResult<Self> {
        Ok(Self {
            platform: platform.parse()?,
            period: period.parse()?,
        })
    }

    pub fn matches(&self, record: &CreativeRecord) -> bool {
        self.platform.matches(record) && self.period.matches(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_filter() {
        assert_eq!("all".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
        assert_eq!("ALL".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
        assert_eq!(
            "Facebook".parse::<PlatformFilter>().unwrap(),
            PlatformFilter::Only(Platform::Facebook)
        );
        assert_eq!(
            "tiktok".parse::<PlatformFilter>().unwrap(),
            PlatformFilter::Only(Platform::TikTok)
        );
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let err = "myspace".parse::<PlatformFilter>().unwrap_err();
        assert!(err.is_invalid_filter());
        assert!(err.to_string().contains("myspace"));
    }

    #[test]
    fn test_parse_period() {
        assert_eq!("Quarter".parse::<ReportingPeriod>().unwrap(), ReportingPeriod::Quarter);
        assert_eq!(ReportingPeriod::default(), ReportingPeriod::Month);
        assert!("fortnight".parse::<ReportingPeriod>().unwrap_err().is_invalid_filter());
    }

    #[test]
    fn test_metrics_filter_parse_reports_first_bad_field() {
        let ok = MetricsFilter::parse("youtube", "week").unwrap();
        assert_eq!(ok.platform, PlatformFilter::Only(Platform::YouTube));
        assert_eq!(ok.period, ReportingPeriod::Week);

        match MetricsFilter::parse("all", "decade").unwrap_err() {
            CampaignError::InvalidFilter { kind, value } => {
                assert_eq!(kind, "period");
                assert_eq!(value, "decade");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for filter in [
            PlatformFilter::All,
            PlatformFilter::Only(Platform::YouTube),
            PlatformFilter::Only(Platform::Other),
        ] {
            assert_eq!(filter.to_string().parse::<PlatformFilter>().unwrap(), filter);
        }
    }
}
