use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Divide `numerator` by `denominator`, yielding 0 unless the denominator is
/// strictly positive. Every ratio the engine reports goes through here.
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Creative identifier as delivered by the upstream ad account: either a
/// numeric id or an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreativeId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for CreativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<u64> for CreativeId {
    fn from(id: u64) -> Self {
        Self::Numeric(id)
    }
}

impl From<&str> for CreativeId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// Ad platform a creative runs on. Labels other than the three tracked
/// platforms collapse into `Other` on ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Facebook,
    YouTube,
    TikTok,
    Other,
}

impl Platform {
    /// Fixed presentation order used by every breakdown.
    pub const ALL: [Platform; 4] = [
        Platform::Facebook,
        Platform::YouTube,
        Platform::TikTok,
        Platform::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Other => "Other",
        }
    }

    /// Lenient mapping used when reading records.
    pub fn from_label(label: &str) -> Self {
        Self::parse_known(label).unwrap_or(Self::Other)
    }

    /// Strict mapping: `None` for anything that is not a platform name or
    /// the literal `other`.
    pub fn parse_known(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "facebook" => Some(Self::Facebook),
            "youtube" => Some(Self::YouTube),
            "tiktok" => Some(Self::TikTok),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreativeStatus {
    Active,
    Paused,
    Testing,
    Stopped,
}

/// Figures reported by the ad platform itself. These can legitimately differ
/// from the values computed from raw counters (tracking discrepancies) and
/// are never used in place of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformReported {
    #[serde(default)]
    pub ctr: Option<f64>,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub cpm: Option<f64>,
}

/// One advertising creative's observed performance over its lifetime to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeRecord {
    pub id: CreativeId,
    pub name: String,
    pub platform: Platform,
    /// Ad manager who owns the creative.
    pub agent: String,
    pub status: CreativeStatus,

    // Traffic
    pub impressions: u64,
    pub clicks: u64,
    pub landing_page_views: u64,
    pub applications_filled: u64,
    pub calls_scheduled: u64,
    pub calls_completed: u64,

    // Outcomes
    pub leads: u64,
    #[serde(default)]
    pub qualified_leads: u64,
    pub sales: u64,

    // Money
    pub ad_spend: f64,
    pub revenue: f64,

    pub course_name: String,
    pub course_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported: Option<PlatformReported>,
}

impl CreativeRecord {
    /// Click-through rate, percent.
    pub fn ctr(&self) -> f64 {
        guarded_ratio(self.clicks as f64, self.impressions as f64) * 100.0
    }

    pub fn cpc(&self) -> f64 {
        guarded_ratio(self.ad_spend, self.clicks as f64)
    }

    /// Cost per thousand impressions.
    pub fn cpm(&self) -> f64 {
        guarded_ratio(self.ad_spend, self.impressions as f64) * 1000.0
    }

    pub fn cpl(&self) -> f64 {
        guarded_ratio(self.ad_spend, self.leads as f64)
    }

    pub fn cpa(&self) -> f64 {
        guarded_ratio(self.ad_spend, self.sales as f64)
    }

    /// Return on investment, percent.
    pub fn roi(&self) -> f64 {
        guarded_ratio(self.revenue - self.ad_spend, self.ad_spend) * 100.0
    }

    pub fn roas(&self) -> f64 {
        guarded_ratio(self.revenue, self.ad_spend)
    }

    /// Lead-to-sale conversion, percent.
    pub fn conversion_rate(&self) -> f64 {
        guarded_ratio(self.sales as f64, self.leads as f64) * 100.0
    }

    /// Difference between the platform-reported CTR and the computed one,
    /// when the platform supplied a figure.
    pub fn ctr_drift(&self) -> Option<f64> {
        self.reported
            .as_ref()
            .and_then(|r| r.ctr)
            .map(|reported| reported - self.ctr())
    }

    /// Funnel counters in stage order, starting at impressions.
    pub fn funnel_counts(&self) -> [u64; 7] {
        [
            self.impressions,
            self.clicks,
            self.landing_page_views,
            self.applications_filled,
            self.calls_scheduled,
            self.calls_completed,
            self.sales,
        ]
    }
}
