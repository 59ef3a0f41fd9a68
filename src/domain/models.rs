//! Report entities - the stable schema every analysis run produces.
//!
//! Everything here is a value object: assembled once per run, never mutated
//! afterwards, serialized as-is for rendering and persistence.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Placeholder rendered wherever a value could not be determined.
pub const NOT_AVAILABLE: &str = "N/A";

// ====== Score ======

/// A 0-100 score, or the "N/A" sentinel when the inputs were unusable.
///
/// Serializes as a bare number or the string `"N/A"`, never as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Value(u8),
    NotAvailable,
}

impl Score {
    /// Round a 0.0-1.0 ratio to an integer percentage.
    pub fn from_ratio(ratio: f64) -> Self {
        Self::Value((ratio * 100.0).round().clamp(0.0, 100.0) as u8)
    }

    /// `round(part / total * 100)`; callers handle `total == 0`.
    pub fn percentage(part: usize, total: usize) -> Self {
        Self::from_ratio(part as f64 / total as f64)
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Score::Value(v) => Some(*v),
            Score::NotAvailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Score::Value(_))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Value(v) => write!(f, "{}", v),
            Score::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Value(v) => serializer.serialize_u8(*v),
            Score::NotAvailable => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Score::Value(v)),
            Raw::Text(s) if s == NOT_AVAILABLE => Ok(Score::NotAvailable),
            Raw::Text(s) => Err(serde::de::Error::custom(format!("invalid score: {}", s))),
        }
    }
}

// ====== Metric ======

/// A formatted metric value (e.g. `"1.2 s"`), or "N/A" when the probe had none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metric(Option<String>);

impl Metric {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn not_available() -> Self {
        Self(None)
    }

    /// Empty display values count as missing.
    pub fn from_display(value: Option<&str>) -> Self {
        Self(value.filter(|v| !v.is_empty()).map(str::to_string))
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(NOT_AVAILABLE))
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_deref().unwrap_or(NOT_AVAILABLE))
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == NOT_AVAILABLE {
            Self(None)
        } else {
            Self(Some(raw))
        })
    }
}

// ====== Section ======

/// Marker stored in place of a domain report whose analysis failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub error: String,
    pub details: String,
}

/// One domain slot of the report: either data or an isolated failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ready(T),
    Failed(SectionFailure),
}

impl<T> Section<T> {
    pub fn failed(error: impl Into<String>, details: impl Into<String>) -> Self {
        Section::Failed(SectionFailure {
            error: error.into(),
            details: details.into(),
        })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&SectionFailure> {
        match self {
            Section::Ready(_) => None,
            Section::Failed(failure) => Some(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

// ====== SEO ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoReport {
    pub meta: MetaInfo,
    pub headings: HeadingCounts,
    pub images: ImageStats,
    pub links: LinkStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    pub title: String,
    pub title_length: usize,
    pub description: String,
    pub description_length: usize,
    pub keywords: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingCounts {
    /// `(tag, count)` pairs in document-level order.
    pub fn levels(&self) -> [(&'static str, usize); 6] {
        [
            ("H1", self.h1),
            ("H2", self.h2),
            ("H3", self.h3),
            ("H4", self.h4),
            ("H5", self.h5),
            ("H6", self.h6),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: usize,
    pub with_alt: usize,
    pub without_alt: usize,
    pub alt_percentage: u8,
}

impl ImageStats {
    pub fn new(total: usize, with_alt: usize) -> Self {
        let alt_percentage = if total > 0 {
            Score::percentage(with_alt, total).value().unwrap_or(0)
        } else {
            0
        };
        Self {
            total,
            with_alt,
            without_alt: total - with_alt,
            alt_percentage,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStats {
    pub internal: usize,
    pub external: usize,
    pub total: usize,
}

impl LinkStats {
    pub fn new(internal: usize, external: usize) -> Self {
        Self {
            internal,
            external,
            total: internal + external,
        }
    }

    pub fn has_internal_and_external(&self) -> bool {
        self.internal > 0 && self.external > 0
    }
}

// ====== Performance ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub score: Score,
    pub metrics: PerformanceMetrics,
    pub opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(rename = "FCP")]
    pub fcp: Metric,
    #[serde(rename = "LCP")]
    pub lcp: Metric,
    #[serde(rename = "TTI")]
    pub tti: Metric,
    #[serde(rename = "TBT")]
    pub tbt: Metric,
    #[serde(rename = "CLS")]
    pub cls: Metric,
    #[serde(rename = "SpeedIndex")]
    pub speed_index: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub name: String,
    pub description: String,
    pub score: Option<f64>,
    /// Estimated savings reported by the audit; `None` renders as unknown.
    pub impact: Option<f64>,
}

// ====== Content ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentReport {
    pub text_stats: TextStats,
    pub media: MediaCounts,
    pub structure: StructureCounts,
    pub responsive_design: ResponsiveDesign,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub word_count: usize,
    pub character_count: usize,
    pub average_word_length: f64,
    pub paragraph_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCounts {
    pub images: usize,
    pub videos: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureCounts {
    pub paragraphs: usize,
    pub lists: usize,
    pub tables: usize,
}

/// Markup signals for mobile readiness. Only inline `<style>` blocks are
/// scanned for `@media` rules; linked stylesheets are not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsiveDesign {
    pub viewport_meta: bool,
    pub media_queries: bool,
    pub score: ResponsiveRating,
}

impl ResponsiveDesign {
    pub fn new(viewport_meta: bool, media_queries: bool) -> Self {
        let score = match (viewport_meta, media_queries) {
            (true, true) => ResponsiveRating::Good,
            (false, false) => ResponsiveRating::Poor,
            _ => ResponsiveRating::Fair,
        };
        Self {
            viewport_meta,
            media_queries,
            score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponsiveRating {
    #[serde(rename = "Gut")]
    Good,
    #[serde(rename = "Mittelmäßig")]
    Fair,
    #[serde(rename = "Schlecht")]
    Poor,
}

impl ResponsiveRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponsiveRating::Good => "Gut",
            ResponsiveRating::Fair => "Mittelmäßig",
            ResponsiveRating::Poor => "Schlecht",
        }
    }
}

// ====== Security ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub https: HttpsStatus,
    pub security_headers: SecurityHeaders,
    pub cookies: CookieStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpsRating {
    #[serde(rename = "Gut")]
    Good,
    #[serde(rename = "Schlecht")]
    Poor,
}

impl HttpsRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpsRating::Good => "Gut",
            HttpsRating::Poor => "Schlecht",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpsStatus {
    pub enabled: bool,
    pub score: HttpsRating,
}

/// The six checked response headers. Absent headers stay in the map as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeaderValues {
    #[serde(rename = "Strict-Transport-Security")]
    pub strict_transport_security: Option<String>,
    #[serde(rename = "Content-Security-Policy")]
    pub content_security_policy: Option<String>,
    #[serde(rename = "X-XSS-Protection")]
    pub x_xss_protection: Option<String>,
    #[serde(rename = "X-Frame-Options")]
    pub x_frame_options: Option<String>,
    #[serde(rename = "X-Content-Type-Options")]
    pub x_content_type_options: Option<String>,
    #[serde(rename = "Referrer-Policy")]
    pub referrer_policy: Option<String>,
}

impl SecurityHeaderValues {
    pub const NAMES: [&'static str; 6] = [
        "Strict-Transport-Security",
        "Content-Security-Policy",
        "X-XSS-Protection",
        "X-Frame-Options",
        "X-Content-Type-Options",
        "Referrer-Policy",
    ];

    /// `(header name, value)` pairs in the fixed check order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            (Self::NAMES[0], self.strict_transport_security.as_deref()),
            (Self::NAMES[1], self.content_security_policy.as_deref()),
            (Self::NAMES[2], self.x_xss_protection.as_deref()),
            (Self::NAMES[3], self.x_frame_options.as_deref()),
            (Self::NAMES[4], self.x_content_type_options.as_deref()),
            (Self::NAMES[5], self.referrer_policy.as_deref()),
        ]
    }

    pub fn implemented(&self) -> usize {
        self.entries().iter().filter(|(_, v)| v.is_some()).count()
    }

    pub fn missing_names(&self) -> Vec<&'static str> {
        self.entries()
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeaders {
    pub headers: SecurityHeaderValues,
    pub implemented: usize,
    pub missing: usize,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieStats {
    pub total: usize,
    pub secure: usize,
    pub http_only: usize,
    pub same_site: usize,
    pub score: u8,
}

// ====== Statistics ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub resources: Section<ResourceStatistics>,
    pub html_size: String,
    pub dom_elements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatistics {
    pub load_time: Metric,
    pub dom_content_loaded: Metric,
    pub page_size: String,
    pub total_size: String,
    pub resources: ResourceBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBreakdown {
    pub total: usize,
    pub by_type: BTreeMap<String, ResourceTypeTotals>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTypeTotals {
    pub count: usize,
    pub size: u64,
}

// ====== Root aggregate ======

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: u16,
    /// Wall-clock time of the top-level fetch.
    #[serde(rename = "loadTime")]
    pub load_time_ms: u64,
    pub seo: Section<SeoReport>,
    pub performance: Section<PerformanceReport>,
    pub content: Section<ContentReport>,
    pub security: Section<SecurityReport>,
    pub statistics: Statistics,
}

impl AnalysisReport {
    pub fn load_time_label(&self) -> String {
        format!("{}ms", self.load_time_ms)
    }
}

/// Denormalized score snapshot stored with every analysis for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub seo: Score,
    pub performance: Score,
    pub security: Score,
}

// ====== Insights ======

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SEO")]
    Seo,
    Performance,
    Content,
    Security,
    Mobile,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Seo => "SEO",
            Category::Performance => "Performance",
            Category::Content => "Content",
            Category::Security => "Security",
            Category::Mobile => "Mobile",
            Category::General => "General",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Normal,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Normal => "Normal",
        }
    }
}

/// One generated statement (insight or recommendation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    /// Sub-items rendered as an indented list under `text`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
    pub category: Category,
    pub priority: Priority,
}

// ====== History ======

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteHistory {
    pub url: String,
    pub analyses: Vec<HistoricalAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalAnalysis {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub scores: HistoricalScores,
}

/// Stored snapshots; `None` where the domain failed or was "N/A".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoricalScores {
    pub seo: Option<i64>,
    pub performance: Option<i64>,
    pub security: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebsiteSummary {
    pub id: i64,
    pub url: String,
    pub first_analysis: DateTime<Utc>,
    pub last_analysis: DateTime<Utc>,
    pub analysis_count: i64,
    pub latest_scores: HistoricalScores,
}

/// Flattened per-domain rows of one stored analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDetails {
    pub id: i64,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub report_path: Option<String>,
    pub seo: Option<StoredSeo>,
    pub performance: Option<StoredPerformance>,
    pub content: Option<StoredContent>,
    pub security: Option<StoredSecurity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSeo {
    pub title_length: i64,
    pub description_length: i64,
    pub h1_count: i64,
    pub alt_image_percentage: f64,
    pub internal_links: i64,
    pub external_links: i64,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPerformance {
    pub lighthouse_score: Option<i64>,
    pub fcp: Option<String>,
    pub lcp: Option<String>,
    pub tti: Option<String>,
    pub tbt: Option<String>,
    pub cls: Option<String>,
    pub load_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredContent {
    pub word_count: i64,
    pub paragraph_count: i64,
    pub image_count: i64,
    pub video_count: i64,
    pub list_count: i64,
    pub table_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSecurity {
    pub https_enabled: bool,
    pub security_headers_score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_serializes_as_number_or_sentinel() {
        assert_eq!(serde_json::to_string(&Score::Value(80)).unwrap(), "80");
        assert_eq!(serde_json::to_string(&Score::NotAvailable).unwrap(), "\"N/A\"");

        let parsed: Score = serde_json::from_str("\"N/A\"").unwrap();
        assert_eq!(parsed, Score::NotAvailable);
        assert!(serde_json::from_str::<Score>("\"soon\"").is_err());
    }

    #[test]
    fn image_stats_guard_against_zero_total() {
        let stats = ImageStats::new(0, 0);
        assert_eq!(stats.alt_percentage, 0);
        assert_eq!(stats.without_alt, 0);

        let stats = ImageStats::new(3, 2);
        assert_eq!(stats.without_alt, 1);
        assert_eq!(stats.alt_percentage, 67);
    }

    #[test]
    fn failed_section_serializes_as_error_marker() {
        let section: Section<ContentReport> = Section::failed("Inhaltsanalyse fehlgeschlagen", "boom");
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["error"], "Inhaltsanalyse fehlgeschlagen");
        assert_eq!(json["details"], "boom");
    }

    #[test]
    fn header_values_keep_absent_headers_as_null() {
        let values = SecurityHeaderValues {
            x_frame_options: Some("DENY".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&values).unwrap();
        let map = json.as_object().unwrap();

        assert_eq!(map.len(), 6);
        assert!(map["Referrer-Policy"].is_null());
        assert_eq!(map["X-Frame-Options"], "DENY");
        assert_eq!(values.implemented(), 1);
        assert_eq!(values.missing_names().len(), 5);
    }

    #[test]
    fn responsive_rating_needs_both_signals_for_good() {
        assert_eq!(ResponsiveDesign::new(true, true).score, ResponsiveRating::Good);
        assert_eq!(ResponsiveDesign::new(true, false).score, ResponsiveRating::Fair);
        assert_eq!(ResponsiveDesign::new(false, true).score, ResponsiveRating::Fair);
        assert_eq!(ResponsiveDesign::new(false, false).score, ResponsiveRating::Poor);

        let json = serde_json::to_value(ResponsiveDesign::new(true, false)).unwrap();
        assert_eq!(json["viewportMeta"], true);
        assert_eq!(json["mediaQueries"], false);
        assert_eq!(json["score"], "Mittelmäßig");
    }

    #[test]
    fn report_serializes_load_time_key() {
        let json = serde_json::to_value(crate::test_utils::fixtures::clean_report()).unwrap();
        assert_eq!(json["loadTime"], 230);
        assert!(json.get("loadTimeMs").is_none());
        assert_eq!(json["statusCode"], 200);
    }
}
