//! Raw probe outputs consumed by the analysis pipeline.
//!
//! These are the shapes external collaborators hand over: the fetched page,
//! a Lighthouse-style audit report, and a resource/timing capture.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::Deserialize;

/// Result of the top-level page fetch.
#[derive(Debug, Clone)]
pub struct PageFetch {
    /// URL that was requested (used for link classification).
    pub url: String,
    /// URL after redirects (used for the HTTPS check).
    pub final_url: String,
    pub status_code: u16,
    pub headers: HeaderMap,
    pub body: String,
    pub elapsed_ms: u64,
}

impl PageFetch {
    /// Raw `Set-Cookie` header values, one per cookie.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

// ====== Performance audits ======

/// Outcome of asking a performance source for data.
#[derive(Debug, Clone)]
pub enum PerformanceProbe {
    Audited(AuditReport),
    /// The source is not installed/usable at all; triggers the documented fallback.
    Unavailable,
}

/// Subset of a Lighthouse result (`lhr`) the normalizer reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditReport {
    #[serde(default)]
    pub categories: AuditCategories,
    #[serde(default)]
    pub audits: HashMap<String, Audit>,
}

impl AuditReport {
    pub fn performance_score(&self) -> Option<f64> {
        self.categories.performance.as_ref().and_then(|c| c.score)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditCategories {
    pub performance: Option<AuditCategory>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditCategory {
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub score: Option<f64>,
    pub display_value: Option<String>,
    pub numeric_value: Option<f64>,
    pub details: Option<AuditDetails>,
}

impl Audit {
    pub fn detail_items(&self) -> &[serde_json::Value] {
        self.details
            .as_ref()
            .map(|d| d.items.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditDetails {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

// ====== Resources ======

/// One network response observed while loading the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub url: String,
    pub resource_type: Option<String>,
    pub content_type: Option<String>,
    pub status_code: Option<u16>,
    pub byte_size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavigationTiming {
    pub load_event_end_ms: Option<f64>,
    pub dom_content_loaded_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceProbe {
    pub entries: Vec<ResourceEntry>,
    pub timing: NavigationTiming,
    /// Size of the main document response.
    pub document_size: u64,
}
