//! ReportAssembler - merges the per-domain branch outcomes into one report.

use chrono::{DateTime, Utc};

use crate::domain::models::{
    AnalysisReport, ContentReport, PerformanceReport, ResourceStatistics, Section, SecurityReport,
    SeoReport, Statistics,
};
use crate::domain::probes::PageFetch;
use crate::service::statistics::format_bytes;

pub const SEO_FAILED: &str = "SEO-Analyse fehlgeschlagen";
pub const PERFORMANCE_FAILED: &str = "Performance-Analyse fehlgeschlagen";
pub const CONTENT_FAILED: &str = "Inhaltsanalyse fehlgeschlagen";
pub const SECURITY_FAILED: &str = "Sicherheitsanalyse fehlgeschlagen";
pub const RESOURCES_FAILED: &str = "Ressourcen-Analyse fehlgeschlagen";

/// Result of one branch; `Err` carries the failure details.
pub type BranchResult<T> = std::result::Result<T, String>;

#[derive(Debug, Clone)]
pub struct BranchOutcomes {
    pub seo: BranchResult<SeoReport>,
    pub performance: BranchResult<PerformanceReport>,
    pub content: BranchResult<ContentReport>,
    pub security: BranchResult<SecurityReport>,
    pub resources: BranchResult<ResourceStatistics>,
    /// Element count of the fetched document; 0 when counting failed.
    pub dom_elements: usize,
}

pub struct ReportAssembler;

impl ReportAssembler {
    pub fn assemble(page: &PageFetch, outcomes: BranchOutcomes, timestamp: DateTime<Utc>) -> AnalysisReport {
        AnalysisReport {
            url: page.url.clone(),
            timestamp,
            status_code: page.status_code,
            load_time_ms: page.elapsed_ms,
            seo: section(outcomes.seo, SEO_FAILED),
            performance: section(outcomes.performance, PERFORMANCE_FAILED),
            content: section(outcomes.content, CONTENT_FAILED),
            security: section(outcomes.security, SECURITY_FAILED),
            statistics: Statistics {
                resources: section(outcomes.resources, RESOURCES_FAILED),
                html_size: format_bytes(page.body.len() as u64),
                dom_elements: outcomes.dom_elements,
            },
        }
    }
}

fn section<T>(outcome: BranchResult<T>, label: &str) -> Section<T> {
    match outcome {
        Ok(value) => Section::Ready(value),
        Err(details) => {
            tracing::warn!("{}: {}", label, details);
            Section::failed(label, details)
        }
    }
}
