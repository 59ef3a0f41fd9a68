//! Persistence of finished analyses and the history queries over them.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::models::{AnalysisDetails, AnalysisReport, WebsiteHistory, WebsiteSummary};

pub mod sqlite;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert the site or bump its `last_analysis`; returns the website id.
    async fn upsert_website(&self, url: &str, analyzed_at: DateTime<Utc>) -> Result<i64>;

    /// Store one run: the analysis row plus a detail row for every domain
    /// that did not fail, all in one transaction.
    async fn insert_analysis(
        &self,
        website_id: i64,
        report: &AnalysisReport,
        report_path: Option<&str>,
    ) -> Result<i64>;

    /// Score trend for one URL, oldest first. `None` for a URL never analyzed.
    async fn query_history(&self, url: &str) -> Result<Option<WebsiteHistory>>;

    async fn analysis_details(&self, analysis_id: i64) -> Result<AnalysisDetails>;

    /// Every analyzed site, most recently analyzed first.
    async fn list_websites(&self) -> Result<Vec<WebsiteSummary>>;
}

/// Persist a finished report: website upsert, then the analysis with its details.
pub async fn save_report(
    store: &dyn AnalysisStore,
    report: &AnalysisReport,
    report_path: Option<&str>,
) -> Result<i64> {
    let website_id = store.upsert_website(&report.url, report.timestamp).await?;
    let analysis_id = store.insert_analysis(website_id, report, report_path).await?;
    tracing::info!(
        "Saved analysis {} for {} (website {})",
        analysis_id,
        report.url,
        website_id
    );
    Ok(analysis_id)
}
