//! SiteAnalyzer - fetches a page and runs every domain analysis concurrently.
//!
//! Each branch runs in its own task so a panic or error stays in its slot.
//! The DOM-bound branches parse their own copy of the document on the
//! blocking pool, since `scraper::Html` is not `Send`.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use scraper::Html;
use tokio::task::JoinError;

use crate::config::{AnalyzerConfig, AuditMode};
use crate::domain::models::{AnalysisReport, PerformanceReport};
use crate::domain::probes::PageFetch;
use crate::error::Result;
use crate::extractor::PageExtractor;
use crate::service::assembler::{BranchOutcomes, BranchResult, ReportAssembler};
use crate::service::http::HttpFetcher;
use crate::service::performance;
use crate::service::probe::{
    FallbackPerformanceSource, LighthouseProvider, MarkupResourceSource, PageFetcher,
    PerformanceSource, ProbeProvider, ProbeSet, ResourceSource,
};
use crate::service::security::evaluate_security;
use crate::service::statistics::summarize_resources;

pub struct SiteAnalyzer {
    config: AnalyzerConfig,
    fetcher: Arc<dyn PageFetcher>,
    probes: Arc<dyn ProbeProvider>,
}

impl SiteAnalyzer {
    /// Wire the probe sources for the configured mode.
    pub fn new(config: AnalyzerConfig) -> anyhow::Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config)?);
        let probes: Arc<dyn ProbeProvider> = match config.mode {
            AuditMode::Light => Arc::new(ProbeSet {
                performance: Arc::new(FallbackPerformanceSource),
                resources: Arc::new(MarkupResourceSource),
            }),
            AuditMode::Deep => Arc::new(LighthouseProvider::new(&config)),
        };

        Ok(Self::with_provider(config, fetcher, probes))
    }

    /// Fixed sources shared by every analysis.
    pub fn with_sources(
        config: AnalyzerConfig,
        fetcher: Arc<dyn PageFetcher>,
        performance: Arc<dyn PerformanceSource>,
        resources: Arc<dyn ResourceSource>,
    ) -> Self {
        let probes = Arc::new(ProbeSet {
            performance,
            resources,
        });
        Self::with_provider(config, fetcher, probes)
    }

    pub fn with_provider(
        config: AnalyzerConfig,
        fetcher: Arc<dyn PageFetcher>,
        probes: Arc<dyn ProbeProvider>,
    ) -> Self {
        Self {
            config,
            fetcher,
            probes,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze one URL. Only a failed page fetch is an error; every other
    /// failure is recorded in the affected report section.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport> {
        let probes = self.probes.open(url);
        tracing::info!(
            "Starting analysis of {} (mode: {}, performance: {}, resources: {})",
            url,
            self.config.mode.as_str(),
            probes.performance.name(),
            probes.resources.name()
        );

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => Arc::new(page),
            Err(e) => {
                tracing::error!("Fetching {} failed: {}", url, e);
                return Err(e);
            }
        };

        let seo = spawn_dom(&page, |html, page| PageExtractor::extract_seo(html, &page.url));
        let content = spawn_dom(&page, |html, _| PageExtractor::extract_content(html));
        let dom_elements = spawn_dom(&page, |html, _| PageExtractor::count_elements(html));
        let security = {
            let page = Arc::clone(&page);
            tokio::task::spawn_blocking(move || {
                evaluate_security(&page.headers, &page.set_cookies(), &page.final_url)
            })
        };
        let performance = {
            let source = Arc::clone(&probes.performance);
            let url = url.to_string();
            let timeout = self.config.lighthouse_timeout;
            tokio::spawn(async move { audit_performance(source, &url, timeout).await })
        };
        let resources = {
            let source = Arc::clone(&probes.resources);
            let page = Arc::clone(&page);
            let timeout = self.config.lighthouse_timeout;
            tokio::spawn(async move {
                let probe = bounded(timeout, source.collect(&page)).await?;
                Ok::<_, String>(summarize_resources(&probe))
            })
        };

        let (seo, content, dom_elements, security, performance, resources) =
            tokio::join!(seo, content, dom_elements, security, performance, resources);

        let outcomes = BranchOutcomes {
            seo: joined(seo),
            performance: joined(performance),
            content: joined(content),
            security: joined(security),
            resources: joined(resources).and_then(|inner| inner),
            dom_elements: joined(dom_elements).unwrap_or_else(|details| {
                tracing::warn!("Counting DOM elements failed: {}", details);
                0
            }),
        };

        let report = ReportAssembler::assemble(&page, outcomes, Utc::now());
        tracing::info!(
            "Finished analysis of {} (status {}, {})",
            report.url,
            report.status_code,
            report.load_time_label()
        );
        Ok(report)
    }
}

/// Parse the fetched body on the blocking pool and run `extract` over it.
fn spawn_dom<T, F>(page: &Arc<PageFetch>, extract: F) -> tokio::task::JoinHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&Html, &PageFetch) -> T + Send + 'static,
{
    let page = Arc::clone(page);
    tokio::task::spawn_blocking(move || {
        let html = Html::parse_document(&page.body);
        extract(&html, &page)
    })
}

/// A failing or slow source degrades to "N/A" rather than failing the section.
async fn audit_performance(
    source: Arc<dyn PerformanceSource>,
    url: &str,
    timeout: std::time::Duration,
) -> PerformanceReport {
    let probe = match tokio::time::timeout(timeout, source.audit(url)).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "{} did not answer within {:?}",
            source.name(),
            timeout
        )),
    };
    performance::normalize(probe)
}

async fn bounded<T>(
    timeout: std::time::Duration,
    future: impl Future<Output = anyhow::Result<T>>,
) -> BranchResult<T> {
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(_) => Err(format!("timed out after {:?}", timeout)),
    }
}

fn joined<T>(result: std::result::Result<T, JoinError>) -> BranchResult<T> {
    result.map_err(panic_details)
}

fn panic_details(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        if let Some(message) = payload.downcast_ref::<&str>() {
            return (*message).to_string();
        }
        if let Some(message) = payload.downcast_ref::<String>() {
            return message.clone();
        }
        return "analysis panicked".to_string();
    }
    error.to_string()
}
