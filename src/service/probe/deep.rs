//! Lighthouse-backed probes. Each analysis opens its own [`LighthouseProbe`],
//! whose single CLI run feeds both the performance section and the resource
//! statistics. Nothing is carried over to the next analysis.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tokio::sync::OnceCell;

use super::{PerformanceSource, ProbeProvider, ProbeSet, ResourceSource};
use crate::config::AnalyzerConfig;
use crate::domain::probes::{
    AuditReport, NavigationTiming, PageFetch, PerformanceProbe, ResourceEntry, ResourceProbe,
};

/// Outcome of one CLI run, shared between both probes.
/// `Ok(None)` means the binary is not installed.
type RunOutcome = std::result::Result<Option<Arc<AuditReport>>, String>;

/// Opens a fresh [`LighthouseProbe`] for every analysis.
#[derive(Debug, Clone)]
pub struct LighthouseProvider {
    binary: PathBuf,
    timeout: Duration,
}

impl LighthouseProvider {
    pub fn new(config: &AnalyzerConfig) -> Self {
        tracing::info!("Lighthouse binary: {}", config.lighthouse_bin.display());
        Self {
            binary: config.lighthouse_bin.clone(),
            timeout: config.lighthouse_timeout,
        }
    }
}

impl ProbeProvider for LighthouseProvider {
    fn open(&self, url: &str) -> ProbeSet {
        let probe = Arc::new(LighthouseProbe {
            binary: self.binary.clone(),
            timeout: self.timeout,
            url: url.to_string(),
            shared: OnceCell::new(),
        });
        ProbeSet {
            performance: probe.clone(),
            resources: probe,
        }
    }
}

/// Both probe halves for one URL, backed by at most one CLI run.
pub struct LighthouseProbe {
    binary: PathBuf,
    timeout: Duration,
    url: String,
    shared: OnceCell<RunOutcome>,
}

/// One row of the `network-requests` audit table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkRequestItem {
    #[serde(default)]
    url: String,
    resource_type: Option<String>,
    mime_type: Option<String>,
    status_code: Option<f64>,
    transfer_size: Option<f64>,
}

/// First row of the `metrics` audit.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservedMetrics {
    observed_load: Option<f64>,
    observed_dom_content_loaded: Option<f64>,
}

impl LighthouseProbe {
    /// Audit for `url`. The first caller for the probe's own URL runs the CLI,
    /// the second waits on that run; any other URL gets an unshared run.
    async fn report_for(&self, url: &str) -> RunOutcome {
        if url != self.url {
            return outcome(self.run(url).await);
        }
        self.shared
            .get_or_init(|| async { outcome(self.run(url).await) })
            .await
            .clone()
    }

    async fn run(&self, url: &str) -> Result<Option<AuditReport>> {
        tracing::info!("Running Lighthouse audit for: {}", url);
        let start = std::time::Instant::now();

        let child = Command::new(&self.binary)
            .arg(url)
            .arg("--output=json")
            .arg("--output-path=stdout")
            .arg("--quiet")
            .arg("--only-categories=performance")
            .arg("--chrome-flags=--headless --disable-gpu --no-sandbox")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Lighthouse binary '{}' not found", self.binary.display());
                return Ok(None);
            }
            Err(e) => return Err(e).context("Failed to spawn Lighthouse"),
        };

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("Lighthouse timed out after {:?}", self.timeout))?
            .context("Failed to wait for Lighthouse")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!("Lighthouse failed: {}", stderr);
            anyhow::bail!(
                "Lighthouse analysis failed: {}",
                if stderr.trim().is_empty() { "Unknown error" } else { stderr.trim() }
            );
        }

        let report = parse_report(&output.stdout)?;
        tracing::debug!(
            "Lighthouse finished for {} in {}ms ({} audits)",
            url,
            start.elapsed().as_millis(),
            report.audits.len()
        );
        Ok(Some(report))
    }
}

fn outcome(result: Result<Option<AuditReport>>) -> RunOutcome {
    match result {
        Ok(report) => Ok(report.map(Arc::new)),
        Err(e) => Err(format!("{:#}", e)),
    }
}

fn parse_report(stdout: &[u8]) -> Result<AuditReport> {
    serde_json::from_slice(stdout).context("Failed to parse Lighthouse output")
}

/// Network requests and observed timing from a finished Lighthouse run.
fn resources_from_report(report: &AuditReport, page: &PageFetch) -> ResourceProbe {
    let entries: Vec<ResourceEntry> = report
        .audits
        .get("network-requests")
        .map(|audit| audit.detail_items())
        .unwrap_or_default()
        .iter()
        .filter_map(|item| serde_json::from_value::<NetworkRequestItem>(item.clone()).ok())
        .map(|item| ResourceEntry {
            url: item.url,
            resource_type: item.resource_type.map(|t| t.to_lowercase()),
            content_type: item.mime_type,
            status_code: item.status_code.map(|c| c as u16),
            byte_size: item.transfer_size.map(|s| s.max(0.0) as u64).unwrap_or(0),
        })
        .collect();

    let observed = report
        .audits
        .get("metrics")
        .and_then(|audit| audit.detail_items().first())
        .and_then(|item| serde_json::from_value::<ObservedMetrics>(item.clone()).ok())
        .unwrap_or_default();

    let document_size = entries
        .iter()
        .find(|e| e.resource_type.as_deref() == Some("document"))
        .map(|e| e.byte_size)
        .unwrap_or(page.body.len() as u64);

    ResourceProbe {
        entries,
        timing: NavigationTiming {
            load_event_end_ms: observed.observed_load,
            dom_content_loaded_ms: observed.observed_dom_content_loaded,
        },
        document_size,
    }
}

#[async_trait]
impl PerformanceSource for LighthouseProbe {
    async fn audit(&self, url: &str) -> Result<PerformanceProbe> {
        match self.report_for(url).await {
            Ok(Some(report)) => Ok(PerformanceProbe::Audited(report.as_ref().clone())),
            Ok(None) => Ok(PerformanceProbe::Unavailable),
            Err(message) => Err(anyhow::anyhow!(message)),
        }
    }

    fn name(&self) -> &'static str {
        "lighthouse"
    }
}

#[async_trait]
impl ResourceSource for LighthouseProbe {
    async fn collect(&self, page: &PageFetch) -> Result<ResourceProbe> {
        match self.report_for(&page.url).await {
            Ok(Some(report)) => Ok(resources_from_report(&report, page)),
            Ok(None) => anyhow::bail!("Lighthouse binary '{}' not found", self.binary.display()),
            Err(message) => Err(anyhow::anyhow!(message)),
        }
    }

    fn name(&self) -> &'static str {
        "lighthouse"
    }
}
