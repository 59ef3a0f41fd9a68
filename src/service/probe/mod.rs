//! Probe sources feeding the analysis pipeline.
//!
//! Two strategies exist:
//! - **Light**: markup-only resource listing, no performance audit
//! - **Deep**: one Lighthouse run per analysis, shared by the performance and
//!   resource probes
//!
//! Both plug into [`SiteAnalyzer`](crate::service::SiteAnalyzer) through a
//! [`ProbeProvider`], so tests can substitute stubs.

mod deep;
mod light;

pub use deep::{LighthouseProbe, LighthouseProvider};
pub use light::{FallbackPerformanceSource, MarkupResourceSource};

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::probes::{PageFetch, PerformanceProbe, ResourceProbe};
use crate::error::Result;

/// Fetches the top-level document. Errors here abort the whole analysis.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageFetch>;
}

/// Supplies audit data for the performance section.
#[async_trait]
pub trait PerformanceSource: Send + Sync {
    /// `Ok(PerformanceProbe::Unavailable)` when the source is not installed;
    /// `Err` when it ran and failed.
    async fn audit(&self, url: &str) -> anyhow::Result<PerformanceProbe>;

    fn name(&self) -> &'static str;
}

/// Supplies the resource/timing capture for the statistics section.
#[async_trait]
pub trait ResourceSource: Send + Sync {
    async fn collect(&self, page: &PageFetch) -> anyhow::Result<ResourceProbe>;

    fn name(&self) -> &'static str;
}

/// The probe pair used for a single analysis.
#[derive(Clone)]
pub struct ProbeSet {
    pub performance: Arc<dyn PerformanceSource>,
    pub resources: Arc<dyn ResourceSource>,
}

/// Hands out the probes for each analysis; state a provider's probes keep
/// lives only as long as the returned set.
pub trait ProbeProvider: Send + Sync {
    fn open(&self, url: &str) -> ProbeSet;
}

/// Stateless sources reused by every analysis.
impl ProbeProvider for ProbeSet {
    fn open(&self, _url: &str) -> ProbeSet {
        self.clone()
    }
}
