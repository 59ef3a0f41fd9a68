use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::AnalyzerConfig;
use crate::domain::models::{HttpsRating, Score};
use crate::error::AppError;
use crate::service::assembler::PERFORMANCE_FAILED;
use crate::service::performance::FALLBACK_SCORE;
use crate::service::probe::{ProbeProvider, ProbeSet};
use crate::service::SiteAnalyzer;
use crate::test_utils::fixtures::{self, StubFetcher, StubPerformance, StubResources};

fn analyzer(
    fetcher: StubFetcher,
    performance: StubPerformance,
    resources: StubResources,
) -> SiteAnalyzer {
    SiteAnalyzer::with_sources(
        AnalyzerConfig::default(),
        Arc::new(fetcher),
        Arc::new(performance),
        Arc::new(resources),
    )
}

#[tokio::test]
async fn test_analyze_clean_page() {
    let analyzer = analyzer(
        StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML),
        StubPerformance::Score(0.93),
        StubResources::Sample,
    );

    let report = analyzer.analyze("https://example.com").await.unwrap();

    let seo = report.seo.ready().unwrap();
    assert_eq!(seo.headings.h1, 1);
    assert_eq!(seo.images.alt_percentage, 100);
    assert!(seo.links.has_internal_and_external());

    assert_eq!(report.performance.ready().unwrap().score, Score::Value(93));

    let security = report.security.ready().unwrap();
    assert_eq!(security.https.score, HttpsRating::Good);
    assert_eq!(security.security_headers.score, 100);
    assert_eq!(security.cookies.total, 1);
    assert_eq!(security.cookies.score, 100);

    let resources = report.statistics.resources.ready().unwrap();
    assert_eq!(resources.resources.total, 3);
}

#[tokio::test]
async fn test_throwing_performance_source_yields_not_available() {
    let analyzer = analyzer(
        StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML),
        StubPerformance::Failing,
        StubResources::Sample,
    );

    let report = analyzer.analyze("https://example.com").await.unwrap();

    let performance = report.performance.ready().unwrap();
    assert_eq!(performance.score, Score::NotAvailable);
    assert_eq!(performance.metrics.lcp.to_string(), "N/A");
    assert!(report.seo.ready().is_some());
}

#[tokio::test]
async fn test_unavailable_performance_source_uses_fallback_score() {
    let analyzer = analyzer(
        StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML),
        StubPerformance::Unavailable,
        StubResources::Sample,
    );

    let report = analyzer.analyze("https://example.com").await.unwrap();

    assert_eq!(
        report.performance.ready().unwrap().score,
        Score::Value(FALLBACK_SCORE)
    );
}

#[tokio::test]
async fn test_panicking_branch_is_isolated() {
    let analyzer = analyzer(
        StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML),
        StubPerformance::Panicking,
        StubResources::Sample,
    );

    let report = analyzer.analyze("https://example.com").await.unwrap();

    let failure = report.performance.failure().expect("performance slot should fail");
    assert_eq!(failure.error, PERFORMANCE_FAILED);
    assert_eq!(failure.details, "performance probe exploded");
    assert!(report.seo.ready().is_some());
    assert!(report.content.ready().is_some());
    assert!(report.security.ready().is_some());
}

#[tokio::test]
async fn test_resource_failure_keeps_report() {
    let analyzer = analyzer(
        StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML),
        StubPerformance::Score(0.5),
        StubResources::Failing,
    );

    let report = analyzer.analyze("https://example.com").await.unwrap();

    let failure = report.statistics.resources.failure().unwrap();
    assert!(failure.details.contains("browser closed unexpectedly"));
    assert!(report.statistics.dom_elements > 0);
}

#[tokio::test]
async fn test_fetch_failure_is_report_level_error() {
    let analyzer = analyzer(
        StubFetcher::failing(),
        StubPerformance::Score(0.9),
        StubResources::Sample,
    );

    let err = analyzer.analyze("https://unreachable.test").await.unwrap_err();
    assert!(matches!(err, AppError::NetworkError(_)));
}

/// Fails the performance audit of the first analysis only.
struct FlakyProvider {
    opened: AtomicUsize,
}

impl ProbeProvider for FlakyProvider {
    fn open(&self, _url: &str) -> ProbeSet {
        let performance = match self.opened.fetch_add(1, Ordering::SeqCst) {
            0 => StubPerformance::Failing,
            _ => StubPerformance::Score(0.88),
        };
        ProbeSet {
            performance: Arc::new(performance),
            resources: Arc::new(StubResources::Sample),
        }
    }
}

#[tokio::test]
async fn test_each_analysis_opens_fresh_probes() {
    let provider = Arc::new(FlakyProvider {
        opened: AtomicUsize::new(0),
    });
    let analyzer = SiteAnalyzer::with_provider(
        AnalyzerConfig::default(),
        Arc::new(StubFetcher::serving("https://example.com", fixtures::CLEAN_HTML)),
        provider.clone(),
    );

    let first = analyzer.analyze("https://example.com").await.unwrap();
    let second = analyzer.analyze("https://example.com").await.unwrap();

    assert_eq!(provider.opened.load(Ordering::SeqCst), 2);
    assert_eq!(first.performance.ready().unwrap().score, Score::NotAvailable);
    assert_eq!(second.performance.ready().unwrap().score, Score::Value(88));
}
