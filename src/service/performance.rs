//! Normalizes whatever a performance source returned into the fixed
//! `PerformanceReport` shape.

use crate::domain::models::{Metric, Opportunity, PerformanceMetrics, PerformanceReport, Score};
use crate::domain::probes::{Audit, AuditReport, PerformanceProbe};

/// Score reported when no performance source is installed at all.
pub const FALLBACK_SCORE: u8 = 50;

/// Opportunity audits worth surfacing, in report order.
pub const OPPORTUNITY_AUDITS: [&str; 11] = [
    "render-blocking-resources",
    "unused-javascript",
    "unused-css-rules",
    "offscreen-images",
    "unminified-css",
    "unminified-javascript",
    "uses-optimized-images",
    "uses-webp-images",
    "uses-text-compression",
    "uses-responsive-images",
    "server-response-time",
];

const OPPORTUNITY_THRESHOLD: f64 = 0.9;

pub fn normalize(probe: anyhow::Result<PerformanceProbe>) -> PerformanceReport {
    match probe {
        Ok(PerformanceProbe::Audited(report)) => from_audit(&report),
        Ok(PerformanceProbe::Unavailable) => {
            tracing::info!("No performance source available, using fallback score");
            fallback_report()
        }
        Err(e) => {
            tracing::warn!("Performance audit failed: {:#}", e);
            not_available_report()
        }
    }
}

pub fn fallback_report() -> PerformanceReport {
    PerformanceReport {
        score: Score::Value(FALLBACK_SCORE),
        metrics: PerformanceMetrics::default(),
        opportunities: Vec::new(),
    }
}

pub fn not_available_report() -> PerformanceReport {
    PerformanceReport {
        score: Score::NotAvailable,
        metrics: PerformanceMetrics::default(),
        opportunities: Vec::new(),
    }
}

/// A report without a performance category score is treated as a failed run.
pub fn from_audit(report: &AuditReport) -> PerformanceReport {
    let Some(score) = report.performance_score() else {
        tracing::warn!("Audit report has no performance category score");
        return not_available_report();
    };

    let metric = |id: &str| {
        Metric::from_display(
            report
                .audits
                .get(id)
                .and_then(|audit| audit.display_value.as_deref()),
        )
    };

    PerformanceReport {
        score: Score::from_ratio(score),
        metrics: PerformanceMetrics {
            fcp: metric("first-contentful-paint"),
            lcp: metric("largest-contentful-paint"),
            tti: metric("interactive"),
            tbt: metric("total-blocking-time"),
            cls: metric("cumulative-layout-shift"),
            speed_index: metric("speed-index"),
        },
        opportunities: extract_opportunities(report),
    }
}

fn extract_opportunities(report: &AuditReport) -> Vec<Opportunity> {
    OPPORTUNITY_AUDITS
        .iter()
        .filter_map(|id| report.audits.get(*id))
        .filter(|audit| is_opportunity(audit))
        .map(|audit| Opportunity {
            name: audit.title.clone(),
            description: audit.description.clone(),
            score: audit.score,
            impact: audit.numeric_value.filter(|v| *v != 0.0),
        })
        .collect()
}

fn is_opportunity(audit: &Audit) -> bool {
    audit.score.unwrap_or(0.0) < OPPORTUNITY_THRESHOLD && !audit.detail_items().is_empty()
}
