//! Score calculation. Every function here is pure over the assembled report.

use crate::domain::models::{
    AnalysisReport, PerformanceReport, Score, ScoreCard, Section, SecurityReport, SeoReport,
};

pub const TITLE_LENGTH_RANGE: (usize, usize) = (30, 60);
pub const DESCRIPTION_LENGTH_RANGE: (usize, usize) = (50, 160);
pub const MIN_ALT_PERCENTAGE: u8 = 80;

/// Outcome of the five SEO checks, in scoring order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeoChecks {
    pub title_length_ok: bool,
    pub description_length_ok: bool,
    pub single_h1: bool,
    pub alt_coverage_ok: bool,
    pub link_mix: bool,
}

impl SeoChecks {
    pub fn evaluate(seo: &SeoReport) -> Self {
        let (title_min, title_max) = TITLE_LENGTH_RANGE;
        let (desc_min, desc_max) = DESCRIPTION_LENGTH_RANGE;

        Self {
            title_length_ok: !seo.meta.title.is_empty()
                && (title_min..=title_max).contains(&seo.meta.title_length),
            description_length_ok: !seo.meta.description.is_empty()
                && (desc_min..=desc_max).contains(&seo.meta.description_length),
            single_h1: seo.headings.h1 == 1,
            alt_coverage_ok: seo.images.alt_percentage >= MIN_ALT_PERCENTAGE,
            link_mix: seo.links.has_internal_and_external(),
        }
    }

    pub fn as_array(&self) -> [bool; 5] {
        [
            self.title_length_ok,
            self.description_length_ok,
            self.single_h1,
            self.alt_coverage_ok,
            self.link_mix,
        ]
    }

    pub fn passed(&self) -> usize {
        self.as_array().iter().filter(|passed| **passed).count()
    }
}

pub fn seo_score(seo: &Section<SeoReport>) -> Score {
    match seo.ready() {
        Some(report) => {
            let checks = SeoChecks::evaluate(report);
            Score::percentage(checks.passed(), checks.as_array().len())
        }
        None => Score::NotAvailable,
    }
}

pub fn performance_score(performance: &Section<PerformanceReport>) -> Score {
    performance
        .ready()
        .map(|report| report.score)
        .unwrap_or(Score::NotAvailable)
}

/// Security headline score is the header coverage score.
pub fn security_score(security: &Section<SecurityReport>) -> Score {
    security
        .ready()
        .map(|report| Score::Value(report.security_headers.score))
        .unwrap_or(Score::NotAvailable)
}

/// `round(implemented / total * 100)`.
pub fn header_score(implemented: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    Score::percentage(implemented, total).value().unwrap_or(0)
}

/// 100 when no cookies were set, else the share of set flags over `3 * total`.
pub fn cookie_score(total: usize, secure: usize, http_only: usize, same_site: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    Score::percentage(secure + http_only + same_site, total * 3)
        .value()
        .unwrap_or(0)
}

pub fn score_card(report: &AnalysisReport) -> ScoreCard {
    ScoreCard {
        seo: seo_score(&report.seo),
        performance: performance_score(&report.performance),
        security: security_score(&report.security),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{HeadingCounts, ImageStats, LinkStats, MetaInfo};

    fn seo(title: &str, description: &str, h1: usize, images: ImageStats, links: LinkStats) -> SeoReport {
        SeoReport {
            meta: MetaInfo {
                title: title.to_string(),
                title_length: title.chars().count(),
                description: description.to_string(),
                description_length: description.chars().count(),
                keywords: String::new(),
            },
            headings: HeadingCounts {
                h1,
                ..Default::default()
            },
            images,
            links,
        }
    }

    #[test]
    fn test_perfect_page_scores_100() {
        let report = seo(
            "A well sized page title for search results",
            "A description that is long enough to pass the fifty character minimum.",
            1,
            ImageStats::new(4, 4),
            LinkStats::new(3, 1),
        );
        assert_eq!(seo_score(&Section::Ready(report)), Score::Value(100));
    }

    #[test]
    fn test_short_title_and_missing_description_fail() {
        let report = seo("Home", "", 1, ImageStats::new(1, 1), LinkStats::new(0, 0));
        let checks = SeoChecks::evaluate(&report);

        assert!(!checks.title_length_ok);
        assert!(!checks.description_length_ok);
        assert!(checks.single_h1);
        assert!(checks.alt_coverage_ok);
        assert!(!checks.link_mix);
        assert_eq!(seo_score(&Section::Ready(report)), Score::Value(40));
    }

    #[test]
    fn test_no_links_does_not_panic() {
        let report = seo("x", "", 1, ImageStats::new(2, 2), LinkStats::default());
        let checks = SeoChecks::evaluate(&report);
        assert!(!checks.link_mix);
    }

    #[test]
    fn test_failed_section_is_not_available() {
        let section: Section<SeoReport> = Section::failed("SEO-Analyse fehlgeschlagen", "boom");
        assert_eq!(seo_score(&section), Score::NotAvailable);

        let security: Section<SecurityReport> = Section::failed("x", "y");
        assert_eq!(security_score(&security), Score::NotAvailable);
    }

    #[test]
    fn test_header_and_cookie_scores() {
        assert_eq!(header_score(6, 6), 100);
        assert_eq!(header_score(0, 6), 0);
        assert_eq!(header_score(1, 6), 17);
        assert_eq!(header_score(3, 6), 50);

        assert_eq!(cookie_score(0, 0, 0, 0), 100);
        assert_eq!(cookie_score(2, 2, 1, 0), 50);
        assert_eq!(cookie_score(1, 1, 1, 1), 100);
    }

    #[test]
    fn test_element_order_does_not_change_seo_score() {
        use crate::extractor::PageExtractor;
        use scraper::Html;

        let ordered = Html::parse_document(
            r#"<html><head>
                <title>Example Domain - A well sized page title</title>
                <meta name="description" content="A meta description that is comfortably longer than fifty characters.">
            </head><body>
                <h1>Example</h1>
                <img src="/a.png" alt="A"><img src="/b.png">
                <a href="/about">About</a><a href="https://www.iana.org">IANA</a>
            </body></html>"#,
        );
        let shuffled = Html::parse_document(
            r#"<html><head>
                <meta name="description" content="A meta description that is comfortably longer than fifty characters.">
                <title>Example Domain - A well sized page title</title>
            </head><body>
                <a href="https://www.iana.org">IANA</a>
                <img src="/b.png">
                <a href="/about">About</a>
                <img src="/a.png" alt="A">
                <h1>Example</h1>
            </body></html>"#,
        );

        let first = PageExtractor::extract_seo(&ordered, "https://example.com");
        let second = PageExtractor::extract_seo(&shuffled, "https://example.com");

        assert_eq!(first, second);
        let score = seo_score(&Section::Ready(first));
        assert_eq!(score, seo_score(&Section::Ready(second)));
        // alt coverage of 50% is the only failing check
        assert_eq!(score, Score::Value(80));
    }
}
