//! Rule-based insights and recommendations.
//!
//! Rules run in a fixed order (SEO, performance, security, content, mobile) and each
//! contributes at most one message, so the output is deterministic for a given
//! report. Free text of unknown origin can be tagged with [`detect_category`]
//! and [`determine_priority`].

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::models::{
    AnalysisReport, Category, Insight, Metric, PerformanceReport, Priority, ResponsiveDesign, Score,
    SecurityReport, SeoReport,
};
use crate::service::scoring::{DESCRIPTION_LENGTH_RANGE, TITLE_LENGTH_RANGE};

pub const NO_ISSUES_INSIGHT: &str = "Keine kritischen Probleme gefunden. Die Website ist gut optimiert.";
pub const NO_RECOMMENDATIONS: &str = "Keine spezifischen Empfehlungen notwendig.";

const MIN_TITLE_LENGTH: usize = 10;
const MIN_DESCRIPTION_LENGTH: usize = 50;
const MIN_WORD_COUNT: usize = 300;
const SEVERE_PERFORMANCE: u8 = 50;
const IMPROVABLE_PERFORMANCE: u8 = 80;
const RECOMMEND_PERFORMANCE: u8 = 70;
const MIN_HEADER_SCORE: u8 = 50;
const MAX_LCP_SECONDS: f64 = 2.5;
const MAX_CLS: f64 = 0.1;

impl Insight {
    pub fn new(text: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            text: text.into(),
            details: Vec::new(),
            category,
            priority,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
}

/// Key findings for the report summary.
pub fn generate_insights(report: &AnalysisReport) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(seo) = report.seo.ready() {
        seo_insights(seo, &mut insights);
    }
    if let Some(performance) = report.performance.ready() {
        performance_insights(performance, &mut insights);
    }
    if let Some(security) = report.security.ready() {
        security_insights(security, &mut insights);
    }
    if let Some(content) = report.content.ready() {
        let words = content.text_stats.word_count;
        if words < MIN_WORD_COUNT {
            insights.push(Insight::new(
                format!(
                    "Die Seite enthält nur {} Wörter (empfohlen: mindestens {}).",
                    words, MIN_WORD_COUNT
                ),
                Category::Content,
                Priority::Normal,
            ));
        }
    }

    if insights.is_empty() {
        insights.push(Insight::new(NO_ISSUES_INSIGHT, Category::General, Priority::Normal));
    }
    insights
}

fn seo_insights(seo: &SeoReport, out: &mut Vec<Insight>) {
    if seo.meta.title.is_empty() || seo.meta.title_length < MIN_TITLE_LENGTH {
        out.push(Insight::new(
            "Der Seitentitel fehlt oder ist zu kurz für SEO.",
            Category::Seo,
            Priority::High,
        ));
    }
    if seo.meta.description.is_empty() || seo.meta.description_length < MIN_DESCRIPTION_LENGTH {
        out.push(Insight::new(
            "Die Meta-Beschreibung fehlt oder ist zu kurz für SEO.",
            Category::Seo,
            Priority::Medium,
        ));
    }
    if seo.headings.h1 != 1 {
        out.push(Insight::new(
            format!("Die Seite hat {} H1-Elemente (optimal: genau 1).", seo.headings.h1),
            Category::Seo,
            Priority::Medium,
        ));
    }
    if seo.images.without_alt > 0 {
        out.push(Insight::new(
            format!("{} Bilder haben keine Alt-Attribute.", seo.images.without_alt),
            Category::Seo,
            Priority::Medium,
        ));
    }
    if !seo.links.has_internal_and_external() {
        out.push(Insight::new(
            "Die Seite enthält nicht sowohl interne als auch externe Links.",
            Category::Seo,
            Priority::Normal,
        ));
    }
}

fn performance_insights(performance: &PerformanceReport, out: &mut Vec<Insight>) {
    let Score::Value(score) = performance.score else {
        return;
    };
    if score < SEVERE_PERFORMANCE {
        out.push(Insight::new(
            "Die Website hat erhebliche Performance-Probleme.",
            Category::Performance,
            Priority::High,
        ));
    } else if score < IMPROVABLE_PERFORMANCE {
        out.push(Insight::new(
            "Die Website-Performance könnte verbessert werden.",
            Category::Performance,
            Priority::Medium,
        ));
    }
}

fn security_insights(security: &SecurityReport, out: &mut Vec<Insight>) {
    if !security.https.enabled {
        out.push(Insight::new(
            "Die Website verwendet kein HTTPS, was ein Sicherheitsrisiko darstellt.",
            Category::Security,
            Priority::High,
        ));
    }
    if security.security_headers.score < MIN_HEADER_SCORE {
        out.push(Insight::new(
            "Wichtige Sicherheits-Header fehlen auf der Website.",
            Category::Security,
            Priority::Medium,
        ));
    }
}

/// Actionable steps for the closing report section.
pub fn generate_recommendations(report: &AnalysisReport) -> Vec<Insight> {
    let mut recommendations = Vec::new();

    if let Some(seo) = report.seo.ready() {
        seo_recommendations(seo, &mut recommendations);
    }
    if let Some(performance) = report.performance.ready() {
        performance_recommendations(performance, &mut recommendations);
    }
    if let Some(security) = report.security.ready() {
        security_recommendations(security, &mut recommendations);
    }
    if let Some(content) = report.content.ready() {
        if content.text_stats.word_count < MIN_WORD_COUNT {
            recommendations.push(Insight::new(
                format!(
                    "Erweitere den Seiteninhalt auf mindestens {} Wörter.",
                    MIN_WORD_COUNT
                ),
                Category::Content,
                Priority::Normal,
            ));
        }
        mobile_recommendations(&content.responsive_design, &mut recommendations);
    }

    if recommendations.is_empty() {
        recommendations.push(Insight::new(NO_RECOMMENDATIONS, Category::General, Priority::Normal));
    }
    recommendations
}

fn seo_recommendations(seo: &SeoReport, out: &mut Vec<Insight>) {
    let (title_min, title_max) = TITLE_LENGTH_RANGE;
    let (desc_min, desc_max) = DESCRIPTION_LENGTH_RANGE;

    if !(title_min..=title_max).contains(&seo.meta.title_length) {
        out.push(Insight::new(
            format!(
                "Optimiere den Seitentitel auf {}-{} Zeichen für bessere SEO-Ergebnisse.",
                title_min, title_max
            ),
            Category::Seo,
            Priority::High,
        ));
    }
    if !(desc_min..=desc_max).contains(&seo.meta.description_length) {
        out.push(Insight::new(
            format!(
                "Passe die Meta-Beschreibung auf {}-{} Zeichen an.",
                desc_min, desc_max
            ),
            Category::Seo,
            Priority::Medium,
        ));
    }
    if seo.headings.h1 != 1 {
        out.push(Insight::new(
            "Verwende genau ein H1-Element pro Seite.",
            Category::Seo,
            Priority::Medium,
        ));
    }
    if seo.images.without_alt > 0 {
        out.push(Insight::new(
            format!(
                "Füge Alt-Attribute zu allen {} Bildern ohne Alt-Text hinzu.",
                seo.images.without_alt
            ),
            Category::Seo,
            Priority::Medium,
        ));
    }
    if !seo.links.has_internal_and_external() {
        out.push(Insight::new(
            "Ergänze interne Verlinkungen und relevante externe Quellen.",
            Category::Seo,
            Priority::Normal,
        ));
    }
}

fn performance_recommendations(performance: &PerformanceReport, out: &mut Vec<Insight>) {
    if let Score::Value(score) = performance.score {
        if score < RECOMMEND_PERFORMANCE {
            out.push(
                Insight::new(
                    "Verbessere die Website-Performance:",
                    Category::Performance,
                    Priority::High,
                )
                .with_details(vec![
                    "Optimiere Bilder (Komprimierung, richtige Größe)".to_string(),
                    "Minimiere CSS und JavaScript".to_string(),
                    "Nutze Browser-Caching".to_string(),
                    "Reduziere Server-Antwortzeiten".to_string(),
                ]),
            );
        }
    }

    if let Some(lcp) = metric_seconds(&performance.metrics.lcp) {
        if lcp > MAX_LCP_SECONDS {
            out.push(Insight::new(
                format!(
                    "Reduziere den Largest Contentful Paint auf unter 2,5 s (aktuell: {}).",
                    performance.metrics.lcp
                ),
                Category::Performance,
                Priority::Medium,
            ));
        }
    }
    if let Some(cls) = metric_number(&performance.metrics.cls) {
        if cls > MAX_CLS {
            out.push(Insight::new(
                format!(
                    "Stabilisiere das Layout, um den Cumulative Layout Shift unter 0,1 zu senken (aktuell: {}).",
                    performance.metrics.cls
                ),
                Category::Performance,
                Priority::Medium,
            ));
        }
    }
}

fn security_recommendations(security: &SecurityReport, out: &mut Vec<Insight>) {
    if !security.https.enabled {
        out.push(Insight::new(
            "Implementiere HTTPS für deine Website.",
            Category::Security,
            Priority::High,
        ));
    }
    if security.security_headers.missing > 0 {
        let missing = security
            .security_headers
            .headers
            .missing_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        out.push(
            Insight::new(
                "Füge die fehlenden Sicherheits-Header hinzu:",
                Category::Security,
                Priority::Medium,
            )
            .with_details(missing),
        );
    }
}

fn mobile_recommendations(responsive: &ResponsiveDesign, out: &mut Vec<Insight>) {
    if !responsive.viewport_meta {
        out.push(Insight::new(
            "Füge das Viewport-Meta-Tag für responsives Design hinzu.",
            Category::Mobile,
            Priority::Medium,
        ));
    }
    if !responsive.media_queries {
        out.push(Insight::new(
            "Setze Media Queries für ein besseres responsives Design ein.",
            Category::Mobile,
            Priority::Normal,
        ));
    }
}

/// Leading number of a formatted metric (`"0.12"`, `"1,4 s"`).
fn metric_number(metric: &Metric) -> Option<f64> {
    let raw = metric.as_deref()?.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(raw.len());
    let number = &raw[..end];
    let normalized = match number.split_once(',') {
        // "1,230 ms" groups thousands, "2,5 s" is a decimal comma
        Some((_, tail)) if tail.len() == 3 && !number.contains('.') => number.replace(',', ""),
        Some(_) if !number.contains('.') => number.replace(',', "."),
        _ => number.replace(',', ""),
    };
    normalized.parse().ok()
}

/// A duration metric in seconds; `ms` values are converted.
fn metric_seconds(metric: &Metric) -> Option<f64> {
    let raw = metric.as_deref()?;
    let value = metric_number(metric)?;
    let unit = raw
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ',')
        .trim_matches(|c: char| c.is_whitespace());
    if unit.starts_with("ms") {
        Some(value / 1000.0)
    } else {
        Some(value)
    }
}

fn category_patterns() -> &'static [(Category, Regex)] {
    static PATTERNS: OnceLock<Vec<(Category, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (Category::Seo, r"(?i)meta|title|description|keyword|h1|h2|h3|alt|headings"),
            (Category::Performance, r"(?i)speed|performance|loading|fcp|lcp|tti|cls|cache"),
            (Category::Content, r"(?i)content|text|word|paragraph|struktur"),
            (Category::Security, r"(?i)security|https|header|ssl|tls"),
            (Category::Mobile, r"(?i)mobile|responsive|viewport"),
        ]
        .into_iter()
        .map(|(category, pattern)| (category, Regex::new(pattern).unwrap()))
        .collect()
    })
}

/// Keyword classification, first matching category wins.
pub fn detect_category(text: &str) -> Category {
    category_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

pub fn determine_priority(text: &str) -> Priority {
    static HIGH: OnceLock<Regex> = OnceLock::new();
    static MEDIUM: OnceLock<Regex> = OnceLock::new();
    let high = HIGH.get_or_init(|| {
        Regex::new(r"(?i)kritisch|sofort|dringend|schwerwiegend|umgehend|critical|immediately|urgent|severe")
            .unwrap()
    });
    let medium = MEDIUM.get_or_init(|| {
        Regex::new(r"(?i)wichtig|sollte|empfehlenswert|relevant|important|should|recommended").unwrap()
    });

    if high.is_match(text) {
        Priority::High
    } else if medium.is_match(text) {
        Priority::Medium
    } else {
        Priority::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ImageStats, LinkStats, PerformanceMetrics, Section};
    use crate::test_utils::fixtures;

    fn texts(items: &[Insight]) -> Vec<&str> {
        items.iter().map(|i| i.text.as_str()).collect()
    }

    #[test]
    fn test_clean_report_gets_positive_fallback() {
        let report = fixtures::clean_report();
        let insights = generate_insights(&report);

        assert_eq!(texts(&insights), vec![NO_ISSUES_INSIGHT]);
        assert_eq!(insights[0].category, Category::General);

        let recommendations = generate_recommendations(&report);
        assert_eq!(texts(&recommendations), vec![NO_RECOMMENDATIONS]);
    }

    #[test]
    fn test_short_title_and_missing_description_are_flagged() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(seo) = &mut report.seo {
            seo.meta.title = "Home".into();
            seo.meta.title_length = 4;
            seo.meta.description = String::new();
            seo.meta.description_length = 0;
        }

        let insights = generate_insights(&report);
        assert_eq!(
            texts(&insights),
            vec![
                "Der Seitentitel fehlt oder ist zu kurz für SEO.",
                "Die Meta-Beschreibung fehlt oder ist zu kurz für SEO.",
            ]
        );

        let recommendations = generate_recommendations(&report);
        assert_eq!(recommendations.len(), 2);
        assert!(recommendations.iter().all(|r| r.category == Category::Seo));
    }

    #[test]
    fn test_page_without_links_flags_link_mix() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(seo) = &mut report.seo {
            seo.headings.h1 = 1;
            seo.images = ImageStats::new(3, 3);
            seo.links = LinkStats::default();
        }

        let insights = generate_insights(&report);
        assert_eq!(
            texts(&insights),
            vec!["Die Seite enthält nicht sowohl interne als auch externe Links."]
        );
        assert_eq!(insights[0].category, Category::Seo);

        let recommendations = generate_recommendations(&report);
        assert_eq!(
            texts(&recommendations),
            vec!["Ergänze interne Verlinkungen und relevante externe Quellen."]
        );
        assert_eq!(recommendations[0].category, Category::Seo);
    }

    #[test]
    fn test_rules_follow_domain_order() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(seo) = &mut report.seo {
            seo.headings.h1 = 3;
        }
        if let Section::Ready(perf) = &mut report.performance {
            perf.score = Score::Value(42);
        }
        if let Section::Ready(security) = &mut report.security {
            security.https.enabled = false;
        }
        if let Section::Ready(content) = &mut report.content {
            content.text_stats.word_count = 120;
        }

        let insights = generate_insights(&report);
        let categories: Vec<_> = insights.iter().map(|i| i.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Seo,
                Category::Performance,
                Category::Security,
                Category::Content
            ]
        );
        assert_eq!(insights[0].text, "Die Seite hat 3 H1-Elemente (optimal: genau 1).");
        assert_eq!(insights[1].priority, Priority::High);
    }

    #[test]
    fn test_failed_sections_contribute_nothing() {
        let mut report = fixtures::clean_report();
        report.seo = Section::failed("SEO-Analyse fehlgeschlagen", "boom");
        report.security = Section::failed("Sicherheitsanalyse fehlgeschlagen", "boom");

        assert_eq!(texts(&generate_insights(&report)), vec![NO_ISSUES_INSIGHT]);
    }

    #[test]
    fn test_not_available_performance_is_skipped() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(perf) = &mut report.performance {
            perf.score = Score::NotAvailable;
            perf.metrics = PerformanceMetrics::default();
        }
        assert_eq!(texts(&generate_insights(&report)), vec![NO_ISSUES_INSIGHT]);
    }

    #[test]
    fn test_performance_recommendation_has_sub_items() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(perf) = &mut report.performance {
            perf.score = Score::Value(65);
            perf.metrics.lcp = Metric::new("3.1\u{a0}s");
            perf.metrics.cls = Metric::new("0.25");
        }

        let recommendations = generate_recommendations(&report);
        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[0].details.len(), 4);
        assert!(recommendations[1].text.contains("Largest Contentful Paint"));
        assert!(recommendations[2].text.contains("Cumulative Layout Shift"));
    }

    #[test]
    fn test_missing_viewport_and_media_queries_are_mobile_recommendations() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(content) = &mut report.content {
            content.responsive_design = ResponsiveDesign::new(false, false);
            content.text_stats.word_count = 120;
        }

        let recommendations = generate_recommendations(&report);
        let categories: Vec<_> = recommendations.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            vec![Category::Content, Category::Mobile, Category::Mobile]
        );
        assert_eq!(
            recommendations[1].text,
            "Füge das Viewport-Meta-Tag für responsives Design hinzu."
        );
        assert_eq!(recommendations[1].priority, Priority::Medium);
        assert_eq!(recommendations[2].priority, Priority::Normal);

        // insights stay untouched by the mobile rules
        let insights = generate_insights(&report);
        assert!(insights.iter().all(|i| i.category != Category::Mobile));
    }

    #[test]
    fn test_missing_headers_listed_as_details() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(security) = &mut report.security {
            security.security_headers.headers.referrer_policy = None;
            security.security_headers.headers.content_security_policy = None;
            security.security_headers.implemented = 4;
            security.security_headers.missing = 2;
        }

        let recommendations = generate_recommendations(&report);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(
            recommendations[0].details,
            vec!["Content-Security-Policy", "Referrer-Policy"]
        );
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!(metric_seconds(&Metric::new("2.6 s")), Some(2.6));
        assert_eq!(metric_seconds(&Metric::new("2,6\u{a0}s")), Some(2.6));
        assert_eq!(metric_seconds(&Metric::new("900 ms")), Some(0.9));
        assert_eq!(metric_number(&Metric::new("0.102")), Some(0.102));
        assert_eq!(metric_seconds(&Metric::not_available()), None);
    }

    #[test]
    fn test_keyword_classification() {
        assert_eq!(detect_category("Improve the meta description"), Category::Seo);
        assert_eq!(detect_category("Enable browser cache"), Category::Performance);
        assert_eq!(detect_category("Mehr Struktur im Text"), Category::Content);
        assert_eq!(detect_category("Use HTTPS everywhere"), Category::Security);
        assert_eq!(detect_category("Optimize for MOBILE"), Category::Mobile);
        assert_eq!(detect_category("Sonstiges"), Category::General);

        assert_eq!(determine_priority("Das sollte sofort behoben werden"), Priority::High);
        assert_eq!(determine_priority("Das ist wichtig"), Priority::Medium);
        assert_eq!(determine_priority("Nice to have"), Priority::Normal);
    }
}
