//! Turns an `AnalysisReport` into a section-structured document and renders
//! it as plain text. Page layout (PDF) is left to whoever consumes the
//! document.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::{
    AnalysisReport, Category, ContentReport, Insight, PerformanceReport, Section, SecurityReport,
    SeoReport, Statistics,
};
use crate::service::insights::{generate_insights, generate_recommendations, NO_RECOMMENDATIONS};
use crate::service::scoring::{self, DESCRIPTION_LENGTH_RANGE, TITLE_LENGTH_RANGE};
use crate::service::statistics::format_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Full,
    Seo,
    Performance,
    Security,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Full => "full",
            ReportKind::Seo => "seo",
            ReportKind::Performance => "performance",
            ReportKind::Security => "security",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    /// Unknown names fall back to the full report.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "seo" => ReportKind::Seo,
            "performance" => ReportKind::Performance,
            "security" => ReportKind::Security,
            _ => ReportKind::Full,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Block {
    Heading(String),
    Line(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportSection {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Heading(text.into()));
        self
    }

    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.blocks.push(Block::Line(text.into()));
        self
    }

    fn list(&mut self, items: Vec<String>) -> &mut Self {
        self.blocks.push(Block::List(items));
        self
    }

    fn error(&mut self, message: &str) -> &mut Self {
        self.line(format!("Fehler: {}", message))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub kind: ReportKind,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub sections: Vec<ReportSection>,
}

impl ReportDocument {
    pub fn build(report: &AnalysisReport, kind: ReportKind) -> Self {
        let sections = match kind {
            ReportKind::Full => vec![
                summary_section(report),
                seo_section(&report.seo),
                performance_section(&report.performance),
                content_section(&report.content),
                security_section(&report.security),
                statistics_section(report, &report.statistics),
                recommendations_section("Empfehlungen", &generate_recommendations(report)),
            ],
            ReportKind::Seo => vec![
                seo_section(&report.seo),
                recommendations_section(
                    "SEO-Empfehlungen",
                    &recommendations_for(report, Category::Seo),
                ),
            ],
            ReportKind::Performance => vec![
                performance_section(&report.performance),
                recommendations_section(
                    "Performance-Empfehlungen",
                    &recommendations_for(report, Category::Performance),
                ),
            ],
            ReportKind::Security => vec![
                security_section(&report.security),
                recommendations_section(
                    "Sicherheits-Empfehlungen",
                    &recommendations_for(report, Category::Security),
                ),
            ],
        };

        let title = match kind {
            ReportKind::Full => "Website-Analysebericht",
            ReportKind::Seo => "SEO-Analyse-Bericht",
            ReportKind::Performance => "Performance-Analyse-Bericht",
            ReportKind::Security => "Sicherheits-Analyse-Bericht",
        };

        Self {
            kind,
            title: title.to_string(),
            url: report.url.clone(),
            created_at: report.timestamp,
            sections,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "URL: {}", self.url);
        let _ = writeln!(out, "Erstellt am: {}", self.created_at.format("%d.%m.%Y %H:%M:%S"));
        out.push('\n');

        out.push_str("Inhaltsverzeichnis\n");
        for (index, section) in self.sections.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", index + 1, section.title);
        }

        for (index, section) in self.sections.iter().enumerate() {
            let heading = format!("{}. {}", index + 1, section.title);
            let _ = writeln!(out, "\n{}\n{}", heading, "=".repeat(heading.chars().count()));
            for block in &section.blocks {
                match block {
                    Block::Heading(text) => {
                        let _ = writeln!(out, "\n{}", text);
                    }
                    Block::Line(text) => {
                        let _ = writeln!(out, "{}", text);
                    }
                    Block::List(items) => {
                        for item in items {
                            let _ = writeln!(out, "{}", item);
                        }
                    }
                }
            }
        }
        out
    }
}

/// Render `text` as a bullet, with its sub-items indented below.
fn bullets(items: &[Insight]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| {
            std::iter::once(format!("• {}", item.text))
                .chain(item.details.iter().map(|d| format!("  - {}", d)))
        })
        .collect()
}

fn plain_bullets(items: impl IntoIterator<Item = String>) -> Vec<String> {
    items.into_iter().map(|item| format!("• {}", item)).collect()
}

fn rating(ok: bool) -> &'static str {
    if ok {
        "(gut)"
    } else {
        "(nicht optimal)"
    }
}

fn recommendations_for(report: &AnalysisReport, category: Category) -> Vec<Insight> {
    generate_recommendations(report)
        .into_iter()
        .filter(|r| r.category == category)
        .collect()
}

fn summary_section(report: &AnalysisReport) -> ReportSection {
    let card = scoring::score_card(report);
    let mut section = ReportSection::new("Zusammenfassung");
    section
        .line("Gesamtbewertung:")
        .list(plain_bullets([
            format!("SEO: {}/100", card.seo),
            format!("Performance: {}/100", card.performance),
            format!("Sicherheit: {}/100", card.security),
        ]))
        .heading("Wichtigste Erkenntnisse:")
        .list(bullets(&generate_insights(report)));
    section
}

fn seo_section(seo: &Section<SeoReport>) -> ReportSection {
    let mut section = ReportSection::new("SEO-Analyse");
    let seo = match seo {
        Section::Ready(seo) => seo,
        Section::Failed(failure) => {
            section.error(&failure.error);
            return section;
        }
    };

    let (title_min, title_max) = TITLE_LENGTH_RANGE;
    let (desc_min, desc_max) = DESCRIPTION_LENGTH_RANGE;
    let title_ok = (title_min..=title_max).contains(&seo.meta.title_length);
    let desc_ok = (desc_min..=desc_max).contains(&seo.meta.description_length);

    section
        .heading("Meta-Informationen:")
        .line(format!("Titel: {}", seo.meta.title))
        .line(format!(
            "Titellänge: {} Zeichen {}",
            seo.meta.title_length,
            rating(title_ok)
        ))
        .line(format!("Beschreibung: {}", seo.meta.description))
        .line(format!(
            "Beschreibungslänge: {} Zeichen {}",
            seo.meta.description_length,
            rating(desc_ok)
        ))
        .heading("Überschriften:")
        .list(plain_bullets(seo.headings.levels().iter().map(|(tag, count)| {
            if *tag == "H1" {
                format!("{}: {} {}", tag, count, rating(*count == 1))
            } else {
                format!("{}: {}", tag, count)
            }
        })))
        .heading("Bilder:")
        .list(plain_bullets([
            format!("Gesamtzahl: {}", seo.images.total),
            format!("Mit Alt-Text: {}", seo.images.with_alt),
            format!("Ohne Alt-Text: {}", seo.images.without_alt),
            format!("Alt-Text-Abdeckung: {}%", seo.images.alt_percentage),
        ]))
        .heading("Links:")
        .list(plain_bullets([
            format!("Interne Links: {}", seo.links.internal),
            format!("Externe Links: {}", seo.links.external),
            format!("Gesamtzahl: {}", seo.links.total),
        ]));
    section
}

fn performance_section(performance: &Section<PerformanceReport>) -> ReportSection {
    let mut section = ReportSection::new("Performance-Analyse");
    let performance = match performance {
        Section::Ready(performance) => performance,
        Section::Failed(failure) => {
            section.error(&failure.error);
            return section;
        }
    };

    let metrics = &performance.metrics;
    section.heading("Performance-Metriken:").list(plain_bullets([
        format!("Gesamt-Score: {}/100", performance.score),
        format!("First Contentful Paint: {}", metrics.fcp),
        format!("Largest Contentful Paint: {}", metrics.lcp),
        format!("Time to Interactive: {}", metrics.tti),
        format!("Total Blocking Time: {}", metrics.tbt),
        format!("Cumulative Layout Shift: {}", metrics.cls),
        format!("Speed Index: {}", metrics.speed_index),
    ]));

    if !performance.opportunities.is_empty() {
        section
            .heading("Verbesserungsmöglichkeiten:")
            .list(plain_bullets(performance.opportunities.iter().map(|o| {
                match o.impact {
                    Some(impact) => format!("{} (Einsparung: {:.0})", o.name, impact),
                    None => format!("{} (Einsparung: Unbekannt)", o.name),
                }
            })));
    }
    section
}

fn content_section(content: &Section<ContentReport>) -> ReportSection {
    let mut section = ReportSection::new("Inhaltsanalyse");
    let content = match content {
        Section::Ready(content) => content,
        Section::Failed(failure) => {
            section.error(&failure.error);
            return section;
        }
    };

    let text = &content.text_stats;
    section
        .heading("Textstatistiken:")
        .list(plain_bullets([
            format!("Wortanzahl: {}", text.word_count),
            format!("Zeichenanzahl: {}", text.character_count),
            format!("Durchschnittliche Wortlänge: {} Zeichen", text.average_word_length),
            format!("Absätze: {}", text.paragraph_count),
        ]))
        .heading("Medien:")
        .list(plain_bullets([
            format!("Bilder: {}", content.media.images),
            format!("Videos: {}", content.media.videos),
        ]))
        .heading("Seitenstruktur:")
        .list(plain_bullets([
            format!("Absätze: {}", content.structure.paragraphs),
            format!("Listen: {}", content.structure.lists),
            format!("Tabellen: {}", content.structure.tables),
        ]));

    let responsive = &content.responsive_design;
    let present = |found: bool| if found { "Vorhanden" } else { "Fehlt" };
    section
        .heading("Responsive Design:")
        .list(plain_bullets([
            format!("Viewport-Meta-Tag: {}", present(responsive.viewport_meta)),
            format!("Media Queries: {}", present(responsive.media_queries)),
            format!("Bewertung: {}", responsive.score.as_str()),
        ]));
    section
}

fn security_section(security: &Section<SecurityReport>) -> ReportSection {
    let mut section = ReportSection::new("Sicherheitsanalyse");
    let security = match security {
        Section::Ready(security) => security,
        Section::Failed(failure) => {
            section.error(&failure.error);
            return section;
        }
    };

    let headers = &security.security_headers;
    section
        .heading("HTTPS:")
        .list(plain_bullets([
            format!(
                "Aktiviert: {}",
                if security.https.enabled { "Ja" } else { "Nein" }
            ),
            format!("Bewertung: {}", security.https.score.as_str()),
        ]))
        .heading("Sicherheits-Header:")
        .line(format!(
            "Implementiert: {} von {}",
            headers.implemented,
            headers.implemented + headers.missing
        ))
        .line(format!("Score: {}%", headers.score))
        .heading("Header-Details:");
    for (name, value) in headers.headers.entries() {
        section.line(format!("{}: {}", name, value.unwrap_or("Nicht implementiert")));
    }

    let cookies = &security.cookies;
    section.heading("Cookies:").list(plain_bullets([
        format!("Gesamtzahl: {}", cookies.total),
        format!("Secure: {}", cookies.secure),
        format!("HttpOnly: {}", cookies.http_only),
        format!("SameSite: {}", cookies.same_site),
        format!("Score: {}%", cookies.score),
    ]));
    section
}

fn statistics_section(report: &AnalysisReport, statistics: &Statistics) -> ReportSection {
    let mut section = ReportSection::new("Website-Statistiken");
    section.list(plain_bullets([
        format!("HTML-Größe: {}", statistics.html_size),
        format!("DOM-Elemente: {}", statistics.dom_elements),
        format!("Ladezeit: {}", report.load_time_label()),
    ]));

    match &statistics.resources {
        Section::Failed(failure) => {
            section.error(&failure.error);
        }
        Section::Ready(resources) => {
            let count = |kind: &str| {
                resources
                    .resources
                    .by_type
                    .get(kind)
                    .map(|t| t.count)
                    .unwrap_or(0)
            };
            section
                .list(plain_bullets([
                    format!("JavaScript-Dateien: {}", count("script")),
                    format!("CSS-Dateien: {}", count("stylesheet")),
                    format!("Load-Event: {}", resources.load_time),
                    format!("DOM Content Loaded: {}", resources.dom_content_loaded),
                    format!("Seitengröße: {}", resources.page_size),
                    format!("Gesamtgröße der Ressourcen: {}", resources.total_size),
                ]))
                .heading(format!("Ressourcen nach Typ ({} gesamt):", resources.resources.total))
                .list(plain_bullets(resources.resources.by_type.iter().map(
                    |(kind, totals)| format!("{}: {} ({})", kind, totals.count, format_bytes(totals.size)),
                )));
        }
    }
    section
}

fn recommendations_section(title: &str, recommendations: &[Insight]) -> ReportSection {
    let mut section = ReportSection::new(title);
    if recommendations.is_empty() {
        section.list(plain_bullets([NO_RECOMMENDATIONS.to_string()]));
    } else {
        section.list(bullets(recommendations));
    }
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    fn titles(document: &ReportDocument) -> Vec<&str> {
        document.sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_full_report_sections() {
        let document = ReportDocument::build(&fixtures::clean_report(), ReportKind::Full);
        assert_eq!(
            titles(&document),
            vec![
                "Zusammenfassung",
                "SEO-Analyse",
                "Performance-Analyse",
                "Inhaltsanalyse",
                "Sicherheitsanalyse",
                "Website-Statistiken",
                "Empfehlungen",
            ]
        );

        let text = document.to_text();
        assert!(text.starts_with("Website-Analysebericht\nURL: https://example.com\n"));
        assert!(text.contains("Viewport-Meta-Tag: Vorhanden"));
        assert!(text.contains("Bewertung: Gut"));
        assert!(text.contains("• SEO: 100/100"));
        assert!(text.contains("• Keine spezifischen Empfehlungen notwendig."));
    }

    #[test]
    fn test_failed_section_renders_error_line() {
        let mut report = fixtures::clean_report();
        report.content = Section::failed("Inhaltsanalyse fehlgeschlagen", "boom");

        let text = ReportDocument::build(&report, ReportKind::Full).to_text();
        assert!(text.contains("Fehler: Inhaltsanalyse fehlgeschlagen"));
        assert!(!text.contains("Wortanzahl:"));
    }

    #[test]
    fn test_kind_specific_reports_filter_recommendations() {
        let mut report = fixtures::clean_report();
        if let Section::Ready(security) = &mut report.security {
            security.https.enabled = false;
        }
        if let Section::Ready(seo) = &mut report.seo {
            seo.headings.h1 = 0;
        }

        let document = ReportDocument::build(&report, ReportKind::Security);
        assert_eq!(titles(&document), vec!["Sicherheitsanalyse", "Sicherheits-Empfehlungen"]);
        let text = document.to_text();
        assert!(text.contains("• Implementiere HTTPS für deine Website."));
        assert!(!text.contains("H1-Element"));

        let document = ReportDocument::build(&report, ReportKind::Performance);
        assert!(document
            .to_text()
            .contains("• Keine spezifischen Empfehlungen notwendig."));
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("SEO".parse::<ReportKind>().unwrap(), ReportKind::Seo);
        assert_eq!("security".parse::<ReportKind>().unwrap(), ReportKind::Security);
        assert_eq!("whatever".parse::<ReportKind>().unwrap(), ReportKind::Full);
    }
}
