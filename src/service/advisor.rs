//! Prompt construction and response parsing for an external text advisor
//! (a language model asked for prioritized improvement suggestions).
//!
//! The network call itself lives outside this crate; this module only turns
//! a report into a prompt and the advisor's numbered answer into structured
//! recommendations.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::domain::models::{AnalysisReport, Category, Priority, NOT_AVAILABLE};
use crate::service::insights::{detect_category, determine_priority};

const DEFAULT_TITLE: &str = "Empfehlung";
const DESCRIPTION_MARKER: &str = "Beschreibung:";
const BENEFITS_MARKER: &str = "Vorteile:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisorRecommendation {
    pub title: String,
    pub description: String,
    pub benefits: String,
    pub category: Category,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorResponse {
    pub recommendations: Vec<AdvisorRecommendation>,
    pub generated_at: DateTime<Utc>,
}

/// Build the advisor prompt from the domains that completed.
pub fn build_prompt(report: &AnalysisReport) -> String {
    let seo = report.seo.ready();
    let performance = report.performance.ready();
    let security = report.security.ready();
    let content = report.content.ready();

    let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut prompt = String::new();
    prompt.push_str(
        "Du bist ein erfahrener SEO- und Web-Performance-Experte. Analysiere die folgenden \
         Website-Daten und gib 5 spezifische, umsetzbare Verbesserungsvorschläge.\n\n",
    );
    prompt.push_str(&format!("URL: {}\n\n", report.url));

    prompt.push_str("SEO-DATEN:\n");
    prompt.push_str(&format!(
        "- Titel: {}\n",
        seo.map(|s| s.meta.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Nicht verfügbar".to_string())
    ));
    prompt.push_str(&format!(
        "- Titellänge: {} Zeichen\n",
        or_na(seo.map(|s| s.meta.title_length.to_string()))
    ));
    prompt.push_str(&format!(
        "- Meta-Beschreibung: {}\n",
        seo.map(|s| s.meta.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Nicht verfügbar".to_string())
    ));
    prompt.push_str(&format!(
        "- Meta-Beschreibungslänge: {} Zeichen\n",
        or_na(seo.map(|s| s.meta.description_length.to_string()))
    ));
    prompt.push_str(&format!(
        "- H1-Tags: {}\n",
        or_na(seo.map(|s| s.headings.h1.to_string()))
    ));
    prompt.push_str(&format!(
        "- Bilder ohne Alt-Text: {} von {}\n\n",
        or_na(seo.map(|s| s.images.without_alt.to_string())),
        or_na(seo.map(|s| s.images.total.to_string()))
    ));

    prompt.push_str("PERFORMANCE-DATEN:\n");
    prompt.push_str(&format!(
        "- Performance-Score: {}/100\n",
        or_na(performance.map(|p| p.score.to_string()))
    ));
    if let Some(p) = performance {
        prompt.push_str(&format!("- First Contentful Paint: {}\n", p.metrics.fcp));
        prompt.push_str(&format!("- Largest Contentful Paint: {}\n", p.metrics.lcp));
        prompt.push_str(&format!("- Time to Interactive: {}\n", p.metrics.tti));
        prompt.push_str(&format!("- Total Blocking Time: {}\n", p.metrics.tbt));
        prompt.push_str(&format!("- Cumulative Layout Shift: {}\n", p.metrics.cls));
    }
    prompt.push_str(&format!("- Ladezeit: {}\n\n", report.load_time_label()));

    prompt.push_str("SICHERHEITS-DATEN:\n");
    prompt.push_str(&format!(
        "- HTTPS: {}\n",
        match security.map(|s| s.https.enabled) {
            Some(true) => "Aktiviert",
            _ => "Nicht aktiviert",
        }
    ));
    prompt.push_str(&format!(
        "- Security-Headers-Score: {}/100\n\n",
        or_na(security.map(|s| s.security_headers.score.to_string()))
    ));

    prompt.push_str("INHALTS-DATEN:\n");
    prompt.push_str(&format!(
        "- Wortanzahl: {}\n",
        or_na(content.map(|c| c.text_stats.word_count.to_string()))
    ));
    prompt.push_str(&format!(
        "- Anzahl Absätze: {}\n\n",
        or_na(content.map(|c| c.structure.paragraphs.to_string()))
    ));

    prompt.push_str(
        "Gib 5 konkrete, priorisierte Empfehlungen zurück. Formatiere jede Empfehlung so:\n\n\
         1. [TITEL DER EMPFEHLUNG]\n\
         Beschreibung: [DETAILLIERTE BESCHREIBUNG]\n\
         Vorteile: [ERWARTETE VORTEILE]\n",
    );
    prompt
}

/// Split a numbered advisor answer into recommendations.
///
/// Items start with `<n>. ` at the beginning of a line; numbers inside the
/// text (`2.5 s`) do not start a new item.
pub fn parse_recommendations(text: &str) -> Vec<AdvisorRecommendation> {
    static ITEM_START: OnceLock<Regex> = OnceLock::new();
    let item_start = ITEM_START.get_or_init(|| Regex::new(r"(?m)^[ \t]*\d+\.[ \t]+").unwrap());

    item_start
        .split(text)
        .filter(|section| !section.trim().is_empty())
        .map(parse_section)
        .collect()
}

pub fn parse_response(text: &str) -> AdvisorResponse {
    AdvisorResponse {
        recommendations: parse_recommendations(text),
        generated_at: Utc::now(),
    }
}

fn parse_section(section: &str) -> AdvisorRecommendation {
    let title = section
        .split_once('\n')
        .map(|(first, _)| first.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let description = section
        .split_once(DESCRIPTION_MARKER)
        .map(|(_, rest)| {
            rest.split_once(BENEFITS_MARKER)
                .map(|(description, _)| description)
                .unwrap_or(rest)
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    let benefits = section
        .split_once(BENEFITS_MARKER)
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default();

    AdvisorRecommendation {
        category: detect_category(&format!("{} {}", title, description)),
        priority: determine_priority(&description),
        title,
        description,
        benefits,
    }
}
