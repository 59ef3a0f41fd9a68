//! Command handlers behind the CLI. Each returns the text to print.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::domain::models::{
    AnalysisDetails, AnalysisReport, HistoricalScores, Insight, ScoreCard, WebsiteHistory,
    WebsiteSummary,
};
use crate::error::AnalysisFailure;
use crate::repository::{save_report, AnalysisStore};
use crate::service::advisor::{self, AdvisorRecommendation};
use crate::service::insights::{generate_insights, generate_recommendations};
use crate::service::scoring::score_card;
use crate::service::{ReportDocument, ReportKind, SiteAnalyzer};

pub const NO_HISTORY: &str = "Keine historischen Daten für diese URL gefunden";
const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Printed output plus whether the command succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub body: String,
    pub success: bool,
}

impl CommandOutput {
    fn ok(body: String) -> Self {
        Self { body, success: true }
    }

    fn failed(body: String) -> Self {
        Self {
            body,
            success: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub url: String,
    pub format: OutputFormat,
    pub report: ReportKind,
    pub output: Option<PathBuf>,
    pub save: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse<'a> {
    pub report: &'a AnalysisReport,
    pub scores: ScoreCard,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Insight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
}

/// Run one analysis, optionally writing the text report and storing the result.
/// A failed page fetch is rendered as the failure value, not returned as `Err`.
pub async fn analyze(
    analyzer: &SiteAnalyzer,
    store: Option<&dyn AnalysisStore>,
    options: &AnalyzeOptions,
) -> Result<CommandOutput> {
    let report = match analyzer.analyze(&options.url).await {
        Ok(report) => report,
        Err(e) => return render_failure(AnalysisFailure::from(e), options.format).map(CommandOutput::failed),
    };

    let document = ReportDocument::build(&report, options.report);
    let report_path = match &options.output {
        Some(path) => {
            tokio::fs::write(path, document.to_text())
                .await
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!("Report written to {}", path.display());
            Some(path.display().to_string())
        }
        None => None,
    };

    let analysis_id = match (options.save, store) {
        (true, Some(store)) => Some(save_report(store, &report, report_path.as_deref()).await?),
        (true, None) => anyhow::bail!("--save needs a database"),
        (false, _) => None,
    };

    let body = match options.format {
        OutputFormat::Json => serde_json::to_string_pretty(&AnalysisResponse {
            report: &report,
            scores: score_card(&report),
            insights: generate_insights(&report),
            recommendations: generate_recommendations(&report),
            analysis_id,
        })?,
        OutputFormat::Text => {
            let mut text = document.to_text();
            if let Some(id) = analysis_id {
                let _ = write!(text, "\nGespeichert als Analyse #{}\n", id);
            }
            text
        }
    };
    Ok(CommandOutput::ok(body))
}

fn render_failure(failure: AnalysisFailure, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&failure)?,
        OutputFormat::Text => format!("{}: {}", failure.error, failure.details),
    })
}

pub async fn history(store: &dyn AnalysisStore, url: &str, format: OutputFormat) -> Result<CommandOutput> {
    let Some(history) = store.query_history(url).await? else {
        return Ok(CommandOutput::failed(match format {
            OutputFormat::Json => serde_json::json!({ "error": NO_HISTORY }).to_string(),
            OutputFormat::Text => NO_HISTORY.to_string(),
        }));
    };

    Ok(CommandOutput::ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&history)?,
        OutputFormat::Text => history_text(&history),
    }))
}

pub async fn details(store: &dyn AnalysisStore, id: i64, format: OutputFormat) -> Result<CommandOutput> {
    let details = store.analysis_details(id).await?;
    Ok(CommandOutput::ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&details)?,
        OutputFormat::Text => details_text(&details),
    }))
}

pub async fn websites(store: &dyn AnalysisStore, format: OutputFormat) -> Result<CommandOutput> {
    let websites = store.list_websites().await?;
    Ok(CommandOutput::ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&websites)?,
        OutputFormat::Text => websites_text(&websites),
    }))
}

/// Analyze `url` and return the advisor prompt built from the report.
pub async fn prompt(analyzer: &SiteAnalyzer, url: &str) -> Result<CommandOutput> {
    match analyzer.analyze(url).await {
        Ok(report) => Ok(CommandOutput::ok(advisor::build_prompt(&report))),
        Err(e) => render_failure(AnalysisFailure::from(e), OutputFormat::Text).map(CommandOutput::failed),
    }
}

/// Parse an advisor answer stored in `input`.
pub async fn advise(input: &Path, format: OutputFormat) -> Result<CommandOutput> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let response = advisor::parse_response(&text);
    tracing::debug!("Parsed {} advisor recommendations", response.recommendations.len());

    Ok(CommandOutput::ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&response)?,
        OutputFormat::Text => advice_text(&response.recommendations),
    }))
}

fn advice_text(recommendations: &[AdvisorRecommendation]) -> String {
    let mut out = String::new();
    for (index, item) in recommendations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} [{} / {}]",
            index + 1,
            item.title,
            item.category.as_str(),
            item.priority.as_str()
        );
        if !item.description.is_empty() {
            let _ = writeln!(out, "   {}", item.description);
        }
        if !item.benefits.is_empty() {
            let _ = writeln!(out, "   Vorteile: {}", item.benefits);
        }
    }
    out
}

fn score_label(score: Option<i64>) -> String {
    score.map_or_else(|| "N/A".to_string(), |s| s.to_string())
}

fn scores_line(scores: &HistoricalScores) -> String {
    format!(
        "SEO: {}  Performance: {}  Sicherheit: {}",
        score_label(scores.seo),
        score_label(scores.performance),
        score_label(scores.security)
    )
}

fn history_text(history: &WebsiteHistory) -> String {
    let mut out = format!("Verlauf für {}\n", history.url);
    for analysis in &history.analyses {
        let _ = writeln!(
            out,
            "#{:<5} {}  {}",
            analysis.id,
            analysis.date.format(DATE_FORMAT),
            scores_line(&analysis.scores)
        );
    }
    out
}

fn websites_text(websites: &[WebsiteSummary]) -> String {
    if websites.is_empty() {
        return "Noch keine Websites analysiert.".to_string();
    }
    let mut out = String::new();
    for site in websites {
        let _ = writeln!(
            out,
            "{} ({} Analysen, zuletzt {})\n    {}",
            site.url,
            site.analysis_count,
            site.last_analysis.format(DATE_FORMAT),
            scores_line(&site.latest_scores)
        );
    }
    out
}

fn details_text(details: &AnalysisDetails) -> String {
    let mut out = format!(
        "Analyse #{} für {}\nDatum: {}\n",
        details.id,
        details.url,
        details.timestamp.format(DATE_FORMAT)
    );
    if let Some(path) = &details.report_path {
        let _ = writeln!(out, "Bericht: {}", path);
    }

    out.push_str("\nSEO\n");
    match &details.seo {
        Some(seo) => {
            let _ = writeln!(out, "  Titellänge: {}", seo.title_length);
            let _ = writeln!(out, "  Beschreibungslänge: {}", seo.description_length);
            let _ = writeln!(out, "  H1-Überschriften: {}", seo.h1_count);
            let _ = writeln!(out, "  Bilder mit Alt-Text: {}%", seo.alt_image_percentage);
            let _ = writeln!(
                out,
                "  Links: {} intern, {} extern",
                seo.internal_links, seo.external_links
            );
            let _ = writeln!(out, "  Score: {}", score_label(seo.score));
        }
        None => out.push_str("  Keine Daten\n"),
    }

    out.push_str("\nPerformance\n");
    match &details.performance {
        Some(performance) => {
            let _ = writeln!(out, "  Score: {}", score_label(performance.lighthouse_score));
            for (name, value) in [
                ("FCP", &performance.fcp),
                ("LCP", &performance.lcp),
                ("TTI", &performance.tti),
                ("TBT", &performance.tbt),
                ("CLS", &performance.cls),
            ] {
                let _ = writeln!(out, "  {}: {}", name, value.as_deref().unwrap_or("N/A"));
            }
            if let Some(load_time) = performance.load_time {
                let _ = writeln!(out, "  Ladezeit: {}ms", load_time);
            }
        }
        None => out.push_str("  Keine Daten\n"),
    }

    out.push_str("\nInhalt\n");
    match &details.content {
        Some(content) => {
            let _ = writeln!(out, "  Wörter: {}", content.word_count);
            let _ = writeln!(out, "  Absätze: {}", content.paragraph_count);
            let _ = writeln!(
                out,
                "  Bilder: {}, Videos: {}",
                content.image_count, content.video_count
            );
            let _ = writeln!(
                out,
                "  Listen: {}, Tabellen: {}",
                content.list_count, content.table_count
            );
        }
        None => out.push_str("  Keine Daten\n"),
    }

    out.push_str("\nSicherheit\n");
    match &details.security {
        Some(security) => {
            let _ = writeln!(
                out,
                "  HTTPS: {}",
                if security.https_enabled { "Aktiviert" } else { "Nicht aktiviert" }
            );
            let _ = writeln!(out, "  Sicherheits-Header: {}/100", security.security_headers_score);
        }
        None => out.push_str("  Keine Daten\n"),
    }

    out
}
