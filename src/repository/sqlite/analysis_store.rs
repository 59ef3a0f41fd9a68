//! SQLite-backed analysis store.
//!
//! Runtime-checked queries (`sqlx::query().bind()`), so the crate builds
//! without a prepared query cache.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use super::score_column;
use crate::domain::models::{
    AnalysisDetails, AnalysisReport, ContentReport, HistoricalAnalysis, HistoricalScores,
    PerformanceReport, SecurityReport, SeoReport, StoredContent, StoredPerformance, StoredSecurity,
    StoredSeo, WebsiteHistory, WebsiteSummary,
};
use crate::error::AppError;
use crate::repository::AnalysisStore;
use crate::service::scoring::score_card;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert_seo(
        tx: &mut Transaction<'_, Sqlite>,
        analysis_id: i64,
        seo: &SeoReport,
        score: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO seo_results (
                analysis_id, title_length, description_length, h1_count,
                alt_image_percentage, internal_links, external_links, score
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(analysis_id)
        .bind(seo.meta.title_length as i64)
        .bind(seo.meta.description_length as i64)
        .bind(seo.headings.h1 as i64)
        .bind(f64::from(seo.images.alt_percentage))
        .bind(seo.links.internal as i64)
        .bind(seo.links.external as i64)
        .bind(score)
        .execute(&mut **tx)
        .await
        .context("Failed to insert SEO results")?;
        Ok(())
    }

    async fn insert_performance(
        tx: &mut Transaction<'_, Sqlite>,
        analysis_id: i64,
        performance: &PerformanceReport,
        load_time_ms: u64,
    ) -> Result<()> {
        let metrics = &performance.metrics;
        sqlx::query(
            r#"
            INSERT INTO performance_results (
                analysis_id, lighthouse_score, fcp, lcp, tti, tbt, cls, load_time
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(analysis_id)
        .bind(score_column(performance.score))
        .bind(metrics.fcp.as_deref())
        .bind(metrics.lcp.as_deref())
        .bind(metrics.tti.as_deref())
        .bind(metrics.tbt.as_deref())
        .bind(metrics.cls.as_deref())
        .bind(load_time_ms as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert performance results")?;
        Ok(())
    }

    async fn insert_content(
        tx: &mut Transaction<'_, Sqlite>,
        analysis_id: i64,
        content: &ContentReport,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO content_results (
                analysis_id, word_count, paragraph_count, image_count,
                video_count, list_count, table_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(analysis_id)
        .bind(content.text_stats.word_count as i64)
        .bind(content.text_stats.paragraph_count as i64)
        .bind(content.media.images as i64)
        .bind(content.media.videos as i64)
        .bind(content.structure.lists as i64)
        .bind(content.structure.tables as i64)
        .execute(&mut **tx)
        .await
        .context("Failed to insert content results")?;
        Ok(())
    }

    async fn insert_security(
        tx: &mut Transaction<'_, Sqlite>,
        analysis_id: i64,
        security: &SecurityReport,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO security_results (
                analysis_id, https_enabled, security_headers_score
            ) VALUES (?, ?, ?)
            "#,
        )
        .bind(analysis_id)
        .bind(security.https.enabled)
        .bind(i64::from(security.security_headers.score))
        .execute(&mut **tx)
        .await
        .context("Failed to insert security results")?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn upsert_website(&self, url: &str, analyzed_at: DateTime<Utc>) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO websites (url, first_analysis, last_analysis)
            VALUES (?, ?, ?)
            ON CONFLICT(url) DO UPDATE SET
                first_analysis = MIN(first_analysis, excluded.first_analysis),
                last_analysis = MAX(last_analysis, excluded.last_analysis)
            RETURNING id
            "#,
        )
        .bind(url)
        .bind(analyzed_at)
        .bind(analyzed_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert website")?;

        tracing::debug!("Website {} has id {}", url, id);
        Ok(id)
    }

    async fn insert_analysis(
        &self,
        website_id: i64,
        report: &AnalysisReport,
        report_path: Option<&str>,
    ) -> Result<i64> {
        let scores = score_card(report);
        let mut tx = self.pool.begin().await?;

        let analysis_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO analyses (
                website_id, timestamp, status_code, load_time_ms,
                seo_score, performance_score, security_score, report_path
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(website_id)
        .bind(report.timestamp)
        .bind(i64::from(report.status_code))
        .bind(report.load_time_ms as i64)
        .bind(score_column(scores.seo))
        .bind(score_column(scores.performance))
        .bind(score_column(scores.security))
        .bind(report_path)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert analysis")?;

        if let Some(seo) = report.seo.ready() {
            Self::insert_seo(&mut tx, analysis_id, seo, score_column(scores.seo)).await?;
        }
        if let Some(performance) = report.performance.ready() {
            Self::insert_performance(&mut tx, analysis_id, performance, report.load_time_ms)
                .await?;
        }
        if let Some(content) = report.content.ready() {
            Self::insert_content(&mut tx, analysis_id, content).await?;
        }
        if let Some(security) = report.security.ready() {
            Self::insert_security(&mut tx, analysis_id, security).await?;
        }

        tx.commit().await?;
        Ok(analysis_id)
    }

    async fn query_history(&self, url: &str) -> Result<Option<WebsiteHistory>> {
        let website_id: Option<i64> = sqlx::query_scalar("SELECT id FROM websites WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up website")?;

        let Some(website_id) = website_id else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, seo_score, performance_score, security_score
            FROM analyses
            WHERE website_id = ?
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(website_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch analysis history")?;

        let analyses = rows
            .iter()
            .map(|row| {
                Ok(HistoricalAnalysis {
                    id: row.try_get("id")?,
                    date: row.try_get("timestamp")?,
                    scores: row_to_scores(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Some(WebsiteHistory {
            url: url.to_string(),
            analyses,
        }))
    }

    async fn analysis_details(&self, analysis_id: i64) -> Result<AnalysisDetails> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.timestamp, a.report_path, w.url,
                s.analysis_id AS seo_id, s.title_length, s.description_length, s.h1_count,
                s.alt_image_percentage, s.internal_links, s.external_links, s.score AS seo_score,
                p.analysis_id AS performance_id, p.lighthouse_score,
                p.fcp, p.lcp, p.tti, p.tbt, p.cls, p.load_time,
                c.analysis_id AS content_id, c.word_count, c.paragraph_count, c.image_count,
                c.video_count, c.list_count, c.table_count,
                sec.analysis_id AS security_id, sec.https_enabled, sec.security_headers_score
            FROM analyses a
            JOIN websites w ON a.website_id = w.id
            LEFT JOIN seo_results s ON a.id = s.analysis_id
            LEFT JOIN performance_results p ON a.id = p.analysis_id
            LEFT JOIN content_results c ON a.id = c.analysis_id
            LEFT JOIN security_results sec ON a.id = sec.analysis_id
            WHERE a.id = ?
            "#,
        )
        .bind(analysis_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch analysis details")?
        .ok_or(AppError::AnalysisNotFound(analysis_id))?;

        Ok(row_to_details(&row)?)
    }

    async fn list_websites(&self) -> Result<Vec<WebsiteSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT w.id, w.url, w.first_analysis, w.last_analysis,
                (SELECT COUNT(*) FROM analyses a WHERE a.website_id = w.id) AS analysis_count,
                l.seo_score, l.performance_score, l.security_score
            FROM websites w
            LEFT JOIN analyses l ON l.id = (
                SELECT a.id FROM analyses a
                WHERE a.website_id = w.id
                ORDER BY a.timestamp DESC, a.id DESC
                LIMIT 1
            )
            ORDER BY w.last_analysis DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list websites")?;

        let websites = rows
            .iter()
            .map(|row| {
                Ok(WebsiteSummary {
                    id: row.try_get("id")?,
                    url: row.try_get("url")?,
                    first_analysis: row.try_get("first_analysis")?,
                    last_analysis: row.try_get("last_analysis")?,
                    analysis_count: row.try_get("analysis_count")?,
                    latest_scores: row_to_scores(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(websites)
    }
}

fn row_to_scores(row: &SqliteRow) -> Result<HistoricalScores, sqlx::Error> {
    Ok(HistoricalScores {
        seo: row.try_get("seo_score")?,
        performance: row.try_get("performance_score")?,
        security: row.try_get("security_score")?,
    })
}

fn row_to_details(row: &SqliteRow) -> Result<AnalysisDetails, sqlx::Error> {
    let seo = match row.try_get::<Option<i64>, _>("seo_id")? {
        Some(_) => Some(StoredSeo {
            title_length: row.try_get("title_length")?,
            description_length: row.try_get("description_length")?,
            h1_count: row.try_get("h1_count")?,
            alt_image_percentage: row.try_get("alt_image_percentage")?,
            internal_links: row.try_get("internal_links")?,
            external_links: row.try_get("external_links")?,
            score: row.try_get("seo_score")?,
        }),
        None => None,
    };

    let performance = match row.try_get::<Option<i64>, _>("performance_id")? {
        Some(_) => Some(StoredPerformance {
            lighthouse_score: row.try_get("lighthouse_score")?,
            fcp: row.try_get("fcp")?,
            lcp: row.try_get("lcp")?,
            tti: row.try_get("tti")?,
            tbt: row.try_get("tbt")?,
            cls: row.try_get("cls")?,
            load_time: row.try_get("load_time")?,
        }),
        None => None,
    };

    let content = match row.try_get::<Option<i64>, _>("content_id")? {
        Some(_) => Some(StoredContent {
            word_count: row.try_get("word_count")?,
            paragraph_count: row.try_get("paragraph_count")?,
            image_count: row.try_get("image_count")?,
            video_count: row.try_get("video_count")?,
            list_count: row.try_get("list_count")?,
            table_count: row.try_get("table_count")?,
        }),
        None => None,
    };

    let security = match row.try_get::<Option<i64>, _>("security_id")? {
        Some(_) => Some(StoredSecurity {
            https_enabled: row.try_get("https_enabled")?,
            security_headers_score: row.try_get("security_headers_score")?,
        }),
        None => None,
    };

    Ok(AnalysisDetails {
        id: row.try_get("id")?,
        url: row.try_get("url")?,
        timestamp: row.try_get("timestamp")?,
        report_path: row.try_get("report_path")?,
        seo,
        performance,
        content,
        security,
    })
}
