//! Process setup shared by the CLI: logging and service wiring.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AnalyzerConfig;
use crate::db;
use crate::repository::SqliteStore;
use crate::service::SiteAnalyzer;

/// Initialize logging with tracing_subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sqlx=warn".parse().unwrap())
                .add_directive("site_analyzer=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .init();
}

pub fn build_analyzer(config: AnalyzerConfig) -> Result<SiteAnalyzer> {
    tracing::debug!(
        "Analyzer config: mode={}, timeout={:?}, lighthouse={}",
        config.mode.as_str(),
        config.request_timeout,
        config.lighthouse_bin.display()
    );
    SiteAnalyzer::new(config).context("failed to set up analyzer")
}

pub async fn open_store(config: &AnalyzerConfig) -> Result<SqliteStore> {
    let pool = db::connect(&config.database_url).await?;
    Ok(SqliteStore::new(pool))
}
