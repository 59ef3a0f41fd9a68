use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Per-connection pragmas, applied from the pool's `after_connect` hook.
async fn configure_sqlite_pragmas(conn: &mut sqlx::SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Executor;

    conn.execute("PRAGMA journal_mode = WAL").await?;
    conn.execute("PRAGMA synchronous = NORMAL").await?;
    // 5 second wait before "database is locked"
    conn.execute("PRAGMA busy_timeout = 5000").await?;
    conn.execute("PRAGMA temp_store = MEMORY").await?;
    conn.execute("PRAGMA foreign_keys = ON").await?;

    Ok(())
}

/// Open (creating if needed) the database at `database_url` and apply migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let url = normalize_url(database_url);
    tracing::debug!("Database URL: {}", url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                configure_sqlite_pragmas(conn).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .with_context(|| format!("failed to connect to database at {}", database_url))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Open a database file by path.
pub async fn connect_path(path: &Path) -> Result<SqlitePool> {
    connect(&format!("sqlite://{}", path.display())).await
}

/// Bare file paths become `sqlite://` URLs; file URLs get `mode=rwc` so the
/// file is created on first use.
fn normalize_url(database_url: &str) -> String {
    if database_url.contains(":memory:") {
        return database_url.to_string();
    }
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };
    if url.contains("mode=") {
        url
    } else if url.contains('?') {
        format!("{}&mode=rwc", url)
    } else {
        format!("{}?mode=rwc", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("analyses.db"), "sqlite://analyses.db?mode=rwc");
        assert_eq!(
            normalize_url("sqlite://data/site.db"),
            "sqlite://data/site.db?mode=rwc"
        );
        assert_eq!(
            normalize_url("sqlite://site.db?mode=ro"),
            "sqlite://site.db?mode=ro"
        );
        assert_eq!(normalize_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[tokio::test]
    async fn test_connect_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.db");

        let pool = connect_path(&path).await.unwrap();
        assert!(path.exists());

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "analyses",
                "content_results",
                "performance_results",
                "security_results",
                "seo_results",
                "websites"
            ]
        );
    }
}
