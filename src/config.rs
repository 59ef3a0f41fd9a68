//! Runtime configuration for the analyzer.
//!
//! Values come from `Default`, then `SITE_ANALYZER_*` environment variables,
//! then CLI flags (see `main.rs`).

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_DATABASE_URL: &str = "sqlite://website_analysis.db?mode=rwc";

/// Probe selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuditMode {
    /// HTTP fetch + markup-derived resources, fallback performance score
    #[default]
    Light,
    /// Lighthouse-driven performance audit and network resource list
    Deep,
}

impl AuditMode {
    pub fn from_deep_enabled(deep: bool) -> Self {
        if deep {
            Self::Deep
        } else {
            Self::Light
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditMode::Light => "light",
            AuditMode::Deep => "deep",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
    pub mode: AuditMode,
    pub lighthouse_bin: PathBuf,
    pub lighthouse_timeout: Duration,
    pub database_url: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mode: AuditMode::Light,
            lighthouse_bin: PathBuf::from("lighthouse"),
            lighthouse_timeout: Duration::from_secs(120),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Defaults overridden by `SITE_ANALYZER_*` variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(secs) = lookup("SITE_ANALYZER_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(agent) = lookup("SITE_ANALYZER_USER_AGENT").filter(|v| !v.is_empty()) {
            config.user_agent = agent;
        }
        if let Some(mode) = lookup("SITE_ANALYZER_MODE") {
            config.mode = AuditMode::from_deep_enabled(mode.eq_ignore_ascii_case("deep"));
        }
        if let Some(bin) = lookup("SITE_ANALYZER_LIGHTHOUSE_BIN").filter(|v| !v.is_empty()) {
            config.lighthouse_bin = PathBuf::from(bin);
        }
        if let Some(secs) =
            lookup("SITE_ANALYZER_LIGHTHOUSE_TIMEOUT_SECS").and_then(|v| v.parse().ok())
        {
            config.lighthouse_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = lookup("SITE_ANALYZER_DATABASE_URL").filter(|v| !v.is_empty()) {
            config.database_url = url;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn environment_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("SITE_ANALYZER_TIMEOUT_SECS", "5"),
            ("SITE_ANALYZER_MODE", "DEEP"),
            ("SITE_ANALYZER_DATABASE_URL", "sqlite::memory:"),
        ]);
        let config = AnalyzerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.mode, AuditMode::Deep);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.lighthouse_timeout, Duration::from_secs(120));
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let config = AnalyzerConfig::from_lookup(|k| {
            (k == "SITE_ANALYZER_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.mode, AuditMode::Light);
    }
}
