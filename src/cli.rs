use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{AnalyzerConfig, AuditMode};
use crate::service::ReportKind;

#[derive(Parser, Debug)]
#[command(name = "site-analyzer")]
#[command(about = "Website SEO, performance, content and security analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database used for stored analyses
    #[arg(long, global = true, env = "SITE_ANALYZER_DATABASE_URL")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one page
    Analyze {
        /// Page URL (http or https)
        url: String,

        /// Probe selection
        #[arg(long, value_enum, env = "SITE_ANALYZER_MODE")]
        mode: Option<ModeArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Report kind for text output (full, seo, performance, security)
        #[arg(short, long, default_value = "full")]
        report: ReportKind,

        /// Also write the text report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store the result in the database
        #[arg(long)]
        save: bool,

        /// Page fetch timeout in seconds
        #[arg(long, env = "SITE_ANALYZER_TIMEOUT_SECS")]
        timeout: Option<u64>,

        /// Lighthouse executable used in deep mode
        #[arg(long, env = "SITE_ANALYZER_LIGHTHOUSE_BIN")]
        lighthouse_bin: Option<PathBuf>,
    },

    /// Show the stored score trend for a URL
    History {
        url: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the stored details of one analysis
    Details {
        id: i64,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List every analyzed website with its latest scores
    Websites {
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze a page and print the prompt for an external advisor
    Prompt {
        url: String,

        #[arg(long, value_enum, env = "SITE_ANALYZER_MODE")]
        mode: Option<ModeArg>,
    },

    /// Parse a numbered advisor answer into structured recommendations
    Advise {
        /// File holding the advisor's answer
        input: PathBuf,

        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// HTTP fetch only, fallback performance score
    Light,
    /// Lighthouse audit and network resource list
    Deep,
}

impl From<ModeArg> for AuditMode {
    fn from(mode: ModeArg) -> Self {
        AuditMode::from_deep_enabled(mode == ModeArg::Deep)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Environment-derived config with the global flags applied.
    pub fn base_config(&self) -> AnalyzerConfig {
        let mut config = AnalyzerConfig::from_env();
        if let Some(database) = &self.database {
            config.database_url = database.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from([
            "site-analyzer",
            "analyze",
            "https://example.com",
            "--mode",
            "deep",
            "--format",
            "json",
            "--report",
            "security",
            "--save",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                url,
                mode,
                format,
                report,
                save,
                ..
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(mode.map(AuditMode::from), Some(AuditMode::Deep));
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(report, ReportKind::Security);
                assert!(save);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_database_flag() {
        let cli = Cli::try_parse_from([
            "site-analyzer",
            "websites",
            "--database",
            "sqlite::memory:",
        ])
        .unwrap();

        assert_eq!(cli.base_config().database_url, "sqlite::memory:");
        assert!(matches!(
            cli.command,
            Commands::Websites {
                format: OutputFormat::Text
            }
        ));
    }

    #[test]
    fn test_parse_advise() {
        let cli = Cli::try_parse_from(["site-analyzer", "advise", "answer.txt"]).unwrap();
        match cli.command {
            Commands::Advise { input, format } => {
                assert_eq!(input, PathBuf::from("answer.txt"));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_report_kind_falls_back_to_full() {
        let cli = Cli::try_parse_from(["site-analyzer", "analyze", "https://example.com", "-r", "pdf"])
            .unwrap();
        match cli.command {
            Commands::Analyze { report, .. } => assert_eq!(report, ReportKind::Full),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
