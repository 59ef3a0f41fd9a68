use std::process::ExitCode;

use clap::Parser;

use site_analyzer::cli::{Cli, Commands};
use site_analyzer::commands::{self, AnalyzeOptions, CommandOutput};
use site_analyzer::lifecycle;
use site_analyzer::repository::AnalysisStore;

#[tokio::main]
async fn main() -> ExitCode {
    lifecycle::init_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output.body);
            if output.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<CommandOutput> {
    let mut config = cli.base_config();

    match cli.command {
        Commands::Analyze {
            url,
            mode,
            format,
            report,
            output,
            save,
            timeout,
            lighthouse_bin,
        } => {
            if let Some(mode) = mode {
                config.mode = mode.into();
            }
            if let Some(secs) = timeout {
                config.request_timeout = std::time::Duration::from_secs(secs);
            }
            if let Some(bin) = lighthouse_bin {
                config.lighthouse_bin = bin;
            }

            let store = if save {
                Some(lifecycle::open_store(&config).await?)
            } else {
                None
            };
            let analyzer = lifecycle::build_analyzer(config)?;
            let options = AnalyzeOptions {
                url,
                format,
                report,
                output,
                save,
            };
            commands::analyze(&analyzer, store.as_ref().map(|s| s as &dyn AnalysisStore), &options).await
        }
        Commands::History { url, format } => {
            let store = lifecycle::open_store(&config).await?;
            commands::history(&store, &url, format).await
        }
        Commands::Details { id, format } => {
            let store = lifecycle::open_store(&config).await?;
            commands::details(&store, id, format).await
        }
        Commands::Websites { format } => {
            let store = lifecycle::open_store(&config).await?;
            commands::websites(&store, format).await
        }
        Commands::Prompt { url, mode } => {
            if let Some(mode) = mode {
                config.mode = mode.into();
            }
            let analyzer = lifecycle::build_analyzer(config)?;
            commands::prompt(&analyzer, &url).await
        }
        Commands::Advise { input, format } => commands::advise(&input, format).await,
    }
}
