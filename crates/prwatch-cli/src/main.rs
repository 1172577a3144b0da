mod enrich;
mod logging;
mod output;
mod scan;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "prwatch")]
#[command(about = "Find sponsored (PR) videos on a channel and export them as CSV")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a channel's uploads and write the PR video table
    Scan {
        /// Channel ID to scan (e.g., UC...)
        #[arg(long)]
        channel: String,
        /// API key for the catalog service; overrides `YOUTUBE_API_KEY`
        #[arg(long)]
        api_key: Option<String>,
        /// Only consider the most recent N uploads
        #[arg(long)]
        max_videos: Option<usize>,
        /// Directory for `pr_videos.csv`; overrides `PRWATCH_OUTPUT_DIR`
        #[arg(long)]
        output: Option<PathBuf>,
        /// Log at debug level regardless of `PRWATCH_LOG_LEVEL`
        #[arg(long)]
        debug: bool,
    },
    /// Fill missing product/sponsor columns of an existing PR table
    Enrich {
        /// PR table previously written by `scan`
        #[arg(long)]
        input: PathBuf,
        /// Destination CSV (defaults to `<output dir>/pr_videos_enriched.csv`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn debug(&self) -> bool {
        matches!(self.command, Commands::Scan { debug: true, .. })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match prwatch_core::load_app_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_path = match logging::init(&config, cli.debug()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("error: failed to initialise logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(log_file = %log_path.display(), ?config, "configuration loaded");

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "prwatch failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &prwatch_core::AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Scan {
            channel,
            api_key,
            max_videos,
            output,
            debug: _,
        } => {
            let options = scan::ScanOptions {
                channel_id: channel,
                api_key,
                max_videos,
                output_dir: output,
            };
            let report = scan::run_scan(&options, config).await?;
            println!(
                "wrote {} PR videos (of {} scanned) to {}",
                report.pr_videos,
                report.scanned,
                report.path.display()
            );
        }
        Commands::Enrich { input, output } => {
            let report = enrich::run_enrich(&input, output.as_deref(), config)?;
            println!(
                "enriched {} rows ({} products, {} sponsors filled) into {}",
                report.rows,
                report.products_filled,
                report.sponsors_filled,
                report.path.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
