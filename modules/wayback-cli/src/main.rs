//! wayback-lens: explore a domain's history in the Wayback Machine.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use cdx_client::CdxClient;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wayback_analysis::aggregate::DEFAULT_TOP_FOLDERS;
use wayback_analysis::ExportFilter;
use wayback_common::Config;

mod commands;
mod progress;
mod render;

#[derive(Parser)]
#[command(name = "wayback-lens")]
#[command(about = "Explore a domain's archived history in the Wayback Machine")]
#[command(version)]
struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Attempts per index page before it is skipped (overrides WAYBACK_MAX_ATTEMPTS)
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Pause after each index page in milliseconds (overrides WAYBACK_PAGE_DELAY_MS)
    #[arg(long, global = true)]
    page_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every archived capture under a domain and summarise it
    Harvest { domain: String },

    /// Captures per year per top-level folder
    Folders {
        domain: String,

        /// Folders shown individually; the rest are grouped as Other
        #[arg(long, default_value_t = DEFAULT_TOP_FOLDERS)]
        top: usize,
    },

    /// Captures per year per HTTP status class
    Status { domain: String },

    /// Pages ranked by how many distinct versions were archived
    Changes {
        domain: String,

        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Also list the most recent captures of this URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Distinct archived versions of robots.txt
    Robots { domain: String },

    /// Diff two archived robots.txt versions
    RobotsDiff {
        domain: String,

        /// Timestamp of the older version
        from: String,

        /// Timestamp of the newer version
        to: String,
    },

    /// Write captured URLs to CSV
    Export {
        domain: String,

        /// all, html, or html-images
        #[arg(long, default_value = "all")]
        filter: ExportFilter,

        /// Keep only the first capture of each URL
        #[arg(long)]
        unique: bool,

        /// Output path (default: <domain>_filtered_urls.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    let _ = dotenvy::dotenv();

    if let Err(e) = init_tracing() {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("wayback=info".parse()?)
                .add_directive("cdx_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::from_env().context("Invalid WAYBACK_* configuration")?;
    if let Some(attempts) = cli.max_attempts {
        config.max_attempts = attempts.max(1);
    }
    if let Some(ms) = cli.page_delay_ms {
        config.page_delay = Duration::from_millis(ms);
    }
    config.log_summary();

    let client = CdxClient::new(&config).context("Failed to build HTTP client")?;
    let ctx = commands::Ctx {
        client,
        json: cli.json,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Harvest { domain } => commands::harvest(&ctx, &domain).await,
        Commands::Folders { domain, top } => commands::folders(&ctx, &domain, top).await,
        Commands::Status { domain } => commands::status(&ctx, &domain).await,
        Commands::Changes { domain, top, url } => {
            commands::changes(&ctx, &domain, top, url.as_deref()).await
        }
        Commands::Robots { domain } => commands::robots(&ctx, &domain).await,
        Commands::RobotsDiff { domain, from, to } => {
            commands::robots_diff(&ctx, &domain, &from, &to).await
        }
        Commands::Export {
            domain,
            filter,
            unique,
            out,
        } => commands::export(&ctx, &domain, filter, unique, out).await,
    }
}
