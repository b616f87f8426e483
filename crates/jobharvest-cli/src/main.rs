mod harvest;
mod stats;

use clap::{Parser, Subcommand};
use jobharvest_core::Platform;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jobharvest")]
#[command(about = "Harvest job listings from LinkedIn, Indeed, Naukri, and Internshala")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one harvest cycle and print the result as JSON
    Run {
        /// Only harvest these platforms (repeatable); defaults to every enabled platform
        #[arg(long = "platform")]
        platforms: Vec<Platform>,
        /// Override the page count of every platform
        #[arg(long)]
        pages: Option<u32>,
        /// Write to an in-memory store instead of Postgres
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete listings posted more than N days ago
    Sweep {
        /// Defaults to `JOBHARVEST_RETENTION_DAYS`
        #[arg(
            long,
            value_parser = clap::value_parser!(u32)
                .range(1..=i64::from(jobharvest_core::MAX_RETENTION_DAYS))
        )]
        max_age_days: Option<u32>,
    },
    /// Run harvest cycles on the configured interval until interrupted
    Daemon,
    /// Show listing counts per platform and distinct companies/locations
    Stats {
        /// Include inactive listings
        #[arg(long)]
        all: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = jobharvest_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run {
            platforms,
            pages,
            dry_run,
        }) => harvest::run_once(&config, &platforms, pages, dry_run).await?,
        Some(Commands::Sweep { max_age_days }) => {
            harvest::run_sweep(&config, max_age_days.unwrap_or(config.retention_days)).await?;
        }
        Some(Commands::Daemon) => harvest::run_daemon(&config).await?,
        Some(Commands::Stats { all }) => stats::print_stats(&config, all).await?,
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        None => {
            println!("jobharvest: no command given; try `jobharvest --help`");
        }
    }

    Ok(())
}

async fn run_db(config: &jobharvest_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = jobharvest_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            jobharvest_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = jobharvest_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
