use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use footfall::analytics::ReportEngine;
use footfall::config::DatabaseConfig;
use footfall::export::encode_visits;
use footfall::storage::{self, StorageError};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "footfall-admin")]
#[command(about = "Footfall visit tracking admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage blacklisted addresses
    Blacklist {
        #[command(subcommand)]
        action: BlacklistAction,
    },
    /// Show total and unique visitor counts
    Stats,
    /// Show visit counts per address
    Report,
    /// Export all visits as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum BlacklistAction {
    /// Add an address to the blacklist
    Add {
        /// Address to block
        ip: String,
    },
    /// List blacklisted addresses
    List,
    /// Check whether an address is blacklisted
    Check {
        /// Address to look up
        ip: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let database = DatabaseConfig::from_env()?;
    let storage = storage::connect(&database).await?;

    match cli.command {
        Commands::Blacklist { action } => match action {
            BlacklistAction::Add { ip } => match storage.add_to_blacklist(ip.trim()).await {
                Ok(entry) => println!("✓ Blacklisted '{}' (id {})", entry.ip_address, entry.id),
                Err(StorageError::Duplicate(ip)) => println!("⚠ '{}' is already blacklisted", ip),
                Err(e) => return Err(e.into()),
            },
            BlacklistAction::List => {
                let ips = storage.list_blacklist().await?;
                if ips.is_empty() {
                    println!("No blacklisted addresses.");
                } else {
                    for ip in ips {
                        println!("{}", ip);
                    }
                }
            }
            BlacklistAction::Check { ip } => {
                if storage.is_blacklisted(&ip).await? {
                    println!("'{}' is blacklisted", ip);
                } else {
                    println!("'{}' is not blacklisted", ip);
                }
            }
        },
        Commands::Stats => {
            let stats = ReportEngine::new(storage).stats().await?;
            println!("Total visits:    {}", stats.total);
            println!("Unique visitors: {}", stats.unique_visitors);
        }
        Commands::Report => {
            let report = ReportEngine::new(storage).report().await?;
            if report.is_empty() {
                println!("No visits recorded.");
            } else {
                println!("{:<40} {}", "IP Address", "Visits");
                println!("{}", "-".repeat(50));
                for (ip, count) in report {
                    println!("{:<40} {}", ip, count);
                }
            }
        }
        Commands::Export { output } => {
            let visits = storage.list_visits().await?;
            let bytes = encode_visits(&visits)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("✓ Exported {} visits to {}", visits.len(), path.display());
                }
                None => {
                    std::io::stdout()
                        .write_all(&bytes)
                        .context("Failed to write CSV to stdout")?;
                }
            }
        }
    }

    Ok(())
}
