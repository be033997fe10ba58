//! crawlsift CLI: config scaffolding, admission checks, and report rendering

use anyhow::Result;
use clap::{Parser, Subcommand};
use crawlsift::{
    config::Config,
    crawl::UrlAdmission,
    report::ReportAggregator,
    store::DurableStore,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crawlsift")]
#[command(about = "Decision core for a focused-domain web crawler")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "crawlsift.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Check whether a URL passes admission for the configured scope
    Check {
        /// URL to check
        url: String,
    },

    /// Render the report from persisted crawl state
    Report {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            let config_path = path.join("crawlsift.toml");
            let config = Config::default();
            std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;
            println!("Wrote default configuration to {}", config_path.display());
            Ok(())
        }
        Commands::Check { url } => {
            let config = Config::load(&cli.config)?;
            config.logging.init();

            let admission = UrlAdmission::new(&config.scope);
            if admission.admit(&url) {
                println!("admitted: {}", url);
            } else {
                println!("rejected: {}", url);
            }
            Ok(())
        }
        Commands::Report { format } => {
            let config = Config::load(&cli.config)?;
            config.logging.init();

            // Resume mode: rendering must never wipe persisted state
            let store = DurableStore::open(&config.data_dir, true)?;
            let report = ReportAggregator::load(config.report.clone(), &store)?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report.snapshot())?),
                _ => print!("{}", report.render()),
            }
            Ok(())
        }
    }
}
