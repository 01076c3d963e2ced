// Command-line entry point for privacy-policy acquisition

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;

#[derive(Parser)]
#[command(name = "privacy-corpus", version, about = "Locate, fetch and assemble privacy-policy content")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the privacy-policy URL for a site
    Locate {
        /// Absolute site URL, e.g. https://example.com
        site: String,
    },
    /// Fetch one page and print it as JSON
    Fetch {
        url: String,
        /// Skip the plain HTTP fetch and render in headless Chromium
        #[arg(long)]
        render: bool,
    },
    /// Assemble the full privacy corpus for a site and print it as JSON
    Assemble {
        /// Absolute site URL, e.g. https://example.com
        site: String,
        /// Known policy URL; skips discovery
        #[arg(long)]
        policy_url: Option<String>,
        /// Fall back to primary-only acquisition if the full pipeline fails
        #[arg(long)]
        fallback: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,privacy_corpus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Locate { site } => commands::locate(&config, &site).await,
        Command::Fetch { url, render } => commands::fetch(&config, &url, render).await,
        Command::Assemble {
            site,
            policy_url,
            fallback,
        } => commands::assemble(&config, &site, policy_url.as_deref(), fallback).await,
    }
}
