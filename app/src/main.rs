// In app/src/main.rs

use analytics::{aggregate_summaries, normalize_trades, RunSummary, SeriesBuilder};
use anyhow::Result;
use app_config::Settings;
use clap::{Parser, Subcommand};
use core_types::Mode;
use heartbeat::Heartbeat;
use result_store::{ResultName, ResultStore};
use std::time::Duration;
use tracing_subscriber::prelude::*;
use web_server::format::{format_currency, format_metrics, format_percentage};
use web_server::sections::summary_sections;

mod heartbeat;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "A dashboard for backtest and live trading results.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serves the dashboard API.
    Serve,

    /// Prints the summary and equity statistics of one result.
    Summary {
        /// The result name (e.g., "BTC-USDT_1d_2024").
        name: String,

        /// Which results to read: "backtest" or "live".
        #[arg(short, long)]
        mode: Option<Mode>,
    },

    /// Prints the combined summary of every result.
    Compare {
        /// Which results to read: "backtest" or "live".
        #[arg(short, long)]
        mode: Option<Mode>,
    },

    /// Sends heartbeat pings to a running dashboard.
    Ping {
        /// Base URL of the dashboard (e.g., "http://localhost:3000").
        #[arg(long, env = "SERVER_URL")]
        server_url: String,

        /// Send a single ping and exit.
        #[arg(long)]
        once: bool,
    },
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings()?;
    init_tracing(&settings.app.log_level);
    tracing::info!(environment = %settings.app.environment, "Application settings loaded successfully.");

    match cli.command {
        Commands::Serve => {
            web_server::run(&settings).await?;
        }
        Commands::Summary { name, mode } => {
            handle_summary(&settings, &name, mode).await?;
        }
        Commands::Compare { mode } => {
            handle_compare(&settings, mode).await?;
        }
        Commands::Ping { server_url, once } => {
            handle_ping(&settings, &server_url, once).await?;
        }
    }

    Ok(())
}

/// Installs the `fmt` subscriber, filtered at the configured level.
fn init_tracing(log_level: &str) {
    let (level, known) = match log_level.parse::<tracing::Level>() {
        Ok(level) => (level, true),
        Err(_) => (tracing::Level::INFO, false),
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new().with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();

    if !known {
        tracing::warn!(log_level, "Unknown log level, falling back to INFO.");
    }
}

// --- "Summary" Subcommand Logic ---

async fn handle_summary(settings: &Settings, name: &str, mode: Option<Mode>) -> Result<()> {
    let mode = mode.unwrap_or(settings.data.default_mode);
    let store = ResultStore::for_mode(&settings.data, mode);
    let name = ResultName::parse(name)?;

    let bundle = store.load_result(&name).await?;
    let trades = normalize_trades(&bundle.trades);
    let series = SeriesBuilder::new(settings.analytics.initial_capital).build(&trades);
    tracing::info!(name = name.as_str(), %mode, trades = trades.len(), "Loaded result.");

    println!("\n--- {} ({mode}) ---", name.as_str());
    for section in summary_sections(&bundle.summary) {
        println!("\n[{}]", section.title);
        for item in section.items {
            println!("  - {}: {}", item.label, item.display);
        }
    }

    println!("\n[Equity Curve]");
    println!("  - trades: {}", series.len());
    if let Some(final_equity) = series.final_equity() {
        println!("  - final equity: {}", format_currency(final_equity));
    }
    match series.max_drawdown() {
        Some(worst) => println!(
            "  - max drawdown: {} ({}) from a peak of {}",
            format_currency(worst.absolute_drawdown),
            format_percentage(worst.drawdown_pct),
            format_currency(worst.peak_equity),
        ),
        None => println!("  - max drawdown: N/A"),
    }
    println!();

    Ok(())
}

// --- "Compare" Subcommand Logic ---

async fn handle_compare(settings: &Settings, mode: Option<Mode>) -> Result<()> {
    let mode = mode.unwrap_or(settings.data.default_mode);
    let store = ResultStore::for_mode(&settings.data, mode);

    let summaries: Vec<RunSummary> = store
        .load_all_summaries()
        .await?
        .into_iter()
        .map(|s| s.summary)
        .collect();

    let Some(aggregate) = aggregate_summaries(&summaries) else {
        println!("No backtest summaries found.");
        return Ok(());
    };

    println!("\n--- Combined Results ({mode}) ---");
    for metric in format_metrics(&aggregate.metrics()) {
        println!("  - {}: {}", metric.label, metric.display);
    }
    println!();

    Ok(())
}

// --- "Ping" Subcommand Logic ---

async fn handle_ping(settings: &Settings, server_url: &str, once: bool) -> Result<()> {
    let heartbeat = Heartbeat::new(server_url, Duration::from_secs(settings.ping.interval_secs.max(1)))?;

    if once {
        let message = heartbeat.send().await?;
        tracing::info!(endpoint = heartbeat.endpoint(), %message, "Ping sent.");
        return Ok(());
    }

    heartbeat.run().await
}
