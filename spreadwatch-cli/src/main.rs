//! SpreadWatch CLI: run the sector spread monitor once, or print the config.
//!
//! Commands:
//! - `run`: fetch, analyse, render and publish one report
//! - `config`: print the effective, validated configuration as TOML

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use spreadwatch_core::data::{
    CommodityQuote, CommoditySource, CsvProvider, FixedQuote, InvestingScraper, MarketDataProvider,
    YahooProvider,
};
use spreadwatch_runner::{
    run_monitor, write_frame_csv, Delivery, DiscordNotifier, MonitorConfig, Notifier, NullNotifier,
    RunContext,
};

#[derive(Parser)]
#[command(
    name = "spreadwatch",
    about = "SpreadWatch: sector profit-spread monitor with webhook reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor once and publish the report.
    Run {
        /// Path to a TOML config file. Defaults to the built-in tire-sector basket.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Invocation date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        as_of: Option<String>,

        /// Read closes from a long-format CSV (date,symbol,close) instead of Yahoo.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Skip the commodity scrape and use the configured fallback price.
        #[arg(long, default_value_t = false)]
        offline_quote: bool,

        /// Print the report instead of posting it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Also write the chart SVG here.
        #[arg(long)]
        chart_out: Option<PathBuf>,

        /// Also write the per-row analysis CSV here.
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            as_of,
            csv,
            offline_quote,
            dry_run,
            chart_out,
            csv_out,
        } => run_cmd(RunArgs {
            config,
            as_of,
            csv,
            offline_quote,
            dry_run,
            chart_out,
            csv_out,
        }),
        Commands::Config { config } => config_cmd(config.as_deref()),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let config = match path {
        Some(p) => MonitorConfig::from_file(p)?,
        None => MonitorConfig::default(),
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn config_cmd(path: Option<&Path>) -> Result<()> {
    let config = load_config(path)?;
    let text = toml::to_string_pretty(&config).context("Failed to serialise config")?;
    print!("{text}");
    Ok(())
}

struct RunArgs {
    config: Option<PathBuf>,
    as_of: Option<String>,
    csv: Option<PathBuf>,
    offline_quote: bool,
    dry_run: bool,
    chart_out: Option<PathBuf>,
    csv_out: Option<PathBuf>,
}

fn run_cmd(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let as_of = args
        .as_of
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--as-of must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let market: Box<dyn MarketDataProvider> = match &args.csv {
        Some(path) => Box::new(CsvProvider::new(path)),
        None => Box::new(YahooProvider::new()?),
    };

    let commodity: Box<dyn CommoditySource> = if args.offline_quote {
        Box::new(FixedQuote(CommodityQuote::fallback_at(
            config.commodity.fallback_price,
            "offline",
        )))
    } else {
        Box::new(InvestingScraper::new(
            &config.commodity.url,
            Duration::from_secs(config.commodity.timeout_secs),
            config.commodity.fallback_price,
        ))
    };

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(NullNotifier)
    } else {
        Box::new(DiscordNotifier::new(
            config.notify.webhook_url.clone(),
            &config.notify.username,
        )?)
    };

    let ctx = RunContext {
        market: market.as_ref(),
        commodity: commodity.as_ref(),
        notifier: notifier.as_ref(),
        as_of,
        generated_at: chrono::Local::now().naive_local(),
    };

    info!(monitor = %config.name, %as_of, "starting run");
    let outcome = run_monitor(&config, &ctx)?;

    if let Some(path) = &args.chart_out {
        std::fs::write(path, &outcome.chart.bytes)
            .with_context(|| format!("Failed to write chart {}", path.display()))?;
        info!(path = %path.display(), "chart written");
    }
    if let Some(path) = &args.csv_out {
        write_frame_csv(path, &outcome.frame)?;
        info!(path = %path.display(), "analysis CSV written");
    }

    if args.dry_run {
        println!("{}\n\n{}", outcome.report.title, outcome.report.body);
    }

    let summary = outcome.summary();
    println!(
        "Signal: {} ({})  spread {:+.2}%  slope {}  rows {}  dataset {}",
        summary.signal.signal,
        summary.signal.reason,
        summary.spread_pct,
        summary
            .slope_pct
            .map(|k| format!("{k:+.2}%"))
            .unwrap_or_else(|| "N/A".to_string()),
        summary.rows,
        outcome.dataset_hash.short(),
    );
    match &outcome.delivery {
        Delivery::Sent { image_attached } => {
            println!("Notification sent (chart attached: {image_attached})")
        }
        Delivery::Skipped { reason } => println!("Notification skipped: {reason}"),
        Delivery::Failed { reason } => println!("Notification failed: {reason}"),
    }
    for warning in &outcome.data_quality_warnings {
        println!("Warning: {warning}");
    }
    Ok(())
}
