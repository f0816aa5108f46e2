//! Traffic Control — creative performance metrics and sales funnel reports.
//!
//! Loads a creative record file, runs the reporting engine for the selected
//! filters and prints the derived views as JSON on stdout. Logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use traffic_core::config::{AppConfig, LoggingConfig};
use traffic_core::filter::MetricsFilter;
use traffic_core::source::{JsonFileSource, RecordSource};
use traffic_core::types::CreativeRecord;
use traffic_reporting::{
    agent_breakdown, rank_creatives, Aggregator, CreativeRanking, FunnelInsights, FunnelStage,
    MetricsCache, ReportBuilder,
};

#[derive(Parser, Debug)]
#[command(name = "traffic-control")]
#[command(about = "Creative performance metrics and course sales funnel reports")]
#[command(version)]
struct Cli {
    /// JSON file with creative records (overrides config)
    #[arg(long, global = true, env = "TRAFFIC_CONTROL__REPORTING__RECORDS_PATH")]
    records: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Roll-up KPIs for a platform selection
    Metrics {
        /// all, facebook, youtube, tiktok or other
        #[arg(long)]
        platform: Option<String>,
        /// day, week, month, quarter or year
        #[arg(long)]
        period: Option<String>,
    },
    /// Seven-stage sales funnel over every record
    Funnel,
    /// Spend, revenue and KPIs per platform
    Platforms,
    /// Ad manager performance and ratings
    Agents {
        #[arg(long)]
        platform: Option<String>,
    },
    /// Per-creative performance, ranked
    Creatives {
        #[arg(long)]
        platform: Option<String>,
        /// roi or revenue
        #[arg(long, default_value = "roi")]
        sort: String,
        /// Keep only the top N creatives
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Full dashboard report
    Report {
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        period: Option<String>,
    },
}

#[derive(Serialize)]
struct FunnelView<'a> {
    stages: &'a [FunnelStage],
    insights: FunnelInsights,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn resolve_filter(
    config: &AppConfig,
    platform: Option<&str>,
    period: Option<&str>,
) -> anyhow::Result<MetricsFilter> {
    let platform = platform.unwrap_or(&config.reporting.default_platform);
    let period = period.unwrap_or(&config.reporting.default_period);
    MetricsFilter::parse(platform, period).context("invalid filter selection")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config.logging);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    // Apply CLI overrides
    if let Some(records) = &cli.records {
        config.reporting.records_path = records.display().to_string();
    }
    config.validate()?;

    let source = JsonFileSource::new(&config.reporting.records_path);
    let snapshot = source
        .snapshot()
        .with_context(|| format!("failed to load records from {}", source.path().display()))?;

    info!(
        records = snapshot.len(),
        version = snapshot.version,
        command = ?cli.command,
        "Running report command"
    );

    let cache = Arc::new(MetricsCache::new(config.reporting.cache_max_entries));

    match &cli.command {
        Commands::Metrics { platform, period } => {
            let filter = resolve_filter(&config, platform.as_deref(), period.as_deref())?;
            emit(&cache.metrics(&snapshot, &filter), cli.pretty)?;
        }
        Commands::Funnel => {
            let stages = cache.funnel(&snapshot);
            let view = FunnelView {
                stages: &stages,
                insights: FunnelInsights::from_stages(&stages),
            };
            emit(&view, cli.pretty)?;
        }
        Commands::Platforms => {
            emit(&Aggregator::platform_breakdown(&snapshot.records[..]), cli.pretty)?;
        }
        Commands::Agents { platform } => {
            let filter = resolve_filter(&config, platform.as_deref(), None)?;
            let selected: Vec<&CreativeRecord> = snapshot
                .records
                .iter()
                .filter(|r| filter.matches(r))
                .collect();
            emit(&agent_breakdown(&selected), cli.pretty)?;
        }
        Commands::Creatives {
            platform,
            sort,
            limit,
        } => {
            let filter = resolve_filter(&config, platform.as_deref(), None)?;
            let ranking: CreativeRanking = sort.parse().context("invalid creative ranking")?;
            let selected: Vec<&CreativeRecord> = snapshot
                .records
                .iter()
                .filter(|r| filter.matches(r))
                .collect();
            emit(&rank_creatives(&selected, ranking, *limit), cli.pretty)?;
        }
        Commands::Report { platform, period } => {
            let filter = resolve_filter(&config, platform.as_deref(), period.as_deref())?;
            let report = ReportBuilder::new(cache).build(&snapshot, &filter);
            println!("{}", report.to_json(cli.pretty)?);
        }
    }

    Ok(())
}
