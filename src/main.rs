use analytics::{AnalyticsEngine, DEFAULT_ROLLING_WINDOW, SimulationOutcome, SimulationParams};
use anyhow::{Context, bail};
use api_client::{MfApiClient, ValuationSource};
use clap::{Args, Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, LogFormat};
use core_types::ValuationSeries;
use portfolio::{PortfolioSummarizer, SummaryOptions};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::to_string_pretty;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use web_server::StoreHandle;

/// The main entry point for the Navscope analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; DATABASE_URL may come from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(configuration::DEFAULT_CONFIG_FILE));
    let mut config = configuration::load_config(Some(&config_path))
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Schemes(args) => handle_schemes(&config, args).await,
        Commands::Risk(args) => handle_risk(&config, args).await,
        Commands::Predict(args) => handle_predict(&config, args).await,
        Commands::Heatmap(args) => handle_heatmap(&config, args).await,
        Commands::Compare(args) => handle_compare(&config, args).await,
        Commands::Summary(args) => handle_summary(&config, args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Risk, growth and Monte Carlo analytics for mutual fund portfolios.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured console log format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// List or search the scheme directory.
    Schemes(SchemesArgs),
    /// Annualized volatility, return and Sharpe ratio of one scheme.
    Risk(SchemeArgs),
    /// Monte Carlo projection of one scheme's NAV.
    Predict(PredictArgs),
    /// Average day-over-day NAV change per calendar month.
    Heatmap(SchemeArgs),
    /// Align the NAV histories of several schemes by date.
    Compare(CompareArgs),
    /// Summarize a user's stored portfolio.
    Summary(SummaryArgs),
}

#[derive(Args)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct SchemesArgs {
    /// Case-insensitive substring of the scheme name.
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
struct SchemeArgs {
    /// The scheme code (e.g., "118550").
    scheme_code: String,
    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PredictArgs {
    #[command(flatten)]
    scheme: SchemeArgs,
    #[arg(long)]
    simulations: Option<usize>,
    /// Horizon in trading days.
    #[arg(long)]
    days: Option<usize>,
    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct CompareArgs {
    /// Scheme codes, comma separated or repeated.
    #[arg(required = true, value_delimiter = ',')]
    scheme_codes: Vec<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SummaryArgs {
    user_id: String,
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn source(config: &Config) -> anyhow::Result<Arc<dyn ValuationSource>> {
    let client = MfApiClient::new(
        &config.valuation_source.base_url,
        config.valuation_source.request_timeout,
    )?;
    Ok(Arc::new(client))
}

fn engine(config: &Config) -> AnalyticsEngine {
    AnalyticsEngine::new(
        config.analytics.trading_days_per_year,
        config.analytics.risk_free_rate,
    )
}

/// Fetches and cleans one scheme's history, failing if nothing usable is left.
async fn load_series(
    source: &dyn ValuationSource,
    engine: &AnalyticsEngine,
    scheme_code: &str,
) -> anyhow::Result<ValuationSeries> {
    let records = source
        .historical_nav(scheme_code)
        .await
        .with_context(|| format!("Failed to fetch NAV history for {scheme_code}"))?;
    Ok(engine.normalize_required(scheme_code, &records)?)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

async fn handle_schemes(config: &Config, args: SchemesArgs) -> anyhow::Result<()> {
    let source = source(config)?;
    let schemes = match args.search.as_deref() {
        Some(query) => source.search_schemes(query).await?,
        None => source.list_schemes().await?,
    };

    let mut table = new_table(vec!["Scheme Code", "Scheme Name"]);
    for (code, name) in &schemes {
        table.add_row(vec![code.as_str(), name.as_str()]);
    }
    println!("{table}");
    println!("{} scheme(s)", schemes.len());
    Ok(())
}

async fn handle_risk(config: &Config, args: SchemeArgs) -> anyhow::Result<()> {
    let engine = engine(config);
    let series = load_series(source(config)?.as_ref(), &engine, &args.scheme_code).await?;
    let metrics = engine.risk_metrics(&series);

    if args.json {
        println!("{}", to_string_pretty(&metrics)?);
        return Ok(());
    }

    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec!["Observations".to_string(), metrics.returns.len().to_string()]);
    table.add_row(vec![
        "Annualized Volatility".to_string(),
        format!("{:.4}", metrics.annualized_volatility),
    ]);
    table.add_row(vec![
        "Annualized Return".to_string(),
        format!("{:.4}", metrics.annualized_return),
    ]);
    table.add_row(vec!["Sharpe Ratio".to_string(), format!("{:.4}", metrics.sharpe_ratio)]);
    table.add_row(vec![
        "Max Drawdown".to_string(),
        format!("{:.4}", engine.max_drawdown(&series)),
    ]);
    let latest_rolling = engine
        .rolling_volatility(&series, DEFAULT_ROLLING_WINDOW)
        .last()
        .map_or_else(|| "N/A".to_string(), |p| format!("{:.4}", p.rolling_volatility));
    table.add_row(vec![
        format!("Rolling Volatility ({DEFAULT_ROLLING_WINDOW}d)"),
        latest_rolling,
    ]);
    println!("{table}");
    Ok(())
}

async fn handle_predict(config: &Config, args: PredictArgs) -> anyhow::Result<()> {
    let engine = engine(config);
    let series = load_series(source(config)?.as_ref(), &engine, &args.scheme.scheme_code).await?;

    let params = SimulationParams {
        num_simulations: args.simulations.unwrap_or(config.analytics.num_simulations),
        days: args.days.unwrap_or(config.analytics.horizon_days),
        batches: config.analytics.simulation_batches,
    };
    if params.num_simulations == 0 || params.days == 0 {
        bail!("--simulations and --days must be positive");
    }
    let mut rng = match args.seed.or(config.analytics.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let outcome = engine.simulate(&series, &params, &mut rng);
    if args.scheme.json {
        println!("{}", to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SimulationOutcome::InsufficientData | SimulationOutcome::NoData => {
            println!("{}", outcome.message().unwrap_or_default());
        }
        SimulationOutcome::Completed(result) => {
            let mut table = new_table(vec!["Metric", "Value"]);
            table.add_row(vec!["Last NAV".to_string(), format!("{:.4}", result.last_value)]);
            table.add_row(vec![
                format!("Expected NAV ({} days)", params.days),
                format!("{:.4}", result.expected_value),
            ]);
            table.add_row(vec![
                "Probability of Gain".to_string(),
                format!("{:.2}%", result.probability_positive),
            ]);
            table.add_row(vec!["5th Percentile".to_string(), format!("{:.4}", result.lower_p5)]);
            table.add_row(vec!["95th Percentile".to_string(), format!("{:.4}", result.upper_p95)]);
            println!("{table}");
        }
    }
    Ok(())
}

async fn handle_heatmap(config: &Config, args: SchemeArgs) -> anyhow::Result<()> {
    let engine = engine(config);
    let series = load_series(source(config)?.as_ref(), &engine, &args.scheme_code).await?;
    let entries = engine.heatmap(&series);

    if args.json {
        println!("{}", to_string_pretty(&entries)?);
        return Ok(());
    }

    let mut table = new_table(vec!["Month", "Avg Daily Change"]);
    for entry in &entries {
        table.add_row(vec![entry.month.to_string(), format!("{:.6}", entry.average_change)]);
    }
    println!("{table}");
    Ok(())
}

async fn handle_compare(config: &Config, args: CompareArgs) -> anyhow::Result<()> {
    let engine = engine(config);
    let source = source(config)?;

    let mut series = BTreeMap::new();
    for code in args.scheme_codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        match load_series(source.as_ref(), &engine, code).await {
            Ok(history) => {
                series.insert(code.to_string(), history);
            }
            Err(e) => {
                tracing::warn!(
                    scheme_code = code,
                    error = %e,
                    "Leaving scheme out of the comparison."
                )
            }
        }
    }
    if series.is_empty() {
        bail!("None of the requested schemes has usable NAV data");
    }

    let rows = engine.compare(&series);
    if args.json {
        println!("{}", to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut header = vec!["Date"];
    header.extend(series.keys().map(String::as_str));
    let mut table = new_table(header);
    for row in &rows {
        let mut cells = vec![row.date.to_string()];
        cells.extend(row.values.values().map(|value| match value {
            Some(v) => format!("{v:.4}"),
            None => "-".to_string(),
        }));
        table.add_row(cells);
    }
    println!("{table}");
    Ok(())
}

async fn handle_summary(config: &Config, args: SummaryArgs) -> anyhow::Result<()> {
    let store = match web_server::open_store(&config.database).await {
        StoreHandle::Ready(store) => store,
        StoreHandle::Degraded(reason) => bail!("Portfolio store unavailable: {reason}"),
    };
    let items = store.list_items(&args.user_id).await?;
    let holdings: Vec<_> = items.iter().map(|item| item.to_holding()).collect();

    let summarizer = PortfolioSummarizer::new(
        source(config)?,
        engine(config),
        SimulationParams {
            num_simulations: config.analytics.num_simulations,
            days: config.analytics.horizon_days,
            batches: config.analytics.simulation_batches,
        },
        SummaryOptions {
            max_concurrent_fetches: config.portfolio.max_concurrent_fetches,
            holding_timeout: config.portfolio.holding_timeout,
            seed: config.analytics.seed,
        },
    );
    let summary = summarizer.summarize(&holdings).await;

    if args.json {
        println!("{}", to_string_pretty(&summary)?);
        return Ok(());
    }

    let na = || "N/A".to_string();
    let mut table = new_table(vec![
        "Name",
        "Type",
        "Latest NAV",
        "1Y Growth",
        "Expected NAV",
        "P(Gain)",
        "Volatility",
        "Sharpe",
    ]);
    for row in &summary.items {
        let simulation = row.simulation.as_option();
        let risk = row.risk.as_option();
        table.add_row(vec![
            row.name.clone(),
            row.item_type.to_string(),
            row.latest_value.as_option().map_or_else(na, |v| format!("{v:.4}")),
            row.one_year_growth_percent
                .as_option()
                .map_or_else(na, |v| format!("{v:.2}%")),
            simulation.map_or_else(na, |s| format!("{:.4}", s.expected_nav)),
            simulation.map_or_else(na, |s| format!("{:.2}%", s.probability_positive)),
            risk.map_or_else(na, |r| format!("{:.4}", r.volatility)),
            risk.map_or_else(na, |r| format!("{:.4}", r.sharpe_ratio)),
        ]);
    }
    println!("{table}");
    println!("Total latest NAV: {:.4}", summary.total_latest_value);
    Ok(())
}
