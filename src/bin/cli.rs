//! Heston MC CLI
//!
//! Prices an option from live or manually supplied market data and prints the
//! JSON response to stdout. Logs go to stderr; set `RUST_LOG` to adjust.

use std::path::PathBuf;
use std::process;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use heston_mc::prelude::*;

#[derive(Parser)]
#[command(
    name = "hmc",
    version,
    about = "Heston Monte Carlo pricer for American and European equity options"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price with simulation (American and European)
    Price(PriceArgs),
    /// Black-Scholes price only; no simulation, no network
    ClosedForm(ClosedFormArgs),
}

#[derive(Args)]
struct PriceArgs {
    /// Underlying symbol
    #[arg(long)]
    ticker: String,

    /// call or put
    #[arg(long)]
    kind: String,

    #[arg(long)]
    strike: f64,

    /// Time to expiry in years
    #[arg(long)]
    expiry: f64,

    /// Number of simulated paths
    #[arg(long, default_value_t = 5000)]
    paths: usize,

    /// Fix the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Spot price; with --vol, skips the market data providers
    #[arg(long, requires = "vol")]
    spot: Option<f64>,

    /// Annualized volatility for an offline run
    #[arg(long, requires = "spot")]
    vol: Option<f64>,

    /// Historical dividend as DATE:AMOUNT (repeatable, offline only)
    #[arg(long = "dividend", value_parser = parse_dividend, requires = "spot")]
    dividends: Vec<RawDividend>,

    /// Engine configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Market data cache directory
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ClosedFormArgs {
    /// call or put
    #[arg(long)]
    kind: OptionType,

    #[arg(long)]
    spot: f64,

    #[arg(long)]
    strike: f64,

    /// Time to expiry in years
    #[arg(long)]
    expiry: f64,

    #[arg(long)]
    vol: f64,

    #[arg(long, default_value_t = 0.0438)]
    rate: f64,

    /// Continuous dividend yield
    #[arg(long, default_value_t = 0.0)]
    dividend_yield: f64,
}

fn parse_dividend(s: &str) -> Result<RawDividend, String> {
    let (date, amount) = s
        .split_once(':')
        .ok_or_else(|| format!("expected DATE:AMOUNT, got '{}'", s))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("bad date '{}': {}", date, e))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|e| format!("bad amount '{}': {}", amount, e))?;
    Ok(RawDividend {
        payment_date: Some(date),
        amount,
    })
}

fn run_price(args: PriceArgs) -> PricerResult<serde_json::Value> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let engine = PricingEngine::new(config)?;

    let request = PricingRequest {
        ticker: args.ticker.clone(),
        option_type: args.kind.clone(),
        strike: args.strike,
        time_to_expiry: args.expiry,
        paths: args.paths,
    };

    let response = match (args.spot, args.vol) {
        (Some(spot), Some(vol)) => {
            let today = Utc::now().date_naive();
            let dividends = forecast_dividend_schedule(
                &args.dividends,
                today,
                engine.config().risk_free_rate,
            );
            let snapshot = MarketSnapshot::new(args.ticker.trim().to_uppercase(), spot, vol)
                .with_dividends(dividends);
            tracing::info!("Offline run for {}", snapshot.ticker);
            PricingService::new(engine, StaticMarketData::new(snapshot)).price(&request)?
        }
        _ => {
            let mut cache = CacheConfig::default();
            if let Some(dir) = args.cache_dir {
                cache.cache_dir = dir;
            }
            let rate = engine.config().risk_free_rate;
            let source = MarketDataService::from_env(cache, ApiLimits::default(), rate)?;
            PricingService::new(engine, source).price(&request)?
        }
    };

    Ok(serde_json::to_value(response)?)
}

fn run_closed_form(args: ClosedFormArgs) -> PricerResult<serde_json::Value> {
    let price = price_closed_form(
        args.kind,
        args.spot,
        args.strike,
        args.expiry,
        args.vol,
        args.rate,
        args.dividend_yield,
    )?;
    Ok(serde_json::json!({
        "option_type": args.kind,
        "spot": args.spot,
        "strike": args.strike,
        "time_to_expiry": args.expiry,
        "vol": args.vol,
        "rate": args.rate,
        "dividend_yield": args.dividend_yield,
        "eu_option_price": price,
    }))
}

fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Price(args) => run_price(args),
        Commands::ClosedForm(args) => run_closed_form(args),
    };

    match result.and_then(|value| Ok(serde_json::to_string_pretty(&value)?)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!(kind = ?e.kind(), "{}", e);
            process::exit(1);
        }
    }
}
