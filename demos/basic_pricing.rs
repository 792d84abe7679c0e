//! Example: American vs European call on a dividend payer
//!
//! Run with: cargo run --example basic_pricing

use chrono::{Duration, Utc};
use heston_mc::prelude::*;

fn main() -> PricerResult<()> {
    let spot = 40.0;
    let strike = 38.0;
    let time = 0.75;
    let vol = 0.18;
    let paths = 5000;

    // Quarterly 0.68 payments, the last one three weeks ago
    let today = Utc::now().date_naive();
    let history: Vec<RawDividend> = (0..4)
        .map(|i| RawDividend {
            payment_date: Some(today - Duration::days(21 + 91 * i)),
            amount: 0.68,
        })
        .collect();

    let config = EngineConfig::seeded(7);
    let dividends = forecast_dividend_schedule(&history, today, config.risk_free_rate);
    let snapshot = MarketSnapshot::new("DEMO", spot, vol).with_dividends(dividends);

    println!("=== Heston Monte Carlo Pricing ===\n");
    println!("Spot:     ${:.2}", spot);
    println!("Strike:   ${:.2}", strike);
    println!("Time:     {:.2} years ({:.0} days)", time, time * 365.0);
    println!("Vol:      {:.1}%", vol * 100.0);
    println!("Paths:    {}\n", paths);

    let engine = PricingEngine::new(config)?;

    for kind in [OptionType::Call, OptionType::Put] {
        let result = engine.price_option(kind, &snapshot, strike, time, paths)?;

        println!("=== {} ===\n", kind);
        println!(
            "American:           ${:.4} (se {:.4})",
            result.american_price, result.american_se
        );
        println!("European (closed):  ${:.4}", result.european_price);
        println!(
            "European (sim):     ${:.4} (se {:.4})",
            result.european_mc_price, result.european_se
        );
        println!("Early exercises:    {}\n", result.early_exercises);
    }

    let period = snapshot.dividends.forecast_for_period(today, time);
    println!("=== Dividends in horizon ===\n");
    for d in &period.dividends {
        println!("  {}  ${:.4}", d.date, d.amount);
    }
    println!("  Total: ${:.4}", period.total);
    println!(
        "  Effective yield: {:.2}%",
        snapshot.dividends.effective_yield(spot) * 100.0
    );

    Ok(())
}
