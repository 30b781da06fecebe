//! Random trade books for benchmarking and demo data.
//!
//! Generates an internal book of several legs per month and a clearer view
//! of the same deals netted per month, with a configurable share of months
//! deliberately broken so reconciliation has something to find.

use crate::core::error::ReconError;
use crate::core::period::{Month, PeriodKey};
use crate::core::trade::{ContractType, TradeLeg, TradeTable};
use crate::reconciliation::netting::NettingEngine;
use rand::Rng;
use rust_decimal::Decimal;

/// Configuration for a generated pair of books.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// First delivery month.
    pub start_month: Month,
    /// Number of consecutive delivery months.
    pub months: usize,
    /// Internal legs generated per month.
    pub trades_per_month: usize,
    /// Minimum leg quantity (MWh).
    pub min_quantity: Decimal,
    /// Maximum leg quantity (MWh).
    pub max_quantity: Decimal,
    /// Minimum price (EUR/MWh).
    pub min_price: Decimal,
    /// Maximum price (EUR/MWh).
    pub max_price: Decimal,
    /// Probability that the clearer's view of a month is off.
    pub break_probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_month: Month::from_parts(2025, 1),
            months: 12,
            trades_per_month: 4,
            min_quantity: Decimal::from(10),
            max_quantity: Decimal::from(500),
            min_price: Decimal::from(20),
            max_price: Decimal::from(150),
            break_probability: 0.2,
        }
    }
}

fn random_decimal<R: Rng>(rng: &mut R, min: Decimal, max: Decimal, dp: u32) -> Decimal {
    let min_f64: f64 = min.to_string().parse().unwrap_or(0.0);
    let max_f64: f64 = max.to_string().parse().unwrap_or(min_f64);
    if max_f64 <= min_f64 {
        return min.round_dp(dp);
    }
    Decimal::from_f64_retain(rng.gen_range(min_f64..max_f64))
        .unwrap_or(min)
        .round_dp(dp)
}

/// Generate an internal book using the thread-local RNG.
pub fn generate_trade_book(config: &GeneratorConfig) -> TradeTable {
    generate_trade_book_with(config, &mut rand::thread_rng())
}

/// Generate an internal book: `trades_per_month` legs for each month.
pub fn generate_trade_book_with<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> TradeTable {
    let mut book = TradeTable::new();
    let mut month = config.start_month;
    let mut trade_id = 1u64;

    for _ in 0..config.months {
        for _ in 0..config.trades_per_month {
            let quantity = random_decimal(rng, config.min_quantity, config.max_quantity, 0);
            let price = random_decimal(rng, config.min_price, config.max_price, 2);
            if quantity > Decimal::ZERO {
                book.add(
                    TradeLeg::new(PeriodKey::from(month), quantity, price)
                        .with_trade_id(trade_id)
                        .with_contract_type(ContractType::Other("Monthly".to_string())),
                );
                trade_id += 1;
            }
        }
        month = month.next();
    }
    book
}

/// Generate an internal book and a clearer view of it using the thread-local RNG.
pub fn generate_book_pair(config: &GeneratorConfig) -> Result<(TradeTable, TradeTable), ReconError> {
    generate_book_pair_with(config, &mut rand::thread_rng())
}

/// Generate an internal book and the clearer's netted view of it.
///
/// Both returned tables hold one row per month (the internal book is netted
/// too, so the pair can be reconciled directly). Each clearer month is, with
/// `break_probability`, off by a random quantity, a random price, or missing.
pub fn generate_book_pair_with<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<(TradeTable, TradeTable), ReconError> {
    let internal = NettingEngine::net_monthly(&generate_trade_book_with(config, rng))?;

    let mut clearer = TradeTable::new();
    for leg in &internal {
        if !rng.gen_bool(config.break_probability.clamp(0.0, 1.0)) {
            clearer.add(leg.clone());
            continue;
        }
        match rng.gen_range(0..3) {
            0 => {
                let delta = Decimal::from(rng.gen_range(-50i64..=50));
                clearer.add(TradeLeg::new(
                    leg.period().clone(),
                    leg.quantity_mwh() + delta,
                    leg.price_eur_per_mwh(),
                ));
            }
            1 => {
                let delta = Decimal::new(rng.gen_range(-500i64..=500), 2);
                clearer.add(TradeLeg::new(
                    leg.period().clone(),
                    leg.quantity_mwh(),
                    leg.price_eur_per_mwh() + delta,
                ));
            }
            _ => {} // month missing at the clearer
        }
    }
    Ok((internal, clearer))
}
