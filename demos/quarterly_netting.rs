//! Quarterly decomposition and monthly netting example.
//!
//! Splits quarterly contracts into monthly legs, nets them, and reconciles
//! the result against a clearer's monthly statement.

use power_recon::core::trade::{ContractType, TradeLeg, TradeTable};
use power_recon::decomposition::quarterly::{
    add_monthly_legs_to_trades, decompose_table, CalendarPolicy, DecomposeConfig, DEFAULT_QUARTER,
};
use power_recon::reconciliation::engine::reconcile_trades;
use power_recon::reconciliation::netting::NettingEngine;
use power_recon::reconciliation::summary::print_reconciliation_summary;
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  power-recon: Quarterly Netting Example  ║");
    println!("╚══════════════════════════════════════════╝\n");

    let quarterly: TradeTable = vec![
        TradeLeg::new("Q2-25", dec!(300), dec!(32.4))
            .with_trade_id(1)
            .with_contract_type("Quarterly"),
        TradeLeg::new("Q2-25", dec!(100), dec!(30))
            .with_trade_id(2)
            .with_contract_type("Quarterly"),
    ]
    .into_iter()
    .collect();

    println!("━━━ Monthly Legs ━━━\n");
    let legs = add_monthly_legs_to_trades(&quarterly);
    println!("{}", legs);

    println!("━━━ Net Monthly Positions ━━━\n");
    let net = NettingEngine::net_monthly(&legs).expect("quarters have non-zero volume");
    println!("{}", net);

    let clearer: TradeTable = vec![
        TradeLeg::new("2025-04", dec!(133), dec!(31.8)),
        TradeLeg::new("2025-05", dec!(133), dec!(31.8)),
        TradeLeg::new("2025-06", dec!(130), dec!(31.8)),
    ]
    .into_iter()
    .map(|leg| leg.with_contract_type(ContractType::NetMonthlyTrade))
    .collect();

    let result = reconcile_trades(&net, &clearer).expect("both books are netted");
    print_reconciliation_summary(&result);

    println!("━━━ Quarter Taken From Each Row ━━━\n");
    let config = DecomposeConfig {
        calendar: CalendarPolicy::FromPeriod {
            fallback: DEFAULT_QUARTER,
        },
        ..Default::default()
    };
    let q3: TradeTable = vec![TradeLeg::new("Q3-25", dec!(90), dec!(36))].into_iter().collect();
    println!("{}", decompose_table(&q3, &config));
}
