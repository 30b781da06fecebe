//! Stress-testing a reconciliation.
//!
//! Reconciles two small books, then replays the reconciliation under a
//! price spike and a volume correction.

use power_recon::core::trade::{TradeLeg, TradeTable};
use power_recon::reconciliation::summary::{print_reconciliation_summary, ReconciliationSummary};
use power_recon::simulation::scenario::{run_scenario, run_scenarios, Scenario};
use power_recon::simulation::shock::{ShockKind, ShockSpec};
use rust_decimal_macros::dec;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("╔════════════════════════════════════════╗");
    println!("║  power-recon: Stress Scenario Example  ║");
    println!("╚════════════════════════════════════════╝\n");

    let internal: TradeTable = vec![
        TradeLeg::new("2025-04", dec!(100), dec!(30)),
        TradeLeg::new("2025-05", dec!(120), dec!(33)),
        TradeLeg::new("2025-06", dec!(100), dec!(41.2)),
    ]
    .into_iter()
    .collect();
    let clearer: TradeTable = vec![
        TradeLeg::new("2025-04", dec!(90), dec!(30)),
        TradeLeg::new("2025-05", dec!(120), dec!(33)),
        TradeLeg::new("2025-06", dec!(100), dec!(41.0)),
    ]
    .into_iter()
    .collect();

    // --- Scenario 1: Baseline ---
    println!("━━━ Scenario 1: Baseline ━━━\n");
    let baseline = run_scenario(&internal, &clearer, None, None).expect("books are netted");
    print_reconciliation_summary(&baseline);

    // --- Scenario 2: April price spike on the internal book only ---
    println!("━━━ Scenario 2: Internal April Price +10% ━━━\n");
    let spike = ShockSpec::new()
        .with("2025-04", ShockKind::PricePct, dec!(0.10))
        .with("2025-13", ShockKind::PricePct, dec!(0.10)); // logged and skipped
    let shocked = run_scenario(&internal, &clearer, Some(&spike), None).expect("books are netted");
    print_reconciliation_summary(&shocked);

    // --- Scenario 3: A batch of named scenarios ---
    println!("━━━ Scenario 3: Scenario Batch ━━━\n");
    let scenarios = vec![
        Scenario::new("clearer books missing 10 MWh")
            .with_clearer(ShockSpec::new().with("2025-04", ShockKind::QtyAbs, dec!(10))),
        Scenario::new("both sides spike 20%")
            .with_internal(ShockSpec::new().with("2025-06", ShockKind::PricePct, dec!(0.2)))
            .with_clearer(ShockSpec::new().with("2025-06", ShockKind::PricePct, dec!(0.2))),
    ];
    for outcome in run_scenarios(&internal, &clearer, &scenarios).expect("books are netted") {
        let ReconciliationSummary {
            breaks,
            net_quantity_diff,
            net_price_diff,
            ..
        } = outcome.summary;
        println!(
            "  {:<32} breaks: {:>2}  Δqty: {:>8}  Δpx: {:>8}",
            outcome.name, breaks, net_quantity_diff, net_price_diff
        );
    }
}
