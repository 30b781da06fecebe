use criterion::{black_box, criterion_group, criterion_main, Criterion};
use power_recon::reconciliation::engine::reconcile_trades;
use power_recon::reconciliation::netting::NettingEngine;
use power_recon::simulation::generator::{generate_book_pair, generate_trade_book, GeneratorConfig};
use power_recon::simulation::scenario::run_scenario;
use power_recon::simulation::shock::{ShockKind, ShockSpec};
use rust_decimal::Decimal;

fn bench_netting_10_trades_per_month(c: &mut Criterion) {
    let config = GeneratorConfig {
        months: 24,
        trades_per_month: 10,
        ..Default::default()
    };
    let book = generate_trade_book(&config);

    c.bench_function("netting_24m_x10", |b| {
        b.iter(|| NettingEngine::net_monthly(black_box(&book)))
    });
}

fn bench_reconcile_120_months(c: &mut Criterion) {
    let config = GeneratorConfig {
        months: 120,
        ..Default::default()
    };
    let (internal, clearer) = generate_book_pair(&config).expect("generated legs are positive");

    c.bench_function("reconcile_120m", |b| {
        b.iter(|| reconcile_trades(black_box(&internal), black_box(&clearer)))
    });
}

fn bench_scenario_120_months(c: &mut Criterion) {
    let config = GeneratorConfig {
        months: 120,
        ..Default::default()
    };
    let (internal, clearer) = generate_book_pair(&config).expect("generated legs are positive");

    let mut shocks = ShockSpec::new();
    for period in internal.periods().iter().step_by(3) {
        shocks.set(period.clone(), ShockKind::PricePct, Decimal::new(15, 2));
        shocks.set(period.clone(), ShockKind::QtyAbs, Decimal::from(-25));
    }

    c.bench_function("scenario_120m", |b| {
        b.iter(|| run_scenario(black_box(&internal), black_box(&clearer), Some(&shocks), None))
    });
}

criterion_group!(
    benches,
    bench_netting_10_trades_per_month,
    bench_reconcile_120_months,
    bench_scenario_120_months
);
criterion_main!(benches);
