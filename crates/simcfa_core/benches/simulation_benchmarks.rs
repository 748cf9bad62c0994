//! Criterion benchmarks for simcfa_core simulation
//!
//! Run with: cargo bench -p simcfa_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use simcfa_core::config::{BondPreset, BondSchedule, BondSpec, SimulationConfig, StrategyConfig};
use simcfa_core::events::EventKind;
use simcfa_core::strategies::recorder::StateRecorder;
use simcfa_core::valuation::compound_growth;

fn create_monthly_config(years: i32) -> SimulationConfig {
    SimulationConfig::new(years * 365, jiff::civil::date(2025, 1, 1))
        .initial_cash(50_000_00)
        .strategy(StrategyConfig::MonthlyCashMove {
            amount: 6_000_00,
            day_of_month: 1,
            start_date: None,
            end_date: None,
        })
        .strategy(StrategyConfig::MonthlyCashMove {
            amount: -4_500_00,
            day_of_month: 10,
            start_date: None,
            end_date: None,
        })
        .strategy(StrategyConfig::BondPurchase {
            quantity: 10,
            bond: BondSpec::preset(BondPreset::OneYear),
            schedule: BondSchedule::Monthly {
                day_of_month: 15,
                until: None,
            },
        })
        .strategy(StrategyConfig::DebtFinancing { rate_percent: 18.0 })
        .strategy(StrategyConfig::DebtPayback {
            monthly_budget: 1_000_00,
            day_of_month: 20,
        })
}

fn bench_horizons(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_horizon");

    for years in [1, 10, 30] {
        let config = create_monthly_config(years);
        group.bench_with_input(BenchmarkId::from_parameter(years), &config, |b, config| {
            b.iter(|| {
                let sim = config.build().unwrap();
                black_box(sim.run().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_example_with_recorder(c: &mut Criterion) {
    let config = SimulationConfig::example();

    c.bench_function("example_with_state_recorder", |b| {
        b.iter(|| {
            let mut sim = config.build().unwrap();
            let recorder = StateRecorder::new();
            sim.subscribe(EventKind::DayEnded, recorder.handler());
            sim.run().unwrap();
            black_box(recorder.take())
        });
    });
}

fn bench_compound_growth(c: &mut Criterion) {
    c.bench_function("compound_growth", |b| {
        b.iter(|| compound_growth(black_box(6.6), black_box(2.5), black_box(12)));
    });
}

criterion_group!(
    benches,
    bench_horizons,
    bench_example_with_recorder,
    bench_compound_growth
);
criterion_main!(benches);
