//! Benchmarks for repayment planning and execution

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chronovyan_bench::{DebtBenchmark, GeneratorConfig, Scenario, ScenarioGenerator};
use chronovyan_core::{OperationType, Resources};
use chronovyan_debt::{strategy_for, DebtTracker, StrategyKind, TrackerConfig};

fn bench_plan(c: &mut Criterion) {
    let scenario = ScenarioGenerator::new(GeneratorConfig::heavy()).generate();
    let budget = Resources::new(scenario.chronons, scenario.aethel);

    let mut group = c.benchmark_group("plan");
    for kind in StrategyKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind.name()), &kind, |b, &kind| {
            b.iter(|| black_box(strategy_for(kind).plan(black_box(&scenario.debts), budget)))
        });
    }
    group.finish();
}

fn bench_apply(c: &mut Criterion) {
    let mut tracker = DebtTracker::new();
    let scenario = Scenario::find("balanced").expect("standard scenario");
    scenario.install(&mut tracker).expect("scenario fits");
    let snapshot = tracker.snapshot();

    c.bench_function("apply_critical_first_balanced", |b| {
        b.iter(|| {
            tracker.restore(snapshot.clone());
            black_box(tracker.apply_repayment_strategy(StrategyKind::CriticalFirst))
        })
    });
}

fn bench_run_all(c: &mut Criterion) {
    let mut bench = DebtBenchmark::with_config(TrackerConfig::lenient());
    let scenario = ScenarioGenerator::new(GeneratorConfig::heavy()).generate();
    bench.load_generated(&scenario).expect("generated scenario fits");

    c.bench_function("run_all_sequential", |b| {
        b.iter(|| black_box(bench.run_all_strategies()))
    });

    c.bench_function("run_all_parallel", |b| {
        b.iter(|| black_box(bench.run_all_strategies_parallel()))
    });
}

fn bench_paradox_risk(c: &mut Criterion) {
    let tracker = DebtTracker::new();

    c.bench_function("project_paradox_risk", |b| {
        b.iter(|| {
            black_box(tracker.project_paradox_risk(
                black_box(OperationType::ParadoxInsertion),
                black_box(12),
                black_box(3),
            ))
        })
    });
}

criterion_group!(benches, bench_plan, bench_apply, bench_run_all, bench_paradox_risk);
criterion_main!(benches);
