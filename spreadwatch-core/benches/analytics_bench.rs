//! Criterion benchmarks for the analytic core.
//!
//! Benchmarks:
//! 1. Series alignment over ragged calendars
//! 2. Composite index + spread + slope + classification on an aligned table

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spreadwatch_core::data::{align_series, PriceSeries, PriceTable};
use spreadwatch_core::domain::{CostFactors, CostWeights, InstrumentId};
use spreadwatch_core::metrics::{composite_cost_index, profit_spread, Cumulation};
use spreadwatch_core::signals::ClassifierInput;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize, phase: f64, skip_every: usize) -> PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .filter(|i| skip_every == 0 || i % skip_every != 0)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1 + phase).sin() * 10.0;
            (base_date + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

fn make_table(n: usize) -> PriceTable {
    let mut table = PriceTable::new();
    table.insert("LEAD".into(), make_series(n, 0.0, 7));
    table.insert("RUB".into(), make_series(n, 0.5, 0));
    table.insert("OIL".into(), make_series(n, 1.0, 11));
    table.insert("FX".into(), make_series(n, 1.5, 13));
    table
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_series");
    for n in [90, 180, 1000] {
        let input = make_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| align_series(black_box(input)).unwrap())
        });
    }
    group.finish();
}

fn bench_spread(c: &mut Criterion) {
    let factors = CostFactors {
        primary: "RUB".into(),
        secondary: "OIL".into(),
        fx: "FX".into(),
    };
    let leader = InstrumentId::from("LEAD");
    let weights = CostWeights::default();

    let mut group = c.benchmark_group("spread_and_classify");
    for n in [90, 180, 1000] {
        let table = align_series(&make_table(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &table, |b, table| {
            b.iter(|| {
                let cost = composite_cost_index(table, &factors, &weights, Cumulation::Additive);
                let spread = profit_spread(table, &leader, &cost, Cumulation::Additive);
                let slope = spread.slope(5);
                ClassifierInput::at_latest(table, &leader, &spread, &slope).classify()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_align, bench_spread);
criterion_main!(benches);
