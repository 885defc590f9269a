//! End-to-end scenarios for the analytic core: align → composite → spread → classify.

use chrono::NaiveDate;
use spreadwatch_core::data::{align_series, PriceSeries, PriceTable};
use spreadwatch_core::domain::{CostFactors, CostWeights, InstrumentId};
use spreadwatch_core::metrics::{
    composite_cost_index, profit_spread, resolve_latest, Cumulation, DEFAULT_SLOPE_WINDOW,
};
use spreadwatch_core::signals::{classifier::REASON_INSUFFICIENT, ClassifierInput, Signal};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn day(i: usize) -> NaiveDate {
    d("2024-03-01") + chrono::Duration::days(i as i64)
}

fn series(closes: &[f64]) -> PriceSeries {
    closes.iter().enumerate().map(|(i, c)| (day(i), *c)).collect()
}

fn factors() -> CostFactors {
    CostFactors {
        primary: "RUB".into(),
        secondary: "BZ=F".into(),
        fx: "TWD=X".into(),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "actual={actual}, expected={expected}"
    );
}

/// Leader returns [0, +1%, +2%]; composite cost [0, -0.5%, +0.2%].
#[test]
fn three_row_example_scenario() {
    let mut input = PriceTable::new();
    input.insert("LEAD".into(), series(&[100.0, 101.0, 103.02]));
    // Only the primary factor moves; with weight 1.0 its change is the composite.
    input.insert("RUB".into(), series(&[200.0, 199.0, 199.398]));
    input.insert("BZ=F".into(), series(&[80.0, 80.0, 80.0]));
    input.insert("TWD=X".into(), series(&[32.0, 32.0, 32.0]));
    let table = align_series(&input).unwrap();

    let weights = CostWeights::new(1.0, 0.0, 0.0).unwrap();
    let cost = composite_cost_index(&table, &factors(), &weights, Cumulation::Additive);
    assert_close(cost.change[1], -0.005);
    assert_close(cost.change[2], 0.002);
    assert_close(cost.cumulative[2], -0.003);

    let spread = profit_spread(&table, &"LEAD".into(), &cost, Cumulation::Additive);
    assert_close(spread.leader_cumulative[1], 0.01);
    assert_close(spread.leader_cumulative[2], 0.03);
    assert_eq!(spread.values[0], 0.0);
    assert_close(spread.values[1], 0.015);
    assert_close(spread.values[2], 0.033);

    let slope = spread.slope(DEFAULT_SLOPE_WINDOW);
    let input = ClassifierInput::at_latest(&table, &"LEAD".into(), &spread, &slope);
    let assessment = input.classify();
    assert_eq!(assessment.signal, Signal::Neutral);
    assert_eq!(assessment.reason, REASON_INSUFFICIENT);
}

#[test]
fn ragged_calendars_buy_scenario() {
    // Leader climbs steadily; Tokyo is closed on day 3.
    let mut leader: PriceSeries = series(&[100.0, 101.0, 102.0, 0.0, 104.0, 105.0, 106.0, 107.0]);
    leader.remove(&day(3));

    let mut input = PriceTable::new();
    input.insert("LEAD".into(), leader);
    input.insert("RUB".into(), series(&[185.0; 8]));
    input.insert("BZ=F".into(), series(&[80.0, 80.0, 79.5, 79.0, 79.0, 78.5, 78.0, 78.0]));
    input.insert("TWD=X".into(), series(&[32.0; 8]));
    let table = align_series(&input).unwrap();

    let leader_id = InstrumentId::from("LEAD");
    assert_eq!(table.raw(&leader_id).unwrap()[3], None);
    assert_eq!(table.filled(&leader_id).unwrap()[3], 102.0);

    let cost = composite_cost_index(&table, &factors(), &CostWeights::default(), Cumulation::Additive);
    let spread = profit_spread(&table, &leader_id, &cost, Cumulation::Additive);
    let slope = spread.slope(DEFAULT_SLOPE_WINDOW);

    for (t, s) in slope.values.iter().enumerate() {
        if t < DEFAULT_SLOPE_WINDOW {
            assert!(s.is_none());
        } else {
            assert_close(s.unwrap(), spread.values[t] - spread.values[t - DEFAULT_SLOPE_WINDOW]);
        }
    }

    let assessment = ClassifierInput::at_latest(&table, &leader_id, &spread, &slope).classify();
    assert_eq!(assessment.signal, Signal::Buy);

    // The gap day is never reported as an observation.
    let obs = resolve_latest(&table, &leader_id, day(7)).unwrap();
    assert_eq!(obs.value, 107.0);
    assert!(obs.is_current);
}

#[test]
fn falling_leader_with_rising_costs_is_sell() {
    let mut input = PriceTable::new();
    input.insert("LEAD".into(), series(&[100.0, 99.0, 98.0, 97.0, 96.0, 95.0, 94.0]));
    input.insert("RUB".into(), series(&[185.0, 186.0, 187.0, 188.0, 189.0, 190.0, 191.0]));
    input.insert("BZ=F".into(), series(&[80.0; 7]));
    input.insert("TWD=X".into(), series(&[32.0; 7]));
    let table = align_series(&input).unwrap();

    let cost = composite_cost_index(&table, &factors(), &CostWeights::default(), Cumulation::Compounding);
    let spread = profit_spread(&table, &"LEAD".into(), &cost, Cumulation::Compounding);
    assert_eq!(spread.values[0], 0.0);

    let slope = spread.slope(DEFAULT_SLOPE_WINDOW);
    let assessment = ClassifierInput::at_latest(&table, &"LEAD".into(), &spread, &slope).classify();
    assert_eq!(assessment.signal, Signal::Sell);
}

#[test]
fn leader_holiday_on_latest_session_still_buys() {
    // Leader gains 2% a session for eight sessions, then Tokyo is closed
    // while the cost markets trade on.
    let mut closes = vec![100.0];
    for _ in 1..8 {
        let last = *closes.last().unwrap();
        closes.push(last * 1.02);
    }
    let mut input = PriceTable::new();
    input.insert("LEAD".into(), series(&closes));
    input.insert("RUB".into(), series(&[185.0; 9]));
    input.insert("BZ=F".into(), series(&[80.0; 9]));
    input.insert("TWD=X".into(), series(&[32.0; 9]));
    let table = align_series(&input).unwrap();

    let leader_id = InstrumentId::from("LEAD");
    assert_eq!(table.len(), 9);
    assert_eq!(table.raw(&leader_id).unwrap()[8], None);

    let cost = composite_cost_index(&table, &factors(), &CostWeights::default(), Cumulation::Additive);
    let spread = profit_spread(&table, &leader_id, &cost, Cumulation::Additive);
    let slope = spread.slope(DEFAULT_SLOPE_WINDOW);
    let input = ClassifierInput::at_latest(&table, &leader_id, &spread, &slope);

    assert_close(input.spread, 0.14);
    assert!(input.slope.unwrap() > 0.0);
    assert!(input.leader_rising);
    assert_eq!(input.classify().signal, Signal::Buy);
}
