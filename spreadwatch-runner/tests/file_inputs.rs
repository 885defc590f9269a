//! Runs driven by a TOML config file and a long-format CSV price file.

use std::io::Write;

use chrono::NaiveDate;
use spreadwatch_core::data::{CommodityQuote, CsvProvider, FixedQuote};
use spreadwatch_core::metrics::Cumulation;
use spreadwatch_core::signals::Signal;
use spreadwatch_runner::{run_monitor, write_frame_csv, MonitorConfig, NullNotifier, RunContext};

const CONFIG: &str = r#"
name = "Cost Squeeze Check"
lookback_days = 30
slope_window = 2
cumulation = "compounding"

[weights]
primary = 0.5
secondary = 0.5
fx = 0.0

[[instruments]]
id = "LEAD"
label = "Leader Co"
role = "leader"

[[instruments]]
id = "RAW"
label = "Raw Input"
role = "cost_primary"

[[instruments]]
id = "OIL"
label = "Oil"
role = "cost_secondary"

[[instruments]]
id = "FX"
label = "FX"
role = "fx"
"#;

const PRICES: &str = "\
date,symbol,close
2024-05-01,LEAD,100
2024-05-02,LEAD,100
2024-05-03,LEAD,99
2024-05-06,LEAD,98
2024-05-01,RAW,50
2024-05-02,RAW,55
2024-05-03,RAW,60
2024-05-06,RAW,66
2024-05-01,OIL,80
2024-05-02,OIL,84
2024-05-03,OIL,88
2024-05-06,OIL,92
2024-05-01,FX,31
2024-05-02,FX,31
2024-05-03,FX,31
2024-05-06,FX,31
";

#[test]
fn config_and_csv_files_drive_a_sell_run() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("monitor.toml");
    std::fs::write(&config_path, CONFIG).unwrap();
    let prices_path = dir.path().join("prices.csv");
    let mut f = std::fs::File::create(&prices_path).unwrap();
    f.write_all(PRICES.as_bytes()).unwrap();

    let config = MonitorConfig::from_file(&config_path).unwrap();
    assert_eq!(config.cumulation, Cumulation::Compounding);
    assert!(config.scraped().is_none());
    config.validate().unwrap();

    let provider = CsvProvider::new(&prices_path);
    let quote = FixedQuote(CommodityQuote::fetched(1.0, 0.0));
    let as_of = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let ctx = RunContext {
        market: &provider,
        commodity: &quote,
        notifier: &NullNotifier,
        as_of,
        generated_at: as_of.and_hms_opt(8, 30, 0).unwrap(),
    };

    let outcome = run_monitor(&config, &ctx).unwrap();
    assert!(outcome.quote.is_none());
    assert_eq!(outcome.frame.table.len(), 4);
    assert_eq!(outcome.frame.assessment.signal, Signal::Sell);
    assert_eq!(outcome.report.title, "Avoid / Sell - Cost Squeeze Check");
    assert!(!outcome.report.body.contains("synthesised"));

    let out = dir.path().join("frame.csv");
    write_frame_csv(&out, &outcome.frame).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 5);
    assert!(written.starts_with("date,FX,LEAD,OIL,RAW,"));
}
