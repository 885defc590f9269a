//! SpreadWatch runner: configuration, the monitor pipeline, report and
//! chart rendering, and webhook delivery.
//!
//! Builds on `spreadwatch-core`, which owns the data model and analytics.

pub mod config;
pub mod notify;
pub mod reporting;
pub mod runner;

pub use config::{default_basket, CommodityConfig, ConfigError, MonitorConfig, NotifyConfig};
pub use notify::{
    Delivery, DiscordNotifier, Notification, Notifier, NotifyError, NullNotifier,
    RecordingNotifier,
};
pub use reporting::{
    export_frame_csv, render_chart, render_report, write_frame_csv, ChartImage, ChartStyle,
    Report, ReportContext,
};
pub use runner::{
    analyze, fetch_window, run_monitor, MonitorFrame, MonitorOutcome, OutcomeSummary, RunContext,
    RunError,
};
