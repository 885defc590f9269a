//! Report text, chart rendering and CSV export.

pub mod chart;
pub mod export;
pub mod report;

pub use chart::{render_chart, ChartImage, ChartStyle, PlottedSeries};
pub use export::{export_frame_csv, write_frame_csv};
pub use report::{format_observation, render_report, Report, ReportContext};
