//! Single-shot monitor pipeline.
//!
//! quote commodity → fetch closes → add synthesised series → align →
//! composite cost → spread + slope → classify → chart → report → notify.
//!
//! Only market-data and alignment failures abort the run. A failed scrape
//! has already degraded to a fallback quote, and a failed notification is
//! logged and recorded in the outcome.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use spreadwatch_core::data::{
    align_series, synthesize_history, AlignedTable, CommodityQuote, CommoditySource, DataError,
    MarketDataProvider, PriceTable,
};
use spreadwatch_core::domain::{DatasetHash, InstrumentId, InstrumentRole};
use spreadwatch_core::fingerprint::dataset_hash;
use spreadwatch_core::metrics::{
    composite_cost_index, profit_spread, CompositeCostIndex, ProfitSpread, SpreadSlope,
};
use spreadwatch_core::signals::{ClassifierInput, SignalAssessment};

use crate::config::{ConfigError, MonitorConfig};
use crate::notify::{Delivery, Notification, Notifier};
use crate::reporting::{render_chart, render_report, ChartImage, ChartStyle, Report, ReportContext};

/// Gap rate above which an instrument is flagged in the outcome.
const GAP_WARNING_RATE: f64 = 0.5;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Collaborators and the invocation clock for one run.
pub struct RunContext<'a> {
    pub market: &'a dyn MarketDataProvider,
    pub commodity: &'a dyn CommoditySource,
    pub notifier: &'a dyn Notifier,
    /// Invocation date; observations on this date count as current.
    pub as_of: NaiveDate,
    /// Timestamp printed in the notification footer.
    pub generated_at: NaiveDateTime,
}

/// All series computed from one aligned table.
#[derive(Debug, Clone)]
pub struct MonitorFrame {
    pub table: AlignedTable,
    pub leader: InstrumentId,
    pub cost: CompositeCostIndex,
    pub spread: ProfitSpread,
    pub slope: SpreadSlope,
    pub input: ClassifierInput,
    pub assessment: SignalAssessment,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct MonitorOutcome {
    pub frame: MonitorFrame,
    pub quote: Option<CommodityQuote>,
    pub report: Report,
    pub chart: ChartImage,
    pub dataset_hash: DatasetHash,
    pub delivery: Delivery,
    pub data_quality_warnings: Vec<String>,
}

/// Short machine-readable summary, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeSummary<'a> {
    pub signal: &'a SignalAssessment,
    pub spread_pct: f64,
    pub slope_pct: Option<f64>,
    pub leader_rising: bool,
    pub rows: usize,
    pub dataset_hash: &'a str,
}

impl MonitorOutcome {
    pub fn summary(&self) -> OutcomeSummary<'_> {
        OutcomeSummary {
            signal: &self.frame.assessment,
            spread_pct: self.frame.input.spread * 100.0,
            slope_pct: self.frame.input.slope.map(|k| k * 100.0),
            leader_rising: self.frame.input.leader_rising,
            rows: self.frame.table.len(),
            dataset_hash: &self.dataset_hash.0,
        }
    }
}

/// Compute every series and the signal from an aligned table. No I/O.
pub fn analyze(table: &AlignedTable, config: &MonitorConfig) -> Result<MonitorFrame, ConfigError> {
    config.validate()?;
    let leader = config
        .leader()
        .map(|i| i.id.clone())
        .ok_or(ConfigError::MissingRole(InstrumentRole::Leader))?;
    let factors = config
        .cost_factors()
        .ok_or(ConfigError::MissingRole(InstrumentRole::CostPrimary))?;

    let cost = composite_cost_index(table, &factors, &config.weights, config.cumulation);
    let spread = profit_spread(table, &leader, &cost, config.cumulation);
    let slope = spread.slope(config.slope_window);
    let input = ClassifierInput::at_latest(table, &leader, &spread, &slope);
    let assessment = input.classify();

    Ok(MonitorFrame {
        table: table.clone(),
        leader,
        cost,
        spread,
        slope,
        input,
        assessment,
    })
}

/// Market-data window `[as_of - lookback, as_of + 1)`, so today's close is
/// included when the provider has it.
pub fn fetch_window(config: &MonitorConfig, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
    (
        as_of - Duration::days(i64::from(config.lookback_days)),
        as_of + Duration::days(1),
    )
}

/// Add the synthesised series for the scraped instrument over the dates the
/// market data covers.
fn add_scraped_series(
    mut table: PriceTable,
    config: &MonitorConfig,
    quote: Option<&CommodityQuote>,
) -> Result<PriceTable, DataError> {
    let (Some(inst), Some(quote)) = (config.scraped(), quote) else {
        return Ok(table);
    };

    let dates: Vec<NaiveDate> = table
        .values()
        .flat_map(|s| s.keys().copied())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    if dates.is_empty() {
        return Err(DataError::DataUnavailable);
    }

    let series = synthesize_history(
        &dates,
        quote.price,
        config.commodity.synthetic_seed,
        config.commodity.synthetic_sigma,
    );
    table.insert(inst.id.clone(), series);
    Ok(table)
}

fn quality_warnings(config: &MonitorConfig, table: &AlignedTable) -> Vec<String> {
    let mut warnings = Vec::new();
    let rates = table.gap_rates();
    for inst in &config.instruments {
        match rates.get(&inst.id) {
            None => warnings.push(format!("{} ({}): no data returned", inst.label, inst.id)),
            Some(rate) if *rate > GAP_WARNING_RATE => warnings.push(format!(
                "{} ({}): {:.0}% of rows are gaps",
                inst.label,
                inst.id,
                rate * 100.0
            )),
            Some(_) => {}
        }
    }
    warnings
}

/// Run the monitor once.
pub fn run_monitor(config: &MonitorConfig, ctx: &RunContext<'_>) -> Result<MonitorOutcome, RunError> {
    config.validate()?;

    let quote = config.scraped().map(|_| ctx.commodity.quote());

    let (start, end) = fetch_window(config, ctx.as_of);
    info!(provider = ctx.market.name(), %start, %end, "fetching market data");
    let prices = ctx.market.fetch_closes(&config.market_ids(), start, end)?;
    let prices = add_scraped_series(prices, config, quote.as_ref())?;

    let table = align_series(&prices)?;
    let data_quality_warnings = quality_warnings(config, &table);
    for w in &data_quality_warnings {
        warn!("{w}");
    }

    let dataset_hash = dataset_hash(&table);
    let frame = analyze(&table, config)?;
    info!(
        rows = frame.table.len(),
        signal = %frame.assessment.signal,
        spread = frame.input.spread,
        slope = ?frame.input.slope,
        dataset = dataset_hash.short(),
        "analysis complete"
    );

    let chart = render_chart(&frame, &ChartStyle::from_config(config));
    let report = render_report(&ReportContext {
        config,
        frame: &frame,
        quote: quote.as_ref(),
        as_of: ctx.as_of,
        dataset_hash: &dataset_hash,
        chart_file: Some(chart.file_name.as_str()),
    });

    let notification = Notification {
        title: report.title.clone(),
        body: report.body.clone(),
        color: frame.assessment.color,
        footer: format!("Generated at {}", ctx.generated_at.format("%Y-%m-%d %H:%M")),
        image: Some(chart.clone()),
    };
    let delivery = match ctx.notifier.send(&notification) {
        Ok(delivery) => delivery,
        Err(e) => {
            error!(error = %e, "notification failed");
            Delivery::Failed {
                reason: e.to_string(),
            }
        }
    };

    Ok(MonitorOutcome {
        frame,
        quote,
        report,
        chart,
        dataset_hash,
        delivery,
        data_quality_warnings,
    })
}
