//! Markdown daily report.

use chrono::NaiveDate;
use serde::Serialize;

use spreadwatch_core::data::{CommodityQuote, QuoteOrigin};
use spreadwatch_core::domain::{DatasetHash, Instrument, InstrumentRole, InstrumentSource};
use spreadwatch_core::metrics::{resolve_latest, LatestObservation};

use crate::config::MonitorConfig;
use crate::runner::MonitorFrame;

pub const NO_DATA: &str = "N/A";

/// Rendered notification text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub body: String,
}

/// Inputs for [`render_report`].
pub struct ReportContext<'a> {
    pub config: &'a MonitorConfig,
    pub frame: &'a MonitorFrame,
    pub quote: Option<&'a CommodityQuote>,
    pub as_of: NaiveDate,
    pub dataset_hash: &'a DatasetHash,
    /// File name of the chart sent with the report, if any.
    pub chart_file: Option<&'a str>,
}

/// `value (±pct%)`, with ` [MM/DD]` appended when the observation predates
/// the run date.
pub fn format_observation(obs: Option<&LatestObservation>) -> String {
    match obs {
        None => NO_DATA.to_string(),
        Some(o) => {
            let mut s = format!("{:.2} ({:+.2}%)", o.value, o.change_pct);
            if !o.is_current {
                s.push_str(&format!(" [{}]", o.date.format("%m/%d")));
            }
            s
        }
    }
}

fn format_quote(quote: &CommodityQuote) -> String {
    let mut s = format!("{:.2} ({:+.2}%)", quote.price, quote.change_pct);
    if let QuoteOrigin::Fallback { .. } = quote.origin {
        s.push_str(" (fallback)");
    }
    s
}

fn instrument_line(ctx: &ReportContext<'_>, inst: &Instrument) -> String {
    let value = match (inst.source, ctx.quote) {
        (InstrumentSource::Scraped, Some(q)) => format_quote(q),
        _ => format_observation(resolve_latest(&ctx.frame.table, &inst.id, ctx.as_of).as_ref()),
    };
    format!("- {}: {}\n", inst.label, value)
}

fn section(
    out: &mut String,
    ctx: &ReportContext<'_>,
    heading: &str,
    include: impl Fn(InstrumentRole) -> bool,
) {
    out.push_str(&format!("**{heading}**\n"));
    for inst in ctx.config.instruments.iter().filter(|i| include(i.role)) {
        out.push_str(&instrument_line(ctx, inst));
    }
}

pub fn render_report(ctx: &ReportContext<'_>) -> Report {
    let frame = ctx.frame;
    let assessment = &frame.assessment;
    let title = format!("{} - {}", assessment.signal.headline(), ctx.config.name);

    let mut body = format!(
        "## {} daily report {}\n\n\
**Signal: {}**\n\
**Reason**: {}\n\n",
        ctx.config.name,
        ctx.as_of.format("%Y-%m-%d"),
        assessment.signal.headline(),
        assessment.reason,
    );

    section(&mut body, ctx, "Leader & peers", |role| {
        matches!(role, InstrumentRole::Leader | InstrumentRole::Peer)
    });
    body.push('\n');

    section(&mut body, ctx, "Cost factors", InstrumentRole::is_cost_factor);
    if ctx.config.scraped().is_some() {
        body.push_str("- _primary cost uses synthesised history ending at the current quote_\n");
    }
    match (frame.cost.latest_change(), frame.cost.latest_cumulative()) {
        (Some(c), Some(cum)) => body.push_str(&format!(
            "- Composite cost change: **{:+.2}%** (cumulative {:+.2}%)\n",
            c * 100.0,
            cum * 100.0
        )),
        _ => body.push_str(&format!("- Composite cost change: {NO_DATA}\n")),
    }
    body.push('\n');

    section(&mut body, ctx, "Followers", |role| role == InstrumentRole::Follower);
    body.push('\n');

    body.push_str(&format!(
        "**Profit spread: {:+.2}%**\n",
        frame.input.spread * 100.0
    ));
    match frame.input.slope {
        Some(k) => body.push_str(&format!(
            "- {}-row slope: {:+.2}%\n",
            frame.slope.window,
            k * 100.0
        )),
        None => body.push_str(&format!("- {}-row slope: {NO_DATA}\n", frame.slope.window)),
    }
    body.push_str(&format!(
        "- Leader rising: {}\n",
        if frame.input.leader_rising { "yes" } else { "no" }
    ));
    if let Some(file) = ctx.chart_file {
        body.push_str(&format!(
            "\nChart attached as `{file}` (open the attachment to view it).\n"
        ));
    }
    body.push_str(&format!(
        "\n_{} rows, dataset {}_",
        frame.table.len(),
        ctx.dataset_hash.short()
    ));

    Report { title, body }
}
