//! Two-panel SVG chart: normalised performance and profit spread.

use spreadwatch_core::domain::{InstrumentId, InstrumentRole};

use crate::config::MonitorConfig;
use crate::runner::MonitorFrame;

pub const CHART_FILE_NAME: &str = "chart.svg";
pub const CHART_CONTENT_TYPE: &str = "image/svg+xml";

const LEADER_COLOR: &str = "#3498db";
const PEER_COLOR: &str = "#f1c40f";
const FOLLOWER_COLORS: [&str; 4] = ["#e74c3c", "#2ecc71", "#9b59b6", "#e67e22"];
const SPREAD_LINE: &str = "#2c3e50";
const SPREAD_UP: &str = "#2ecc71";
const SPREAD_DOWN: &str = "#e74c3c";

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 40.0;
const PANEL_GAP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 30.0;

/// Encoded chart ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlottedSeries {
    pub id: InstrumentId,
    pub label: String,
    pub color: &'static str,
    pub dashed: bool,
}

/// Canvas size and series styling.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    pub width: f64,
    pub height: f64,
    /// Drawn in order; the leader is always last so it sits on top.
    pub series: Vec<PlottedSeries>,
}

impl ChartStyle {
    pub fn from_config(config: &MonitorConfig) -> Self {
        let mut series = Vec::new();
        for (n, inst) in config
            .with_role(InstrumentRole::Follower)
            .enumerate()
        {
            series.push(PlottedSeries {
                id: inst.id.clone(),
                label: inst.label.clone(),
                color: FOLLOWER_COLORS[n % FOLLOWER_COLORS.len()],
                dashed: true,
            });
        }
        for inst in config.with_role(InstrumentRole::Peer) {
            series.push(PlottedSeries {
                id: inst.id.clone(),
                label: inst.label.clone(),
                color: PEER_COLOR,
                dashed: false,
            });
        }
        for inst in config.with_role(InstrumentRole::Leader) {
            series.push(PlottedSeries {
                id: inst.id.clone(),
                label: inst.label.clone(),
                color: LEADER_COLOR,
                dashed: false,
            });
        }
        Self {
            title: config.name.clone(),
            width: 1000.0,
            height: 800.0,
            series,
        }
    }
}

/// Maps row index and value into a panel's pixel box.
struct Panel {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    rows: usize,
    lo: f64,
    hi: f64,
}

impl Panel {
    fn new(left: f64, top: f64, width: f64, height: f64, rows: usize, values: &[f64]) -> Self {
        let (mut lo, mut hi) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if !lo.is_finite() {
            lo = -1.0;
            hi = 1.0;
        } else if hi - lo < 1e-9 {
            lo -= 1.0;
            hi += 1.0;
        }
        let pad = (hi - lo) * 0.05;
        Self {
            left,
            top,
            width,
            height,
            rows,
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    fn x(&self, i: usize) -> f64 {
        if self.rows <= 1 {
            self.left + self.width / 2.0
        } else {
            self.left + self.width * i as f64 / (self.rows - 1) as f64
        }
    }

    fn y(&self, v: f64) -> f64 {
        let v = if v.is_finite() { v } else { 0.0 };
        self.top + self.height * (self.hi - v) / (self.hi - self.lo)
    }

    fn points(&self, values: &[f64]) -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", self.x(i), self.y(*v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn frame(&self, out: &mut String, title: &str) {
        out.push_str(&format!(
            "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"none\" stroke=\"#cccccc\"/>\n",
            self.left, self.top, self.width, self.height
        ));
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" font-weight=\"bold\">{}</text>\n",
            self.left,
            self.top - 8.0,
            escape(title)
        ));
        for v in [self.lo, (self.lo + self.hi) / 2.0, self.hi] {
            out.push_str(&format!(
                "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"end\">{:.1}%</text>\n",
                self.left - 6.0,
                self.y(v) + 3.0,
                v
            ));
        }
        if self.lo < 0.0 && self.hi > 0.0 {
            out.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#888888\" stroke-width=\"0.8\"/>\n",
                self.left,
                self.left + self.width,
                y = self.y(0.0)
            ));
        }
    }
}

/// Escape text for use in SVG element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent performance relative to the first row.
fn normalised(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(&base) if base != 0.0 => values.iter().map(|v| (v / base - 1.0) * 100.0).collect(),
        _ => vec![0.0; values.len()],
    }
}

pub fn render_chart(frame: &MonitorFrame, style: &ChartStyle) -> ChartImage {
    let rows = frame.table.len();
    let plot_width = style.width - MARGIN_LEFT - MARGIN_RIGHT;
    let panel_height = (style.height - MARGIN_TOP - PANEL_GAP - MARGIN_BOTTOM) / 2.0;

    let plotted: Vec<(&PlottedSeries, Vec<f64>)> = style
        .series
        .iter()
        .filter_map(|s| frame.table.filled(&s.id).map(|v| (s, normalised(v))))
        .collect();
    let all: Vec<f64> = plotted.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let perf = Panel::new(MARGIN_LEFT, MARGIN_TOP, plot_width, panel_height, rows, &all);

    let spread: Vec<f64> = frame.spread.values.iter().map(|v| v * 100.0).collect();
    let spread_top = MARGIN_TOP + panel_height + PANEL_GAP;
    let sp = Panel::new(MARGIN_LEFT, spread_top, plot_width, panel_height, rows, &spread);

    let mut svg = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n\
<rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n",
        w = style.width,
        h = style.height
    );

    perf.frame(&mut svg, &format!("{}: relative performance (%)", style.title));
    for (n, (series, values)) in plotted.iter().enumerate() {
        let dash = if series.dashed {
            " stroke-dasharray=\"6,4\""
        } else {
            ""
        };
        let width = if n + 1 == plotted.len() { 2.5 } else { 1.5 };
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"{width}\"{dash} points=\"{}\"/>\n",
            series.color,
            perf.points(values)
        ));
        let legend_y = MARGIN_TOP + 16.0 * n as f64 + 10.0;
        let legend_x = MARGIN_LEFT + plot_width + 12.0;
        svg.push_str(&format!(
            "<line x1=\"{legend_x:.1}\" y1=\"{legend_y:.1}\" x2=\"{:.1}\" y2=\"{legend_y:.1}\" stroke=\"{}\" stroke-width=\"2\"{dash}/>\n\
<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            legend_x + 20.0,
            series.color,
            legend_x + 26.0,
            legend_y + 4.0,
            escape(&series.label)
        ));
    }

    sp.frame(&mut svg, "Profit spread (%)");
    if !spread.is_empty() {
        let zero = sp.y(0.0);
        let area = format!(
            "{:.1},{zero:.1} {} {:.1},{zero:.1}",
            sp.x(0),
            sp.points(&spread),
            sp.x(spread.len() - 1)
        );
        svg.push_str(&format!(
            "<clipPath id=\"above\"><rect x=\"{l:.1}\" y=\"{t:.1}\" width=\"{w:.1}\" height=\"{:.1}\"/></clipPath>\n\
<clipPath id=\"below\"><rect x=\"{l:.1}\" y=\"{zero:.1}\" width=\"{w:.1}\" height=\"{:.1}\"/></clipPath>\n\
<polygon points=\"{area}\" fill=\"{SPREAD_UP}\" fill-opacity=\"0.3\" clip-path=\"url(#above)\"/>\n\
<polygon points=\"{area}\" fill=\"{SPREAD_DOWN}\" fill-opacity=\"0.3\" clip-path=\"url(#below)\"/>\n\
<polyline fill=\"none\" stroke=\"{SPREAD_LINE}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
            (zero - sp.top).max(0.0),
            (sp.top + sp.height - zero).max(0.0),
            sp.points(&spread),
            l = sp.left,
            t = sp.top,
            w = sp.width,
        ));
    }

    if let (Some(first), Some(last)) = (frame.table.dates().first(), frame.table.dates().last()) {
        let axis_y = spread_top + panel_height + 16.0;
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{axis_y:.1}\" font-size=\"10\">{first}</text>\n\
<text x=\"{:.1}\" y=\"{axis_y:.1}\" font-size=\"10\" text-anchor=\"end\">{last}</text>\n",
            MARGIN_LEFT,
            MARGIN_LEFT + plot_width,
        ));
    }
    svg.push_str("</svg>\n");

    ChartImage {
        bytes: svg.into_bytes(),
        file_name: CHART_FILE_NAME.to_string(),
        content_type: CHART_CONTENT_TYPE,
    }
}
