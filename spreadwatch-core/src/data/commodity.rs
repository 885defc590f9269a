//! Commodity quote scraping.
//!
//! The primary cost proxy (natural rubber futures) has no free daily-history
//! feed, so its current price is read off a public quote page. Any failure
//! along the way degrades to a fixed fallback quote; the quote carries its
//! origin so the report can say it is not a real reading.

use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Price reported when the quote page cannot be read.
pub const FALLBACK_PRICE: f64 = 185.0;

pub const DEFAULT_QUOTE_URL: &str = "https://www.investing.com/commodities/rubber-tsr20-futures";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const PRICE_MARKER: &str = r#"data-test="instrument-price-last""#;
const PRICE_MARKER_ALT: &str = "text-5xl";
const CHANGE_MARKER: &str = r#"data-test="instrument-price-change-percent""#;

/// Where a quote came from.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOrigin {
    Fetched,
    Fallback { reason: String },
}

/// Current commodity price and its daily percent change.
#[derive(Debug, Clone, PartialEq)]
pub struct CommodityQuote {
    pub price: f64,
    pub change_pct: f64,
    pub origin: QuoteOrigin,
}

impl CommodityQuote {
    pub fn fetched(price: f64, change_pct: f64) -> Self {
        Self {
            price,
            change_pct,
            origin: QuoteOrigin::Fetched,
        }
    }

    /// The fixed `(185.0, 0.0)` quote used when scraping fails.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::fallback_at(FALLBACK_PRICE, reason)
    }

    pub fn fallback_at(price: f64, reason: impl Into<String>) -> Self {
        Self {
            price,
            change_pct: 0.0,
            origin: QuoteOrigin::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, QuoteOrigin::Fallback { .. })
    }
}

/// Why a scrape failed. Never leaves this module except as a fallback reason.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("price element not found (page layout changed)")]
    PriceNotFound,

    #[error("unparseable number: {0:?}")]
    BadNumber(String),
}

/// Source of the current commodity quote.
pub trait CommoditySource {
    /// Never fails: implementations fall back to a fixed quote.
    fn quote(&self) -> CommodityQuote;
}

/// Constant quote, for offline runs.
#[derive(Debug, Clone)]
pub struct FixedQuote(pub CommodityQuote);

impl CommoditySource for FixedQuote {
    fn quote(&self) -> CommodityQuote {
        self.0.clone()
    }
}

/// Scraper for a quote page laid out like investing.com's commodity pages.
pub struct InvestingScraper {
    client: Result<reqwest::blocking::Client, String>,
    url: String,
    fallback_price: f64,
}

impl InvestingScraper {
    pub fn new(url: &str, timeout: Duration, fallback_price: f64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| e.to_string());

        Self {
            client,
            url: url.to_string(),
            fallback_price,
        }
    }

    fn scrape(&self) -> Result<(f64, f64), ScrapeError> {
        let client = self.client.as_ref().map_err(|e| ScrapeError::Request(e.clone()))?;
        let resp = client
            .get(&self.url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .map_err(|e| ScrapeError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let body = resp.text().map_err(|e| ScrapeError::Request(e.to_string()))?;
        parse_quote(&body)
    }
}

impl CommoditySource for InvestingScraper {
    fn quote(&self) -> CommodityQuote {
        match self.scrape() {
            Ok((price, change_pct)) => {
                info!(price, change_pct, "commodity quote fetched");
                CommodityQuote::fetched(price, change_pct)
            }
            Err(e) => {
                warn!(error = %e, url = %self.url, fallback = self.fallback_price, "commodity scrape failed, using fallback");
                CommodityQuote::fallback_at(self.fallback_price, e.to_string())
            }
        }
    }
}

/// Extract `(price, change_pct)` from the quote page HTML.
///
/// A missing change element means 0.0; a missing price element is an error.
pub fn parse_quote(html: &str) -> Result<(f64, f64), ScrapeError> {
    let price_text = element_text(html, PRICE_MARKER)
        .or_else(|| element_text(html, PRICE_MARKER_ALT))
        .ok_or(ScrapeError::PriceNotFound)?;
    let price = parse_number(&price_text)?;

    let change_pct = match element_text(html, CHANGE_MARKER) {
        Some(text) => parse_number(&text)?,
        None => 0.0,
    };

    Ok((price, change_pct))
}

/// Text content of the first element whose opening tag contains `marker`,
/// up to that element's first closing tag. Nested tags and comments are skipped.
fn element_text(html: &str, marker: &str) -> Option<String> {
    let at = html.find(marker)?;
    let rest = &html[at..];
    let body = &rest[rest.find('>')? + 1..];

    let mut text = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '<' {
            text.push(c);
            continue;
        }
        if body[i..].starts_with("</") {
            break;
        }
        let close = if body[i..].starts_with("<!--") { "-->" } else { ">" };
        let end = i + body[i..].find(close)? + close.len();
        while chars.peek().is_some_and(|(j, _)| *j < end) {
            chars.next();
        }
    }

    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn parse_number(text: &str) -> Result<f64, ScrapeError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '%' | '+') && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| ScrapeError::BadNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div class="flex"><div class="text-5xl/9 font-bold" data-test="instrument-price-last">1,712.50</div>
        <span data-test="instrument-price-change-percent">(<!-- -->-0.52<!-- -->%)</span></div>
        </body></html>"#;

    #[test]
    fn parses_price_and_change() {
        let (price, change) = parse_quote(PAGE).unwrap();
        assert_eq!(price, 1712.5);
        assert_eq!(change, -0.52);
    }

    #[test]
    fn falls_back_to_large_text_element() {
        let html = r#"<span class="text-5xl">186.20</span>"#;
        assert_eq!(parse_quote(html).unwrap(), (186.2, 0.0));
    }

    #[test]
    fn positive_change_with_sign() {
        let html = r#"<div data-test="instrument-price-last">190</div>
            <span data-test="instrument-price-change-percent">(+1.25%)</span>"#;
        assert_eq!(parse_quote(html).unwrap(), (190.0, 1.25));
    }

    #[test]
    fn layout_change_is_price_not_found() {
        let html = "<html><body><p>Access denied</p></body></html>";
        assert!(matches!(parse_quote(html), Err(ScrapeError::PriceNotFound)));
    }

    #[test]
    fn garbage_number_is_bad_number() {
        let html = r#"<div data-test="instrument-price-last">n/a</div>"#;
        assert!(matches!(parse_quote(html), Err(ScrapeError::BadNumber(_))));
    }

    #[test]
    fn fallback_quote_is_fixed_constant() {
        let q = CommodityQuote::fallback("HTTP 500");
        assert_eq!((q.price, q.change_pct), (185.0, 0.0));
        assert!(q.is_fallback());
    }

    #[test]
    fn unreachable_host_falls_back() {
        // Port 9 on localhost is discard; connection is refused on most hosts.
        let scraper = InvestingScraper::new("http://127.0.0.1:9/", Duration::from_millis(500), 185.0);
        let q = scraper.quote();
        assert!(q.is_fallback());
        assert_eq!(q.price, 185.0);
    }
}
