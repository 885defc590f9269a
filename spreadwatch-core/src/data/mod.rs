//! Data collaborators and series alignment

pub mod align;
pub mod commodity;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use align::{align_series, AlignedTable};
pub use commodity::{
    parse_quote, CommodityQuote, CommoditySource, FixedQuote, InvestingScraper, QuoteOrigin,
    ScrapeError, FALLBACK_PRICE,
};
pub use csv_import::{read_price_csv, CsvProvider};
pub use provider::{DataError, MarketDataProvider, PriceSeries, PriceTable, StaticProvider};
pub use synthetic::synthesize_history;
pub use yahoo::YahooProvider;
