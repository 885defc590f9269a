//! Monitor configuration.
//!
//! Loaded from an optional TOML file, then overridden from the environment.
//! Every field has a default so an empty file (or no file) gives the
//! tire-sector basket.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use spreadwatch_core::data::commodity::DEFAULT_QUOTE_URL;
use spreadwatch_core::data::synthetic::{DEFAULT_SEED, DEFAULT_SIGMA};
use spreadwatch_core::data::FALLBACK_PRICE;
use spreadwatch_core::domain::{
    CostFactors, CostWeights, Instrument, InstrumentId, InstrumentRole, InstrumentSource,
    WeightsError,
};
use spreadwatch_core::metrics::{Cumulation, DEFAULT_SLOPE_WINDOW};

pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";
pub const ENV_LOOKBACK_DAYS: &str = "SPREADWATCH_LOOKBACK_DAYS";
pub const ENV_SLOPE_WINDOW: &str = "SPREADWATCH_SLOPE_WINDOW";
pub const ENV_CUMULATION: &str = "SPREADWATCH_CUMULATION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid cost weights: {0}")]
    Weights(#[from] WeightsError),

    #[error("basket has no {0:?} instrument")]
    MissingRole(InstrumentRole),

    #[error("basket has more than one {0:?} instrument")]
    DuplicateRole(InstrumentRole),

    #[error("instrument '{0}' is listed twice")]
    DuplicateInstrument(String),

    #[error("instrument '{id}' is scraped but only the primary cost factor can be scraped")]
    UnsupportedScrapedRole { id: String },

    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Commodity quote scraping and synthesised-history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommodityConfig {
    pub url: String,
    pub timeout_secs: u64,
    pub fallback_price: f64,
    pub synthetic_seed: u64,
    pub synthetic_sigma: f64,
}

impl Default for CommodityConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_QUOTE_URL.to_string(),
            timeout_secs: 15,
            fallback_price: FALLBACK_PRICE,
            synthetic_seed: DEFAULT_SEED,
            synthetic_sigma: DEFAULT_SIGMA,
        }
    }
}

/// Webhook delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    /// Display name of the posting bot.
    pub username: String,
    /// Never written back out; usually comes from `DISCORD_WEBHOOK_URL`.
    #[serde(skip_serializing)]
    pub webhook_url: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            username: "Sector Spread Monitor".to_string(),
            webhook_url: None,
        }
    }
}

/// Everything a run needs besides its collaborators and the invocation date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Monitor name, used in the notification title.
    pub name: String,
    /// Calendar days of history fetched before the invocation date.
    pub lookback_days: u32,
    /// Rows between the two ends of the spread slope and leader trend.
    pub slope_window: usize,
    pub cumulation: Cumulation,
    pub weights: CostWeights,
    pub instruments: Vec<Instrument>,
    pub commodity: CommodityConfig,
    pub notify: NotifyConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name: "Tire Sector Monitor".to_string(),
            lookback_days: 90,
            slope_window: DEFAULT_SLOPE_WINDOW,
            cumulation: Cumulation::Additive,
            weights: CostWeights::default(),
            instruments: default_basket(),
            commodity: CommodityConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

/// Tire-sector basket: Japanese leader, US peer, Taiwanese followers,
/// rubber / Brent / USD-TWD cost factors.
pub fn default_basket() -> Vec<Instrument> {
    vec![
        Instrument::new("5108.T", "Bridgestone", InstrumentRole::Leader),
        Instrument::new("GT", "Goodyear", InstrumentRole::Peer),
        Instrument::new("2105.TW", "Cheng Shin", InstrumentRole::Follower),
        Instrument::new("2106.TW", "Kenda", InstrumentRole::Follower),
        Instrument::new("RUBBER-TSR20", "Rubber TSR20", InstrumentRole::CostPrimary).scraped(),
        Instrument::new("BZ=F", "Brent Oil", InstrumentRole::CostSecondary),
        Instrument::new("TWD=X", "USD/TWD", InstrumentRole::Fx),
    ]
}

impl MonitorConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get(ENV_WEBHOOK_URL) {
            self.notify.webhook_url = Some(url);
        }
        if let Some(v) = get(ENV_LOOKBACK_DAYS) {
            self.lookback_days = parse_value(ENV_LOOKBACK_DAYS, &v)?;
        }
        if let Some(v) = get(ENV_SLOPE_WINDOW) {
            self.slope_window = parse_value(ENV_SLOPE_WINDOW, &v)?;
        }
        if let Some(v) = get(ENV_CUMULATION) {
            self.cumulation = v.parse().map_err(|reason| ConfigError::InvalidValue {
                name: ENV_CUMULATION.to_string(),
                value: v.clone(),
                reason,
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if self.lookback_days == 0 {
            return Err(invalid("lookback_days", "0", "must be at least 1"));
        }
        if self.slope_window == 0 {
            return Err(invalid("slope_window", "0", "must be at least 1"));
        }
        if self.commodity.fallback_price <= 0.0 {
            return Err(invalid(
                "commodity.fallback_price",
                &self.commodity.fallback_price.to_string(),
                "must be positive",
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for inst in &self.instruments {
            if !seen.insert(&inst.id) {
                return Err(ConfigError::DuplicateInstrument(inst.id.to_string()));
            }
            if inst.source == InstrumentSource::Scraped && inst.role != InstrumentRole::CostPrimary {
                return Err(ConfigError::UnsupportedScrapedRole {
                    id: inst.id.to_string(),
                });
            }
        }

        for role in [
            InstrumentRole::Leader,
            InstrumentRole::CostPrimary,
            InstrumentRole::CostSecondary,
            InstrumentRole::Fx,
        ] {
            match self.with_role(role).count() {
                0 => return Err(ConfigError::MissingRole(role)),
                1 => {}
                _ => return Err(ConfigError::DuplicateRole(role)),
            }
        }
        Ok(())
    }

    pub fn with_role(&self, role: InstrumentRole) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter().filter(move |i| i.role == role)
    }

    fn single(&self, role: InstrumentRole) -> Option<&Instrument> {
        self.with_role(role).next()
    }

    /// The leader instrument. `None` only for an unvalidated config.
    pub fn leader(&self) -> Option<&Instrument> {
        self.single(InstrumentRole::Leader)
    }

    pub fn cost_factors(&self) -> Option<CostFactors> {
        Some(CostFactors {
            primary: self.single(InstrumentRole::CostPrimary)?.id.clone(),
            secondary: self.single(InstrumentRole::CostSecondary)?.id.clone(),
            fx: self.single(InstrumentRole::Fx)?.id.clone(),
        })
    }

    /// Ids requested from the market-data provider.
    pub fn market_ids(&self) -> Vec<InstrumentId> {
        self.instruments
            .iter()
            .filter(|i| i.source == InstrumentSource::Market)
            .map(|i| i.id.clone())
            .collect()
    }

    /// The instrument quoted by the commodity scraper, if any.
    pub fn scraped(&self) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.source == InstrumentSource::Scraped)
    }

    pub fn label(&self, id: &InstrumentId) -> String {
        self.instruments
            .iter()
            .find(|i| &i.id == id)
            .map(|i| i.label.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

fn parse_value<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| invalid(name, value, &e.to_string()))
}

fn invalid(name: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
