//! Configuration loading and typed config structures for Marketday.
//!
//! The canonical configuration lives in `marketday-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads the file. Every field
//! has a default, so an empty file (or no file at all) yields a playable
//! server.

use std::path::Path;
use std::time::Duration;

use marketday_market::CommodityParams;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game server configuration.
///
/// Mirrors the structure of `marketday-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Network settings for the game server.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session-wide rules (players, rounds, tick rate).
    #[serde(default)]
    pub session: SessionConfig,

    /// Phase durations.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Starting parameters applied to every commodity.
    #[serde(default)]
    pub market: CommodityParams,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listen address:
    /// - `MARKETDAY_HOST` overrides `server.host`
    /// - `MARKETDAY_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails [`GameConfig::validate`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check values the types alone cannot rule out.
    ///
    /// Commodity `value` and `demand` must be finite and positive, or
    /// prices stop falling as supply grows. A zero tick interval would
    /// flood the session queue with ticks that never advance the clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("market.value", self.market.value)?;
        positive("market.demand", self.market.demand)?;
        if self.session.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "session.tick_interval_ms",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Build the rules every new session is created with.
    pub fn rules(&self) -> SessionRules {
        SessionRules {
            min_players: self.session.min_players,
            auction_rounds: self.session.auction_rounds,
            production: Duration::from_millis(self.timing.production_ms),
            auction_bid: Duration::from_millis(self.timing.auction_bid_ms),
            trade_offer: Duration::from_millis(self.timing.trade_offer_ms),
            trading_stage: Duration::from_millis(self.timing.trading_stage_ms),
            market: self.market,
        }
    }
}

/// Network settings for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Override the listen address with environment variables when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MARKETDAY_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("MARKETDAY_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Session-wide rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Real-time milliseconds between clock ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ready players required before the game leaves the lobby.
    #[serde(default = "default_min_players")]
    pub min_players: usize,

    /// Cards auctioned per auction phase.
    #[serde(default = "default_auction_rounds")]
    pub auction_rounds: u32,

    /// Game joined by players who do not name one.
    #[serde(default = "default_game_name")]
    pub default_game: String,

    /// Fixed seed for auction card generation. Random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// The tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            min_players: default_min_players(),
            auction_rounds: default_auction_rounds(),
            default_game: default_game_name(),
            seed: None,
        }
    }
}

/// Phase durations, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// How long the production phase lasts.
    #[serde(default = "default_production_ms")]
    pub production_ms: u64,

    /// How long an auction card stays open after the last accepted bid.
    #[serde(default = "default_auction_bid_ms")]
    pub auction_bid_ms: u64,

    /// How long a trade offer waits for a counterpart.
    #[serde(default = "default_trade_offer_ms")]
    pub trade_offer_ms: u64,

    /// How long the trading phase lasts.
    #[serde(default = "default_trading_stage_ms")]
    pub trading_stage_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            production_ms: default_production_ms(),
            auction_bid_ms: default_auction_bid_ms(),
            trade_offer_ms: default_trade_offer_ms(),
            trading_stage_ms: default_trading_stage_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Rules a session runs under, resolved from [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRules {
    /// Ready players required before the game leaves the lobby.
    pub min_players: usize,
    /// Cards auctioned per auction phase.
    pub auction_rounds: u32,
    /// Length of the production phase.
    pub production: Duration,
    /// Bid window for each auction card.
    pub auction_bid: Duration,
    /// How long a staged trade offer stays matchable.
    pub trade_offer: Duration,
    /// Length of the trading phase.
    pub trading_stage: Duration,
    /// Starting parameters for every commodity.
    pub market: CommodityParams,
}

impl Default for SessionRules {
    fn default() -> Self {
        GameConfig::default().rules()
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a finite number above zero, got {value}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_tick_interval_ms() -> u64 {
    300
}

const fn default_min_players() -> usize {
    2
}

const fn default_auction_rounds() -> u32 {
    3
}

fn default_game_name() -> String {
    "test".to_owned()
}

const fn default_production_ms() -> u64 {
    10_000
}

const fn default_auction_bid_ms() -> u64 {
    5_000
}

const fn default_trade_offer_ms() -> u64 {
    100
}

const fn default_trading_stage_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
