//! Engine and server configuration, loaded from environment variables.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Days between the nominal dates of consecutive rounds.
pub const DEFAULT_ROUND_INTERVAL_DAYS: u64 = 2;

/// How round `R+1` pairs the winners of round `R`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingPolicy {
    /// Winners of positions `2k-1` and `2k` meet at position `k`.
    #[default]
    BracketPosition,
    /// Winners are shuffled and paired again every round.
    Redraw,
}

impl FromStr for PairingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bracket_position" | "position" => Ok(PairingPolicy::BracketPosition),
            "redraw" | "random" => Ok(PairingPolicy::Redraw),
            other => Err(format!("unknown pairing policy: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pairing: PairingPolicy,
    pub round_interval_days: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pairing: PairingPolicy::default(),
            round_interval_days: DEFAULT_ROUND_INTERVAL_DAYS,
        }
    }
}

impl EngineConfig {
    pub fn with_pairing(mut self, pairing: PairingPolicy) -> Self {
        self.pairing = pairing;
        self
    }

    /// Load from `PAIRING_POLICY` and `ROUND_INTERVAL_DAYS`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pairing = env_or("PAIRING_POLICY", defaults.pairing);
        let round_interval_days = env_or("ROUND_INTERVAL_DAYS", defaults.round_interval_days);
        Self {
            pairing,
            round_interval_days,
        }
    }
}

/// Web server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    /// Environment variables: `HOST` (default 0.0.0.0), `PORT` (default 8080),
    /// plus everything [`EngineConfig::from_env`] reads.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| default_host()),
            port: env_or("PORT", default_port()),
            engine: EngineConfig::from_env(),
        }
    }
}

/// Parse an env var, keeping `default` when it is unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("Ignoring malformed {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}
