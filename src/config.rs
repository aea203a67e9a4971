use std::{env, fs::read_to_string, net::SocketAddr};

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Error;

pub const CONFIG_PATH_KEY: &str = "PLACE_HOURS_CONFIG";
pub const ADDRESS_KEY: &str = "PLACE_HOURS_ADDR";
pub const TIMEZONE_KEY: &str = "PLACE_HOURS_TZ";

const DEFAULT_ADDRESS: &str = "127.0.0.1:7878";
const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Where to listen and which zone "now" is sampled in when a request carries no instant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Config {
    /// Reads the JSON file named by `PLACE_HOURS_CONFIG` when set, otherwise the individual
    /// environment variables, falling back to defaults.
    pub fn load() -> Result<Self, Error> {
        if let Ok(path) = var(CONFIG_PATH_KEY) {
            info!("Loading config from {path}");
            let config = read_to_string(&path).map_err(|source| Error::ConfigFile {
                path: path.clone(),
                source,
            })?;
            return Self::from_config(&config);
        }

        Ok(Self {
            address: load_or_default(ADDRESS_KEY, DEFAULT_ADDRESS),
            timezone: load_or_default(TIMEZONE_KEY, DEFAULT_TIMEZONE),
        })
    }

    pub fn from_config(config: &str) -> Result<Self, Error> {
        serde_json::from_str(config).map_err(Error::MalformedConfig)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        self.address
            .parse()
            .map_err(|source| Error::InvalidAddress {
                address: self.address.clone(),
                source,
            })
    }

    pub fn tz(&self) -> Result<Tz, Error> {
        parse_timezone(&self.timezone)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: default_address(),
            timezone: default_timezone(),
        }
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, Error> {
    name.parse()
        .map_err(|_| Error::UnknownTimeZone(name.to_string()))
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn load_or_default(key: &str, default: &str) -> String {
    match var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        Ok(_) => {
            warn!("{key} is empty, using default: {default}");
            default.to_string()
        }
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}
