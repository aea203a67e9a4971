use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("Invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("Could not read config file '{path}': {source}")]
    ConfigFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Could not deserialize config: {0}")]
    MalformedConfig(#[source] serde_json::Error),

    #[error("Could not bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("Malformed body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Instant out of range: day {day}, time {time}")]
    InstantOutOfRange { day: u8, time: u16 },
}
