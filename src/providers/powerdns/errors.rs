// 3rd party crates
use thiserror::Error;

/// Errors raised while configuring or talking to a PowerDNS server.
#[derive(Debug, Error)]
pub enum PowerDnsError {
    #[error("{0} cannot be empty")]
    MissingSetting(&'static str),

    #[error("Cache TTL cannot be negative, got {0}")]
    NegativeCacheTtl(i64),

    #[error("Invalid cache memory size {value:?}: {reason}")]
    InvalidCacheSize { value: String, reason: String },

    #[error("Invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to read TLS material from {path:?}: {source}")]
    TlsMaterial {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("error: {status}, reason: {reason:?}")]
    Api { status: u16, reason: String },

    #[error("error: {0}, unexpected response")]
    UnexpectedStatus(u16),

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unknown record ID format: {0:?}")]
    InvalidRecordId(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unable to determine server version")]
    UnknownServerVersion,
}

impl PowerDnsError {
    /// Message the server attached to a failed request, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            PowerDnsError::Api { reason, .. } => Some(reason),
            _ => None,
        }
    }
}
