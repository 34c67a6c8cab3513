// Standard library
use std::sync::Arc;

// 3rd party crates
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

// Project imports
use crate::utility::cache::SharedZoneCache;

/// Connection settings for the Authoritative Server and the Recursor.
///
/// Empty strings and absent flags are filled from `PDNS_*` environment
/// variables before the client is built.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PowerDnsConfig {
    #[serde(default)]
    pub server_url: String,
    #[serde(default)]
    pub recursor_server_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub insecure_https: Option<bool>,
    /// PEM content or a path to a PEM file.
    #[serde(default)]
    pub ca_certificate: String,
    #[serde(default)]
    pub client_cert_file: String,
    #[serde(default)]
    pub client_cert_key_file: String,
    #[serde(default)]
    pub cache_requests: Option<bool>,
    /// Megabytes, as a string.
    #[serde(default)]
    pub cache_mem_size: String,
    #[serde(default)]
    pub cache_ttl: Option<i64>,
}

/// Which PowerDNS daemon a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Authoritative,
    Recursor,
}

/// Client for the PowerDNS Authoritative Server and Recursor HTTP APIs.
#[derive(Debug, Clone)]
pub struct PowerDns {
    pub server_url: String,
    pub recursor_server_url: String,
    pub client: Client,
    pub(crate) api_version: Arc<RwLock<Option<u8>>>,
    pub(crate) server_version: Arc<RwLock<Option<String>>>,
    pub(crate) cache: Option<SharedZoneCache>,
}
