pub const DEFAULT_SCHEME: &str = "https";

pub const API_KEY_HEADER: &str = "x-api-key";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Prefix of the versioned API; legacy servers serve the same endpoints
/// without it.
pub const API_V1_PREFIX: &str = "/api/v1";
pub const SERVERS_ENDPOINT: &str = "/servers";
pub const SERVER_ENDPOINT: &str = "/servers/localhost";
pub const ZONES_ENDPOINT: &str = "/servers/localhost/zones";
pub const CONFIG_ENDPOINT: &str = "/servers/localhost/config";

/// Separator between owner name and type in a record ID.
pub const ID_SEPARATOR: &str = ":::";

pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_CACHE_MEM_SIZE: &str = "100";
pub const DEFAULT_CACHE_TTL: i64 = 30;

pub const ENV_API_KEY: &str = "PDNS_API_KEY";
pub const ENV_SERVER_URL: &str = "PDNS_SERVER_URL";
pub const ENV_RECURSOR_SERVER_URL: &str = "PDNS_RECURSOR_SERVER_URL";
pub const ENV_INSECURE_HTTPS: &str = "PDNS_INSECURE_HTTPS";
pub const ENV_CACERT: &str = "PDNS_CACERT";
pub const ENV_CLIENT_CERT_FILE: &str = "PDNS_CLIENT_CERT_FILE";
pub const ENV_CLIENT_CERT_KEY_FILE: &str = "PDNS_CLIENT_CERT_KEY_FILE";
pub const ENV_CACHE_REQUESTS: &str = "PDNS_CACHE_REQUESTS";
pub const ENV_CACHE_MEM_SIZE: &str = "PDNS_CACHE_MEM_SIZE";
pub const ENV_CACHE_TTL: &str = "PDNS_CACHE_TTL";
