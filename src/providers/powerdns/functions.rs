// Standard library
use std::fs;
use std::time::Duration;

// 3rd party crates
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Certificate, Client, Identity, Response, Url};
use tracing::{debug, error};

// Current module imports
use super::constants::{
    API_KEY_HEADER, DEFAULT_SCHEME, ID_SEPARATOR, JSON_CONTENT_TYPE, REQUEST_TIMEOUT_SECS,
};
use super::errors::PowerDnsError;
use super::models::ErrorResponse;
use super::types::PowerDnsConfig;

/// Reduces a user supplied server URL to `scheme://host[:port]`.
///
/// Surrounding quotes are dropped, `http` and `https` are kept and any other
/// or missing scheme becomes `https`. Paths and queries are discarded.
pub fn sanitize_url(url: &str) -> Result<String, PowerDnsError> {
    let trimmed = url.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if trimmed.is_empty() {
        return Err(PowerDnsError::InvalidUrl {
            url: url.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    // `host:port` parses as a scheme with an opaque path, so retry with one
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) if parsed.host_str().is_some() => parsed,
        _ => Url::parse(&format!("{}://{}", DEFAULT_SCHEME, trimmed)).map_err(|e| {
            PowerDnsError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?,
    };

    let host = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| PowerDnsError::InvalidUrl {
            url: url.to_string(),
            reason: "URL has no host".to_string(),
        })?;

    let scheme = match parsed.scheme() {
        "http" | "https" => parsed.scheme(),
        _ => DEFAULT_SCHEME,
    };

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", scheme, host, port),
        None => format!("{}://{}", scheme, host),
    })
}

/// Converts the cache size setting (megabytes) into bytes.
pub fn parse_cache_size_mb(value: &str) -> Result<usize, PowerDnsError> {
    let megabytes: usize = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| PowerDnsError::InvalidCacheSize {
            value: value.to_string(),
            reason: e.to_string(),
        })?;

    if megabytes == 0 {
        return Err(PowerDnsError::InvalidCacheSize {
            value: value.to_string(),
            reason: "cache size must be greater than 0".to_string(),
        });
    }

    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| PowerDnsError::InvalidCacheSize {
            value: value.to_string(),
            reason: "cache size is too large".to_string(),
        })
}

/// ID of an rrset: `name:::type`.
pub fn record_id(name: &str, record_type: &str) -> String {
    format!("{}{}{}", name, ID_SEPARATOR, record_type)
}

/// Splits a record ID into owner name and type.
pub fn parse_id(id: &str) -> Result<(String, String), PowerDnsError> {
    let parts: Vec<&str> = id.split(ID_SEPARATOR).collect();
    match parts.as_slice() {
        [name, record_type] if !name.is_empty() && !record_type.is_empty() => {
            Ok((name.to_string(), record_type.to_string()))
        }
        _ => Err(PowerDnsError::InvalidRecordId(id.to_string())),
    }
}

/// Boolean parsing with the spellings accepted in `PDNS_*` variables.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Returns PEM bytes given either the PEM text itself or a path to it.
pub(super) fn load_pem(value: &str) -> Result<Vec<u8>, PowerDnsError> {
    if value.contains("-----BEGIN") {
        return Ok(value.as_bytes().to_vec());
    }

    fs::read(value).map_err(|source| PowerDnsError::TlsMaterial {
        path: value.to_string(),
        source,
    })
}

/// Creates a reqwest client carrying the API key and TLS settings.
pub(super) fn create_reqwest_client(config: &PowerDnsConfig) -> Result<Client, PowerDnsError> {
    let mut headers: HeaderMap = HeaderMap::new();

    // Mark security-sensitive headers with `set_sensitive`.
    let mut api_key: HeaderValue = HeaderValue::from_str(&config.api_key).map_err(|e| {
        error!("Invalid API key format: {}", e);
        PowerDnsError::InvalidHeaderValue(e)
    })?;
    api_key.set_sensitive(true);
    headers.insert(API_KEY_HEADER, api_key);
    headers.insert(header::ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));

    if config.insecure_https() {
        debug!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if !config.ca_certificate.is_empty() {
        let pem = load_pem(&config.ca_certificate)?;
        builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
    }

    if !config.client_cert_file.is_empty() && !config.client_cert_key_file.is_empty() {
        let mut pem = load_pem(&config.client_cert_file)?;
        pem.extend(load_pem(&config.client_cert_key_file)?);
        builder = builder.identity(Identity::from_pem(&pem)?);
    }

    builder.build().map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        PowerDnsError::Http(e)
    })
}

/// Turns a failed response into an error, using the server's `error`
/// message when it sent one.
pub(super) async fn error_from_response(response: Response) -> PowerDnsError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(ErrorResponse { error }) => PowerDnsError::Api {
            status,
            reason: error,
        },
        Err(_) => PowerDnsError::UnexpectedStatus(status),
    }
}
