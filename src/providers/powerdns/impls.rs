// Standard library
use std::env;
use std::sync::Arc;

// 3rd party crates
use reqwest::{header, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// Project imports
use crate::utility::cache::SharedZoneCache;

// Current module imports
use super::constants::{
    API_V1_PREFIX, CONFIG_ENDPOINT, DEFAULT_CACHE_MEM_SIZE, DEFAULT_CACHE_TTL, ENV_API_KEY,
    ENV_CACERT, ENV_CACHE_MEM_SIZE, ENV_CACHE_REQUESTS, ENV_CACHE_TTL, ENV_CLIENT_CERT_FILE,
    ENV_CLIENT_CERT_KEY_FILE, ENV_INSECURE_HTTPS, ENV_RECURSOR_SERVER_URL, ENV_SERVER_URL,
    JSON_CONTENT_TYPE, SERVERS_ENDPOINT, SERVER_ENDPOINT, ZONES_ENDPOINT,
};
use super::errors::PowerDnsError;
use super::functions::{
    create_reqwest_client, error_from_response, parse_bool, parse_cache_size_mb, parse_id,
    sanitize_url,
};
use super::models::{
    Record, RecursorConfigSetting, RecursorZone, ResourceRecordSet, ServerInfo, ZoneInfo,
    ZoneInfoUpd, ZonePatch,
};
use super::types::{PowerDns, PowerDnsConfig, Target};

impl PowerDnsConfig {
    pub fn insecure_https(&self) -> bool {
        self.insecure_https.unwrap_or(false)
    }

    pub fn cache_requests(&self) -> bool {
        self.cache_requests.unwrap_or(false)
    }

    pub fn cache_ttl(&self) -> i64 {
        self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL)
    }

    pub fn cache_mem_size(&self) -> &str {
        if self.cache_mem_size.trim().is_empty() {
            DEFAULT_CACHE_MEM_SIZE
        } else {
            &self.cache_mem_size
        }
    }

    /// Fills settings missing from the configuration file from the
    /// process environment.
    pub fn apply_env_fallback(&mut self) {
        self.apply_env_fallback_from(|key| env::var(key).ok());
    }

    /// Same as [`apply_env_fallback`](Self::apply_env_fallback) with an
    /// explicit variable lookup.
    pub fn apply_env_fallback_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let strings: [(&mut String, &str); 7] = [
            (&mut self.api_key, ENV_API_KEY),
            (&mut self.server_url, ENV_SERVER_URL),
            (&mut self.recursor_server_url, ENV_RECURSOR_SERVER_URL),
            (&mut self.ca_certificate, ENV_CACERT),
            (&mut self.client_cert_file, ENV_CLIENT_CERT_FILE),
            (&mut self.client_cert_key_file, ENV_CLIENT_CERT_KEY_FILE),
            (&mut self.cache_mem_size, ENV_CACHE_MEM_SIZE),
        ];
        for (field, key) in strings {
            if field.is_empty() {
                if let Some(value) = lookup(key) {
                    *field = value;
                }
            }
        }

        for (field, key) in [
            (&mut self.insecure_https, ENV_INSECURE_HTTPS),
            (&mut self.cache_requests, ENV_CACHE_REQUESTS),
        ] {
            if field.is_none() {
                *field = lookup(key).and_then(|value| {
                    let parsed = parse_bool(&value);
                    if parsed.is_none() {
                        warn!(variable = %key, value = %value, "Ignoring invalid boolean");
                    }
                    parsed
                });
            }
        }

        if self.cache_ttl.is_none() {
            self.cache_ttl = lookup(ENV_CACHE_TTL).and_then(|value| match value.trim().parse() {
                Ok(ttl) => Some(ttl),
                Err(_) => {
                    warn!(variable = %ENV_CACHE_TTL, value = %value, "Ignoring invalid integer");
                    None
                }
            });
        }
    }

    pub fn validate(&self) -> Result<(), PowerDnsError> {
        if self.server_url.trim().is_empty() {
            return Err(PowerDnsError::MissingSetting("server_url"));
        }

        if self.recursor_server_url.trim().is_empty() {
            return Err(PowerDnsError::MissingSetting("recursor_server_url"));
        }

        if self.api_key.trim().is_empty() {
            return Err(PowerDnsError::MissingSetting("api_key"));
        }

        if self.cache_ttl() < 0 {
            return Err(PowerDnsError::NegativeCacheTtl(self.cache_ttl()));
        }

        if self.cache_requests() {
            parse_cache_size_mb(self.cache_mem_size())?;
        }

        Ok(())
    }
}

impl ZoneInfo {
    /// Flattens the zone's rrsets into individual records.
    pub fn into_records(self) -> Vec<Record> {
        let mut records = self.records;
        for rrset in self.rrsets {
            for record in rrset.records {
                records.push(Record {
                    name: rrset.name.clone(),
                    r#type: rrset.r#type.clone(),
                    content: record.content,
                    ttl: rrset.ttl,
                    disabled: record.disabled,
                    set_ptr: false,
                });
            }
        }
        records
    }
}

fn zone_endpoint(name: &str) -> String {
    format!("{}/{}", ZONES_ENDPOINT, name)
}

fn config_endpoint(name: &str) -> String {
    format!("{}/{}", CONFIG_ENDPOINT, name)
}

async fn expect_status(response: Response, expected: &[StatusCode]) -> Result<Response, PowerDnsError> {
    if expected.contains(&response.status()) {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, PowerDnsError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| PowerDnsError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

impl PowerDns {
    /// Builds a client from validated settings and looks up the server
    /// version. Failing to find the version is logged, not fatal.
    pub async fn new(config: &PowerDnsConfig) -> Result<Self, PowerDnsError> {
        config.validate()?;

        let server_url = sanitize_url(&config.server_url)?;
        let recursor_server_url = sanitize_url(&config.recursor_server_url)?;
        let client = create_reqwest_client(config)?;

        let cache = if config.cache_requests() {
            let capacity = parse_cache_size_mb(config.cache_mem_size())?;
            let ttl = u64::try_from(config.cache_ttl())
                .map_err(|_| PowerDnsError::NegativeCacheTtl(config.cache_ttl()))?;
            debug!(capacity, ttl, "Zone request cache enabled");
            Some(SharedZoneCache::new(capacity, ttl))
        } else {
            None
        };

        let pdns = PowerDns {
            server_url,
            recursor_server_url,
            client,
            api_version: Arc::new(RwLock::new(None)),
            server_version: Arc::new(RwLock::new(None)),
            cache,
        };

        match pdns.detect_server_version().await {
            Ok(version) => info!(server = %pdns.server_url, version = %version, "Connected to PowerDNS"),
            Err(e) => warn!(server = %pdns.server_url, error = %e, "Unable to determine PowerDNS server version"),
        }

        Ok(pdns)
    }

    /// Version of the HTTP API: 1 when `/api/v1/servers` answers, 0 for
    /// legacy servers without the prefix. Detected once.
    pub async fn api_version(&self) -> Result<u8, PowerDnsError> {
        if let Some(version) = *self.api_version.read().await {
            return Ok(version);
        }

        let url = format!("{}{}{}", self.server_url, API_V1_PREFIX, SERVERS_ENDPOINT);
        let response = self.client.get(&url).send().await?;
        let version = if response.status() == StatusCode::OK { 1 } else { 0 };
        debug!(api_version = version, "Detected PowerDNS API version");

        *self.api_version.write().await = Some(version);
        Ok(version)
    }

    pub async fn server_version(&self) -> Option<String> {
        self.server_version.read().await.clone()
    }

    /// Reads the server version from `/servers/localhost`, falling back to
    /// the `Server: PowerDNS/x` response header.
    pub async fn detect_server_version(&self) -> Result<String, PowerDnsError> {
        let response = self
            .send(Target::Authoritative, Method::GET, SERVER_ENDPOINT, None)
            .await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;

        let header_version = response
            .headers()
            .get(header::SERVER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("PowerDNS/"))
            .map(str::to_string);

        let info: ServerInfo = decode(response, SERVER_ENDPOINT).await.unwrap_or_default();
        let version = if info.version.is_empty() {
            header_version.ok_or(PowerDnsError::UnknownServerVersion)?
        } else {
            info.version
        };

        *self.server_version.write().await = Some(version.clone());
        Ok(version)
    }

    async fn url_for(&self, target: Target, endpoint: &str) -> Result<String, PowerDnsError> {
        match target {
            Target::Authoritative => match self.api_version().await? {
                0 => Ok(format!("{}{}", self.server_url, endpoint)),
                version => Ok(format!("{}/api/v{}{}", self.server_url, version, endpoint)),
            },
            Target::Recursor => Ok(format!(
                "{}{}{}",
                self.recursor_server_url, API_V1_PREFIX, endpoint
            )),
        }
    }

    async fn send(
        &self,
        target: Target,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Response, PowerDnsError> {
        let url = self.url_for(target, endpoint).await?;
        debug!(method = %method, url = %url, "Sending PowerDNS API request");

        let mut request = self.client.request(method.clone(), &url);
        if method != Method::GET {
            request = request.header(header::CONTENT_TYPE, JSON_CONTENT_TYPE);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        debug!(method = %method, url = %url, status = %response.status(), "Received PowerDNS API response");
        Ok(response)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        target: Target,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        expected: &[StatusCode],
    ) -> Result<T, PowerDnsError> {
        let response = self.send(target, method, endpoint, body).await?;
        let response = expect_status(response, expected).await?;
        decode(response, endpoint).await
    }

    async fn request_empty(
        &self,
        target: Target,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        expected: &[StatusCode],
    ) -> Result<(), PowerDnsError> {
        let response = self.send(target, method, endpoint, body).await?;
        expect_status(response, expected).await?;
        Ok(())
    }

    /// Fetches a resource that is allowed to be missing: 404 becomes
    /// `NotFound(what)`.
    async fn request_found<T: DeserializeOwned>(
        &self,
        target: Target,
        endpoint: &str,
        what: String,
    ) -> Result<T, PowerDnsError> {
        let response = self.send(target, Method::GET, endpoint, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PowerDnsError::NotFound(what));
        }
        let response = expect_status(response, &[StatusCode::OK]).await?;
        decode(response, endpoint).await
    }

    async fn invalidate(&self, zone: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(zone).await;
        }
    }

    pub async fn list_zones(&self) -> Result<Vec<ZoneInfo>, PowerDnsError> {
        self.request_json(
            Target::Authoritative,
            Method::GET,
            ZONES_ENDPOINT,
            None,
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn get_zone(&self, name: &str) -> Result<ZoneInfo, PowerDnsError> {
        self.request_found(
            Target::Authoritative,
            &zone_endpoint(name),
            format!("zone {}", name),
        )
        .await
    }

    pub async fn zone_exists(&self, name: &str) -> Result<bool, PowerDnsError> {
        let response = self
            .send(Target::Authoritative, Method::GET, &zone_endpoint(name), None)
            .await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(error_from_response(response).await),
        }
    }

    pub async fn create_zone(&self, zone: &ZoneInfo) -> Result<ZoneInfo, PowerDnsError> {
        info!(zone = %zone.name, kind = %zone.kind, "Creating zone");
        self.request_json(
            Target::Authoritative,
            Method::POST,
            ZONES_ENDPOINT,
            Some(serde_json::to_value(zone)?),
            &[StatusCode::CREATED],
        )
        .await
    }

    pub async fn update_zone(&self, name: &str, zone: &ZoneInfoUpd) -> Result<(), PowerDnsError> {
        info!(zone = %name, "Updating zone");
        self.request_empty(
            Target::Authoritative,
            Method::PUT,
            &zone_endpoint(name),
            Some(serde_json::to_value(zone)?),
            &[StatusCode::NO_CONTENT],
        )
        .await?;
        self.invalidate(name).await;
        Ok(())
    }

    pub async fn delete_zone(&self, name: &str) -> Result<(), PowerDnsError> {
        info!(zone = %name, "Deleting zone");
        self.request_empty(
            Target::Authoritative,
            Method::DELETE,
            &zone_endpoint(name),
            None,
            &[StatusCode::NO_CONTENT],
        )
        .await?;
        self.invalidate(name).await;
        Ok(())
    }

    /// Zone document, served from the request cache when enabled.
    async fn cached_zone(&self, zone: &str) -> Result<ZoneInfo, PowerDnsError> {
        if let Some(cache) = &self.cache {
            if let Some(info) = cache.get(zone).await {
                debug!(zone = %zone, "Serving zone from request cache");
                return Ok(info);
            }
        }

        let info = self.get_zone(zone).await?;
        if let Some(cache) = &self.cache {
            cache.insert(zone.to_string(), info.clone()).await;
        }
        Ok(info)
    }

    pub async fn list_records(&self, zone: &str) -> Result<Vec<Record>, PowerDnsError> {
        Ok(self.cached_zone(zone).await?.into_records())
    }

    /// Records of one rrset; name and type compare case-insensitively.
    pub async fn list_records_in_rrset(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Vec<Record>, PowerDnsError> {
        Ok(self
            .list_records(zone)
            .await?
            .into_iter()
            .filter(|record| {
                record.name.eq_ignore_ascii_case(name)
                    && record.r#type.eq_ignore_ascii_case(record_type)
            })
            .collect())
    }

    pub async fn list_records_by_id(
        &self,
        zone: &str,
        id: &str,
    ) -> Result<Vec<Record>, PowerDnsError> {
        let (name, record_type) = parse_id(id)?;
        self.list_records_in_rrset(zone, &name, &record_type).await
    }

    pub async fn record_exists(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> Result<bool, PowerDnsError> {
        Ok(!self
            .list_records_in_rrset(zone, name, record_type)
            .await?
            .is_empty())
    }

    pub async fn record_exists_by_id(&self, zone: &str, id: &str) -> Result<bool, PowerDnsError> {
        Ok(!self.list_records_by_id(zone, id).await?.is_empty())
    }

    async fn patch_rrsets(
        &self,
        zone: &str,
        rrsets: &[ResourceRecordSet],
    ) -> Result<(), PowerDnsError> {
        let body = serde_json::to_value(ZonePatch { rrsets })?;
        let result = self
            .request_empty(
                Target::Authoritative,
                Method::PATCH,
                &zone_endpoint(zone),
                Some(body),
                &[StatusCode::OK, StatusCode::NO_CONTENT],
            )
            .await;
        self.invalidate(zone).await;
        result
    }

    /// Replaces an rrset wholesale and returns its ID.
    pub async fn replace_record_set(
        &self,
        zone: &str,
        mut rrset: ResourceRecordSet,
    ) -> Result<String, PowerDnsError> {
        rrset.changetype = "REPLACE".to_string();
        info!(zone = %zone, name = %rrset.name, record_type = %rrset.r#type, "Replacing record set");
        self.patch_rrsets(zone, std::slice::from_ref(&rrset)).await?;
        Ok(rrset.id())
    }

    pub async fn delete_record_set(
        &self,
        zone: &str,
        name: &str,
        record_type: &str,
    ) -> Result<(), PowerDnsError> {
        info!(zone = %zone, name = %name, record_type = %record_type, "Deleting record set");
        let rrset = ResourceRecordSet {
            name: name.to_string(),
            r#type: record_type.to_string(),
            changetype: "DELETE".to_string(),
            ..Default::default()
        };
        self.patch_rrsets(zone, &[rrset]).await
    }

    pub async fn delete_record_set_by_id(&self, zone: &str, id: &str) -> Result<(), PowerDnsError> {
        let (name, record_type) = parse_id(id)?;
        self.delete_record_set(zone, &name, &record_type).await
    }

    pub async fn list_recursor_zones(&self) -> Result<Vec<RecursorZone>, PowerDnsError> {
        self.request_json(
            Target::Recursor,
            Method::GET,
            ZONES_ENDPOINT,
            None,
            &[StatusCode::OK],
        )
        .await
    }

    pub async fn get_recursor_zone(&self, name: &str) -> Result<RecursorZone, PowerDnsError> {
        self.request_found(
            Target::Recursor,
            &zone_endpoint(name),
            format!("recursor zone {}", name),
        )
        .await
    }

    pub async fn create_recursor_zone(
        &self,
        zone: &RecursorZone,
    ) -> Result<RecursorZone, PowerDnsError> {
        info!(zone = %zone.name, kind = %zone.kind, "Creating recursor zone");
        self.request_json(
            Target::Recursor,
            Method::POST,
            ZONES_ENDPOINT,
            Some(serde_json::to_value(zone)?),
            &[StatusCode::CREATED],
        )
        .await
    }

    pub async fn update_recursor_zone(
        &self,
        name: &str,
        zone: &RecursorZone,
    ) -> Result<(), PowerDnsError> {
        info!(zone = %name, "Updating recursor zone");
        self.request_empty(
            Target::Recursor,
            Method::PATCH,
            &zone_endpoint(name),
            Some(serde_json::to_value(zone)?),
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    pub async fn delete_recursor_zone(&self, name: &str) -> Result<(), PowerDnsError> {
        info!(zone = %name, "Deleting recursor zone");
        self.request_empty(
            Target::Recursor,
            Method::DELETE,
            &zone_endpoint(name),
            None,
            &[StatusCode::NO_CONTENT],
        )
        .await
    }

    pub async fn get_recursor_config_value(&self, name: &str) -> Result<String, PowerDnsError> {
        let setting: RecursorConfigSetting = self
            .request_found(
                Target::Recursor,
                &config_endpoint(name),
                format!("recursor setting {}", name),
            )
            .await?;
        Ok(setting.value_string())
    }

    pub async fn set_recursor_config_value(
        &self,
        name: &str,
        value: &str,
    ) -> Result<(), PowerDnsError> {
        info!(setting = %name, "Setting recursor configuration value");
        let body = serde_json::to_value(RecursorConfigSetting::new(name, value))?;
        self.request_empty(
            Target::Recursor,
            Method::PUT,
            &config_endpoint(name),
            Some(body),
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    pub async fn delete_recursor_config_value(&self, name: &str) -> Result<(), PowerDnsError> {
        info!(setting = %name, "Deleting recursor configuration value");
        let response = self
            .send(Target::Recursor, Method::DELETE, &config_endpoint(name), None)
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PowerDnsError::NotFound(format!("recursor setting {}", name)));
        }
        expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::powerdns::test_support::{config_for, v1_server};
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn zone_body() -> Value {
        json!({
            "id": "example.com.",
            "name": "example.com.",
            "kind": "Native",
            "account": "",
            "rrsets": [
                {
                    "name": "www.example.com.",
                    "type": "A",
                    "ttl": 300,
                    "records": [
                        {"content": "192.0.2.1", "disabled": false},
                        {"content": "192.0.2.2", "disabled": false}
                    ]
                },
                {
                    "name": "example.com.",
                    "type": "NS",
                    "ttl": 3600,
                    "records": [{"content": "ns1.example.com.", "disabled": false}]
                }
            ]
        })
    }

    #[tokio::test]
    async fn new_rejects_missing_settings() {
        let mut config = PowerDnsConfig {
            server_url: "http://localhost:8081".into(),
            recursor_server_url: "http://localhost:8082".into(),
            ..Default::default()
        };
        assert!(matches!(
            PowerDns::new(&config).await,
            Err(PowerDnsError::MissingSetting("api_key"))
        ));

        config.api_key = "secret".into();
        config.cache_ttl = Some(-1);
        assert!(matches!(
            PowerDns::new(&config).await,
            Err(PowerDnsError::NegativeCacheTtl(-1))
        ));

        config.cache_ttl = None;
        config.server_url = String::new();
        assert!(matches!(
            PowerDns::new(&config).await,
            Err(PowerDnsError::MissingSetting("server_url"))
        ));
    }

    #[tokio::test]
    async fn new_sanitizes_urls_and_reads_version() {
        let server = v1_server().await;
        let mut config = config_for(&server);
        config.server_url = format!("\"{}/api/v1\"", server.uri());

        let pdns = PowerDns::new(&config).await.unwrap();
        assert_eq!(pdns.server_url, server.uri());
        assert_eq!(pdns.server_version().await.as_deref(), Some("4.8.4"));
        assert_eq!(pdns.api_version().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn server_version_falls_back_to_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Server", "PowerDNS/4.7.3")
                    .set_body_json(json!({})),
            )
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        assert_eq!(pdns.server_version().await.as_deref(), Some("4.7.3"));
    }

    #[tokio::test]
    async fn legacy_api_has_no_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
            .expect(1)
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        assert_eq!(pdns.api_version().await.unwrap(), 0);
        assert!(pdns.server_version().await.is_none());
        assert_eq!(pdns.get_zone("example.com.").await.unwrap().kind, "Native");
    }

    #[tokio::test]
    async fn requests_carry_the_api_key() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones"))
            .and(header("x-api-key", "secret"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([zone_body()])))
            .expect(1)
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        let zones = pdns.list_zones().await.unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name, "example.com.");
    }

    #[tokio::test]
    async fn error_bodies_are_reported() {
        let server = v1_server().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/servers/localhost/zones"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"error": "Conflict"})),
            )
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        let zone = ZoneInfo {
            name: "example.com.".into(),
            kind: "Native".into(),
            ..Default::default()
        };
        let err = pdns.create_zone(&zone).await.unwrap_err();
        assert_eq!(err.reason(), Some("Conflict"));
        assert_eq!(err.to_string(), "error: 409, reason: \"Conflict\"");
    }

    #[tokio::test]
    async fn zone_existence() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/missing.com."))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})))
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        assert!(pdns.zone_exists("example.com.").await.unwrap());
        assert!(!pdns.zone_exists("missing.com.").await.unwrap());
        assert!(matches!(
            pdns.get_zone("missing.com.").await,
            Err(PowerDnsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn records_are_flattened_and_filtered() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        let records = pdns.list_records("example.com.").await.unwrap();
        assert_eq!(records.len(), 3);

        let www = pdns
            .list_records_in_rrset("example.com.", "WWW.example.com.", "a")
            .await
            .unwrap();
        assert_eq!(www.len(), 2);
        assert_eq!(www[0].ttl, 300);
        assert_eq!(www[0].id(), "www.example.com.:::A");

        assert!(pdns
            .record_exists_by_id("example.com.", "example.com.:::NS")
            .await
            .unwrap());
        assert!(!pdns
            .record_exists("example.com.", "mail.example.com.", "MX")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn replace_and_delete_patch_the_zone() {
        let server = v1_server().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "rrsets": [{"name": "www.example.com.", "type": "A", "changetype": "REPLACE", "ttl": 60}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .and(body_partial_json(json!({
                "rrsets": [{"name": "www.example.com.", "type": "A", "changetype": "DELETE"}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        let rrset = ResourceRecordSet {
            name: "www.example.com.".into(),
            r#type: "A".into(),
            ttl: 60,
            records: vec![Record {
                content: "192.0.2.10".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let id = pdns.replace_record_set("example.com.", rrset).await.unwrap();
        assert_eq!(id, "www.example.com.:::A");

        pdns.delete_record_set_by_id("example.com.", &id).await.unwrap();
        assert!(matches!(
            pdns.delete_record_set_by_id("example.com.", "bogus").await,
            Err(PowerDnsError::InvalidRecordId(_))
        ));
    }

    #[tokio::test]
    async fn cached_zone_reads_until_invalidated() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_body()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.cache_requests = Some(true);
        config.cache_mem_size = "1".into();
        config.cache_ttl = Some(300);
        let pdns = PowerDns::new(&config).await.unwrap();

        assert_eq!(pdns.list_records("example.com.").await.unwrap().len(), 3);
        assert_eq!(pdns.list_records("example.com.").await.unwrap().len(), 3);

        pdns.delete_record_set("example.com.", "www.example.com.", "A")
            .await
            .unwrap();
        assert_eq!(pdns.list_records("example.com.").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn recursor_config_values() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/config/allow-from"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "allow-from",
                "type": "ConfigSetting",
                "value": ["127.0.0.0/8", "10.0.0.0/8"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/config/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/servers/localhost/config/allow-from"))
            .and(body_partial_json(json!({"name": "allow-from", "value": "10.0.0.0/8"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        assert_eq!(
            pdns.get_recursor_config_value("allow-from").await.unwrap(),
            "127.0.0.0/8, 10.0.0.0/8"
        );
        assert!(matches!(
            pdns.get_recursor_config_value("missing").await,
            Err(PowerDnsError::NotFound(_))
        ));
        pdns.set_recursor_config_value("allow-from", "10.0.0.0/8")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn recursor_zones() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/corp.example."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "corp.example.",
                "name": "corp.example.",
                "kind": "Forwarded",
                "servers": ["10.0.0.53:53"],
                "recursion_desired": true
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/gone.example."))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "corp.example.", "kind": "Forwarded", "servers": ["10.0.0.53:53"]},
                {"name": ".", "kind": "Native", "servers": null}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/servers/localhost/zones/corp.example."))
            .and(body_partial_json(json!({"kind": "Forwarded", "servers": ["10.0.0.54"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let pdns = PowerDns::new(&config_for(&server)).await.unwrap();
        let zones = pdns.list_recursor_zones().await.unwrap();
        assert_eq!(zones.len(), 2);
        assert!(zones[1].servers.is_empty());

        let update = RecursorZone {
            name: "corp.example.".into(),
            kind: "Forwarded".into(),
            servers: vec!["10.0.0.54".into()],
            ..Default::default()
        };
        pdns.update_recursor_zone("corp.example.", &update)
            .await
            .unwrap();

        let zone = pdns.get_recursor_zone("corp.example.").await.unwrap();
        assert_eq!(zone.kind, "Forwarded");
        assert!(zone.recursion_desired);
        assert!(matches!(
            pdns.get_recursor_zone("gone.example.").await,
            Err(PowerDnsError::NotFound(_))
        ));
    }

    #[test]
    fn env_fallback_fills_missing_settings() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PDNS_API_KEY", "from-env"),
            ("PDNS_SERVER_URL", "http://env:8081"),
            ("PDNS_RECURSOR_SERVER_URL", "http://env:8082"),
            ("PDNS_INSECURE_HTTPS", "true"),
            ("PDNS_CACHE_REQUESTS", "maybe"),
            ("PDNS_CACHE_TTL", "120"),
        ]);
        let mut config = PowerDnsConfig {
            server_url: "http://file:8081".into(),
            ..Default::default()
        };
        config.apply_env_fallback_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server_url, "http://file:8081");
        assert_eq!(config.recursor_server_url, "http://env:8082");
        assert_eq!(config.api_key, "from-env");
        assert!(config.insecure_https());
        assert!(!config.cache_requests());
        assert_eq!(config.cache_ttl(), 120);
        assert_eq!(config.cache_mem_size(), DEFAULT_CACHE_MEM_SIZE);
        assert!(config.validate().is_ok());
    }
}
