// 3rd party crates
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Current module imports
use super::types::{PowerDns, PowerDnsConfig};

pub(crate) fn config_for(server: &MockServer) -> PowerDnsConfig {
    PowerDnsConfig {
        server_url: server.uri(),
        recursor_server_url: server.uri(),
        api_key: "secret".to_string(),
        ..Default::default()
    }
}

/// A mock PowerDNS speaking API v1.
pub(crate) async fn v1_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "localhost"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/servers/localhost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "4.8.4"})))
        .mount(&server)
        .await;
    server
}

pub(crate) async fn client_for(server: &MockServer) -> PowerDns {
    PowerDns::new(&config_for(server))
        .await
        .expect("client for mock server")
}
