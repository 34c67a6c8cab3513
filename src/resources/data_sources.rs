//! Read-only lookups of existing zones.

// 3rd party crates
use serde::Serialize;
use tracing::debug;

// Project imports
use crate::providers::powerdns::PowerDns;

// Current module imports
use super::errors::ResourceError;
use super::functions::{found, fqdn, sorted, zone_nameservers};
use super::reverse_zone::{reverse_zone_name, ReverseZoneState};

/// A zone together with every record it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDetails {
    pub name: String,
    pub kind: String,
    pub account: String,
    pub serial: u64,
    pub nameservers: Vec<String>,
    pub masters: Vec<String>,
    pub soa_edit_api: Option<String>,
    /// One entry per record, formatted `name ttl type content`.
    pub records: Vec<String>,
}

/// Finds the reverse zone covering `cidr`.
pub async fn lookup_reverse_zone(
    client: &PowerDns,
    cidr: &str,
) -> Result<ReverseZoneState, ResourceError> {
    let name = reverse_zone_name(cidr)?;
    debug!(cidr = %cidr, zone = %name, "Looking up reverse zone");

    found(client.get_zone(&name).await)?
        .map(|zone| ReverseZoneState::from_zone(cidr, &zone))
        .ok_or(ResourceError::NotFound {
            resource: "reverse_zone",
            id: name,
        })
}

pub async fn lookup_zone(client: &PowerDns, name: &str) -> Result<ZoneDetails, ResourceError> {
    let name = fqdn(name);
    let zone = found(client.get_zone(&name).await)?.ok_or_else(|| ResourceError::NotFound {
        resource: "zone",
        id: name.clone(),
    })?;

    let nameservers = zone_nameservers(&zone);
    let details = ZoneDetails {
        name: zone.name.clone(),
        kind: zone.kind.clone(),
        account: zone.account.clone(),
        serial: zone.serial,
        nameservers,
        masters: sorted(zone.masters.clone()),
        soa_edit_api: zone.soa_edit_api.clone().filter(|soa| !soa.is_empty()),
        records: zone
            .into_records()
            .into_iter()
            .map(|r| format!("{} {} {} {}", r.name, r.ttl, r.r#type, r.content))
            .collect(),
    };
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::powerdns::test_support::{client_for, v1_server};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    #[tokio::test]
    async fn reverse_zone_by_cidr() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/8.b.d.0.1.0.0.2.ip6.arpa."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "8.b.d.0.1.0.0.2.ip6.arpa.",
                "name": "8.b.d.0.1.0.0.2.ip6.arpa.",
                "kind": "Master",
                "rrsets": []
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let zone = lookup_reverse_zone(&client, "2001:db8::/32").await.unwrap();
        assert_eq!(zone.name, "8.b.d.0.1.0.0.2.ip6.arpa.");
        assert_eq!(zone.kind, "Master");

        assert!(matches!(
            lookup_reverse_zone(&client, "10.0.0.0/8").await,
            Err(ResourceError::NotFound { .. })
        ));
        assert!(matches!(
            lookup_reverse_zone(&client, "10.0.0.0/9").await,
            Err(ResourceError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn zone_records_are_rendered() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "example.com.",
                "name": "example.com.",
                "kind": "Native",
                "serial": 2024010101u64,
                "rrsets": [{
                    "name": "www.example.com.",
                    "type": "A",
                    "ttl": 300,
                    "records": [{"content": "192.0.2.1", "disabled": false}]
                }]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let zone = lookup_zone(&client, "example.com").await.unwrap();
        assert_eq!(zone.serial, 2024010101);
        assert_eq!(zone.records, vec!["www.example.com. 300 A 192.0.2.1"]);
    }
}
