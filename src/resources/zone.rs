// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// Project imports
use crate::providers::powerdns::models::{ZoneInfo, ZoneInfoUpd};
use crate::providers::powerdns::PowerDns;

// Current module imports
use super::constants::DEFAULT_ACCOUNT;
use super::errors::ResourceError;
use super::functions::{
    found, fqdn, is_slave, nameserver_rrset, normalize_kind, sorted, validate_masters,
    zone_nameservers,
};
use super::traits::Resource;
use super::types::Ensure;

/// An authoritative zone declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub masters: Vec<String>,
    #[serde(default)]
    pub soa_edit_api: Option<String>,
    #[serde(default)]
    pub ensure: Ensure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneState {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub account: String,
    pub nameservers: Vec<String>,
    pub masters: Vec<String>,
    pub soa_edit_api: Option<String>,
}

impl ZoneState {
    /// State as reported by the server. Slave zones do not publish their
    /// own NS records, so nameservers are left empty for them.
    pub fn from_zone(zone: &ZoneInfo) -> Self {
        let nameservers = if is_slave(&zone.kind) {
            Vec::new()
        } else {
            zone_nameservers(zone)
        };

        ZoneState {
            id: if zone.id.is_empty() {
                zone.name.clone()
            } else {
                zone.id.clone()
            },
            name: zone.name.clone(),
            kind: zone.kind.clone(),
            account: zone.account.clone(),
            nameservers,
            masters: sorted(zone.masters.clone()),
            soa_edit_api: zone.soa_edit_api.clone().filter(|soa| !soa.is_empty()),
        }
    }
}

pub struct ZoneResource {
    pub client: PowerDns,
}

impl ZoneResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ZoneResource {
    type Spec = ZoneSpec;
    type State = ZoneState;

    fn type_name(&self) -> &'static str {
        "powerdns_zone"
    }

    fn label(&self, spec: &ZoneSpec) -> String {
        spec.name.clone()
    }

    fn ensure(&self, spec: &ZoneSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &ZoneSpec) -> Result<ZoneState, ResourceError> {
        let kind = normalize_kind(&spec.kind)?;
        validate_masters(&kind, &spec.masters)?;
        let name = fqdn(&spec.name);

        Ok(ZoneState {
            id: name.clone(),
            name,
            nameservers: if is_slave(&kind) {
                Vec::new()
            } else {
                sorted(spec.nameservers.iter().map(|ns| fqdn(ns)).collect())
            },
            masters: sorted(spec.masters.clone()),
            kind,
            account: spec
                .account
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCOUNT.to_string()),
            soa_edit_api: spec.soa_edit_api.clone().filter(|soa| !soa.is_empty()),
        })
    }

    /// Optional attributes that were not declared are not compared.
    fn in_sync(&self, spec: &ZoneSpec, current: &ZoneState) -> bool {
        let Ok(planned) = self.planned(spec) else {
            return false;
        };

        planned.kind == current.kind
            && planned.masters == current.masters
            && (spec.account.is_none() || planned.account == current.account)
            && (spec.nameservers.is_empty() || planned.nameservers == current.nameservers)
            && (spec.soa_edit_api.is_none() || planned.soa_edit_api == current.soa_edit_api)
    }

    async fn create(&self, spec: &ZoneSpec) -> Result<ZoneState, ResourceError> {
        let planned = self.planned(spec)?;
        let zone = ZoneInfo {
            name: planned.name.clone(),
            kind: planned.kind.clone(),
            account: planned.account.clone(),
            nameservers: planned.nameservers.clone(),
            masters: planned.masters.clone(),
            soa_edit_api: planned.soa_edit_api.clone(),
            ..Default::default()
        };

        let created = self.client.create_zone(&zone).await?;
        info!(zone = %created.name, kind = %created.kind, "Zone created");
        Ok(ZoneState::from_zone(&created))
    }

    async fn read(&self, state: &ZoneState) -> Result<Option<ZoneState>, ResourceError> {
        let zone = found(self.client.get_zone(&state.id).await)?;
        if zone.is_none() {
            warn!(zone = %state.name, "Zone not found");
        }
        Ok(zone.as_ref().map(ZoneState::from_zone))
    }

    async fn update(&self, spec: &ZoneSpec, current: &ZoneState) -> Result<ZoneState, ResourceError> {
        let planned = self.planned(spec)?;
        if planned.masters != current.masters {
            return Err(ResourceError::RequiresReplacement {
                resource: "zone",
                id: current.id.clone(),
                field: "masters",
            });
        }

        let update = ZoneInfoUpd {
            name: current.name.clone(),
            kind: planned.kind.clone(),
            account: spec
                .account
                .clone()
                .unwrap_or_else(|| current.account.clone()),
            soa_edit_api: if spec.soa_edit_api.is_some() {
                planned.soa_edit_api.clone()
            } else {
                current.soa_edit_api.clone()
            },
        };
        self.client.update_zone(&current.id, &update).await?;

        if !spec.nameservers.is_empty()
            && !is_slave(&planned.kind)
            && planned.nameservers != current.nameservers
        {
            self.client
                .replace_record_set(&current.name, nameserver_rrset(&current.name, &planned.nameservers))
                .await?;
        }

        self.read(current)
            .await?
            .ok_or_else(|| ResourceError::NotFound {
                resource: "zone",
                id: current.id.clone(),
            })
    }

    async fn delete(&self, state: &ZoneState) -> Result<(), ResourceError> {
        self.client.delete_zone(&state.id).await?;
        info!(zone = %state.name, "Zone deleted");
        Ok(())
    }

    async fn import(&self, id: &str) -> Result<ZoneState, ResourceError> {
        found(self.client.get_zone(id).await)?
            .map(|zone| ZoneState::from_zone(&zone))
            .ok_or_else(|| ResourceError::NotFound {
                resource: "zone",
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::powerdns::test_support::{client_for, v1_server};
    use crate::resources::types::Outcome;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn spec(kind: &str) -> ZoneSpec {
        ZoneSpec {
            name: "Example.com".into(),
            kind: kind.into(),
            account: None,
            nameservers: vec!["ns1.example.com".into(), "ns2.example.com.".into()],
            masters: Vec::new(),
            soa_edit_api: None,
            ensure: Ensure::Present,
        }
    }

    fn zone_json(kind: &str) -> serde_json::Value {
        json!({
            "id": "example.com.",
            "name": "example.com.",
            "kind": kind,
            "account": "admin",
            "soa_edit_api": "",
            "rrsets": [{
                "name": "example.com.",
                "type": "NS",
                "ttl": 3600,
                "records": [
                    {"content": "ns2.example.com.", "disabled": false},
                    {"content": "ns1.example.com.", "disabled": false}
                ]
            }]
        })
    }

    #[tokio::test]
    async fn planned_state_normalizes_declaration() {
        let server = v1_server().await;
        let zones = ZoneResource::new(client_for(&server).await);

        let planned = zones.planned(&spec("native")).unwrap();
        assert_eq!(planned.id, "example.com.");
        assert_eq!(planned.kind, "Native");
        assert_eq!(planned.account, "admin");
        assert_eq!(planned.nameservers, vec!["ns1.example.com.", "ns2.example.com."]);

        let mut slave = spec("slave");
        assert!(zones.planned(&slave).is_err());
        slave.masters = vec!["192.0.2.1:5300".into()];
        assert!(zones.planned(&slave).unwrap().nameservers.is_empty());

        let mut native = spec("native");
        native.masters = vec!["192.0.2.1".into()];
        assert!(matches!(
            zones.planned(&native),
            Err(ResourceError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn apply_creates_missing_zone() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Not Found"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/servers/localhost/zones"))
            .and(body_partial_json(json!({
                "name": "example.com.",
                "kind": "Native",
                "account": "admin",
                "nameservers": ["ns1.example.com.", "ns2.example.com."]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(zone_json("Native")))
            .expect(1)
            .mount(&server)
            .await;

        let zones = ZoneResource::new(client_for(&server).await);
        assert_eq!(zones.apply(&spec("Native")).await.unwrap(), Outcome::Created);
    }

    #[tokio::test]
    async fn apply_leaves_matching_zone_alone() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("Native")))
            .mount(&server)
            .await;

        let zones = ZoneResource::new(client_for(&server).await);
        assert_eq!(zones.apply(&spec("native")).await.unwrap(), Outcome::Unchanged);
    }

    #[tokio::test]
    async fn apply_updates_kind_and_nameservers() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("Native")))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .and(body_partial_json(json!({"kind": "Master", "account": "admin"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .and(body_partial_json(json!({
                "rrsets": [{"name": "example.com.", "type": "NS", "ttl": 3600, "changetype": "REPLACE"}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let zones = ZoneResource::new(client_for(&server).await);
        let mut declared = spec("master");
        declared.nameservers.push("ns3.example.com.".into());
        assert_eq!(zones.apply(&declared).await.unwrap(), Outcome::Updated);
    }

    #[tokio::test]
    async fn absent_zone_is_deleted() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("Native")))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let zones = ZoneResource::new(client_for(&server).await);
        let mut declared = spec("native");
        declared.ensure = Ensure::Absent;
        assert_eq!(zones.apply(&declared).await.unwrap(), Outcome::Deleted);
    }

    #[tokio::test]
    async fn import_reads_existing_zone() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/servers/localhost/zones/example.com."))
            .respond_with(ResponseTemplate::new(200).set_body_json(zone_json("Native")))
            .mount(&server)
            .await;

        let zones = ZoneResource::new(client_for(&server).await);
        let state = zones.import("example.com.").await.unwrap();
        assert_eq!(state.nameservers, vec!["ns1.example.com.", "ns2.example.com."]);
        assert_eq!(state.soa_edit_api, None);

        assert!(matches!(
            zones.import("missing.com.").await,
            Err(ResourceError::NotFound { .. })
        ));
    }
}
