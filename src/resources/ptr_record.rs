// Standard library
use std::net::IpAddr;

// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// Project imports
use crate::providers::powerdns::functions::{parse_id, record_id};
use crate::providers::powerdns::models::{Record, ResourceRecordSet};
use crate::providers::powerdns::PowerDns;
use crate::utility::reverse_dns::{get_ptr_owner_name, get_ptr_record_name, parse_ptr_record_name};

// Current module imports
use super::constants::{PTR_TYPE, READ_ONLY_BACKEND_ERRORS};
use super::errors::ResourceError;
use super::functions::{error_matches, fqdn, parse_import_id};
use super::traits::Resource;
use super::types::Ensure;

/// The PTR record of one address, placed in an existing reverse zone.
#[derive(Debug, Clone, Deserialize)]
pub struct PtrRecordSpec {
    pub ip_address: String,
    pub hostname: String,
    pub ttl: u32,
    pub reverse_zone: String,
    #[serde(default)]
    pub ensure: Ensure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PtrRecordState {
    pub id: String,
    pub ip_address: String,
    pub hostname: String,
    pub ttl: u32,
    pub reverse_zone: String,
}

fn parse_address(ip: &str) -> Result<IpAddr, ResourceError> {
    // Validates and reports the input the same way the name builder does
    get_ptr_record_name(ip)?;
    ip.trim()
        .parse()
        .map_err(|_| ResourceError::InvalidConfig {
            resource: "ptr_record",
            reason: format!("invalid IP address {:?}", ip),
        })
}

pub struct PtrRecordResource {
    pub client: PowerDns,
}

impl PtrRecordResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }

    async fn lookup(
        &self,
        reverse_zone: &str,
        ip: IpAddr,
        id: &str,
    ) -> Result<Option<PtrRecordState>, ResourceError> {
        let owner = get_ptr_owner_name(&ip);
        let records = self
            .client
            .list_records_in_rrset(reverse_zone, &owner, PTR_TYPE)
            .await?;

        Ok(records.first().map(|record| PtrRecordState {
            id: id.to_string(),
            ip_address: ip.to_string(),
            hostname: record.content.clone(),
            ttl: record.ttl,
            reverse_zone: reverse_zone.to_string(),
        }))
    }
}

#[async_trait]
impl Resource for PtrRecordResource {
    type Spec = PtrRecordSpec;
    type State = PtrRecordState;

    fn type_name(&self) -> &'static str {
        "powerdns_ptr_record"
    }

    fn label(&self, spec: &PtrRecordSpec) -> String {
        spec.ip_address.clone()
    }

    fn ensure(&self, spec: &PtrRecordSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &PtrRecordSpec) -> Result<PtrRecordState, ResourceError> {
        let ip = parse_address(&spec.ip_address)?;
        Ok(PtrRecordState {
            id: record_id(&get_ptr_owner_name(&ip), PTR_TYPE),
            ip_address: ip.to_string(),
            hostname: fqdn(&spec.hostname),
            ttl: spec.ttl,
            reverse_zone: fqdn(&spec.reverse_zone),
        })
    }

    async fn create(&self, spec: &PtrRecordSpec) -> Result<PtrRecordState, ResourceError> {
        let planned = self.planned(spec)?;

        if !self.client.zone_exists(&planned.reverse_zone).await? {
            return Err(ResourceError::NotFound {
                resource: "reverse zone",
                id: planned.reverse_zone.clone(),
            });
        }

        let ip = parse_address(&planned.ip_address)?;
        let rrset = ResourceRecordSet {
            name: get_ptr_owner_name(&ip),
            r#type: PTR_TYPE.to_string(),
            ttl: planned.ttl,
            records: vec![Record {
                content: planned.hostname.clone(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let id = self
            .client
            .replace_record_set(&planned.reverse_zone, rrset)
            .await?;
        info!(zone = %planned.reverse_zone, id = %id, hostname = %planned.hostname, "PTR record written");
        Ok(PtrRecordState { id, ..planned })
    }

    async fn read(&self, state: &PtrRecordState) -> Result<Option<PtrRecordState>, ResourceError> {
        let ip = parse_address(&state.ip_address)?;
        self.lookup(&state.reverse_zone, ip, &state.id).await
    }

    async fn update(
        &self,
        spec: &PtrRecordSpec,
        _current: &PtrRecordState,
    ) -> Result<PtrRecordState, ResourceError> {
        self.create(spec).await
    }

    /// Backends that cannot edit records are treated as already clean.
    async fn delete(&self, state: &PtrRecordState) -> Result<(), ResourceError> {
        let ip = parse_address(&state.ip_address)?;
        let owner = get_ptr_owner_name(&ip);

        match self
            .client
            .delete_record_set(&state.reverse_zone, &owner, PTR_TYPE)
            .await
        {
            Ok(()) => {
                info!(zone = %state.reverse_zone, id = %state.id, "PTR record deleted");
                Ok(())
            }
            Err(e) if error_matches(&e, &READ_ONLY_BACKEND_ERRORS) => {
                warn!(
                    zone = %state.reverse_zone,
                    id = %state.id,
                    error = %e,
                    "Backend cannot edit records, leaving PTR record in place"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `id` is `{"zone": "2.0.192.in-addr.arpa.", "id": "10.2.0.192.in-addr.arpa.:::PTR"}`.
    async fn import(&self, id: &str) -> Result<PtrRecordState, ResourceError> {
        let (zone, record_id) = parse_import_id(id)?;
        let (name, _) = parse_id(&record_id)?;
        let ip = parse_ptr_record_name(&name)?;

        self.lookup(&zone, ip, &record_id)
            .await?
            .ok_or_else(|| ResourceError::NotFound {
                resource: "ptr_record",
                id: record_id.clone(),
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
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ZONE_PATH: &str = "/api/v1/servers/localhost/zones/1.168.192.in-addr.arpa.";

    fn spec() -> PtrRecordSpec {
        PtrRecordSpec {
            ip_address: "192.168.1.10".into(),
            hostname: "host.example.com".into(),
            ttl: 300,
            reverse_zone: "1.168.192.in-addr.arpa.".into(),
            ensure: Ensure::Present,
        }
    }

    async fn reverse_zone(server: &MockServer, hostname: Option<&str>) {
        let rrsets = match hostname {
            Some(hostname) => json!([{
                "name": "10.1.168.192.in-addr.arpa.",
                "type": "PTR",
                "ttl": 300,
                "records": [{"content": hostname, "disabled": false}]
            }]),
            None => json!([]),
        };
        Mock::given(method("GET"))
            .and(path(ZONE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "1.168.192.in-addr.arpa.",
                "name": "1.168.192.in-addr.arpa.",
                "kind": "Native",
                "rrsets": rrsets
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn planned_owner_name_comes_from_address() {
        let server = v1_server().await;
        let ptrs = PtrRecordResource::new(client_for(&server).await);

        let planned = ptrs.planned(&spec()).unwrap();
        assert_eq!(planned.id, "10.1.168.192.in-addr.arpa.:::PTR");
        assert_eq!(planned.hostname, "host.example.com.");

        let mut bad = spec();
        bad.ip_address = "192.168.1".into();
        assert!(matches!(ptrs.planned(&bad), Err(ResourceError::ReverseDns(_))));
    }

    #[tokio::test]
    async fn creates_ptr_in_existing_zone() {
        let server = v1_server().await;
        reverse_zone(&server, None).await;
        Mock::given(method("PATCH"))
            .and(path(ZONE_PATH))
            .and(body_partial_json(json!({
                "rrsets": [{
                    "name": "10.1.168.192.in-addr.arpa.",
                    "type": "PTR",
                    "changetype": "REPLACE",
                    "records": [{"content": "host.example.com."}]
                }]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let ptrs = PtrRecordResource::new(client_for(&server).await);
        assert_eq!(ptrs.apply(&spec()).await.unwrap(), Outcome::Created);
    }

    #[tokio::test]
    async fn missing_reverse_zone_fails() {
        let server = v1_server().await;
        let ptrs = PtrRecordResource::new(client_for(&server).await);
        assert!(matches!(
            ptrs.create(&spec()).await,
            Err(ResourceError::NotFound { resource: "reverse zone", .. })
        ));
    }

    #[tokio::test]
    async fn delete_tolerates_read_only_backends() {
        let server = v1_server().await;
        Mock::given(method("PATCH"))
            .and(path(ZONE_PATH))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": "Hosting backend does not support editing records."
            })))
            .mount(&server)
            .await;

        let ptrs = PtrRecordResource::new(client_for(&server).await);
        let state = ptrs.planned(&spec()).unwrap();
        assert!(ptrs.delete(&state).await.is_ok());
    }

    #[tokio::test]
    async fn import_recovers_the_address() {
        let server = v1_server().await;
        reverse_zone(&server, Some("host.example.com.")).await;

        let ptrs = PtrRecordResource::new(client_for(&server).await);
        let state = ptrs
            .import(r#"{"zone": "1.168.192.in-addr.arpa.", "id": "10.1.168.192.in-addr.arpa.:::PTR"}"#)
            .await
            .unwrap();
        assert_eq!(state.ip_address, "192.168.1.10");
        assert_eq!(state.hostname, "host.example.com.");
        assert_eq!(state, ptrs.planned(&spec()).unwrap());
    }
}
