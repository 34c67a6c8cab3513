// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// Project imports
use crate::providers::powerdns::functions::{parse_id, record_id};
use crate::providers::powerdns::models::{Record, ResourceRecordSet};
use crate::providers::powerdns::PowerDns;

// Current module imports
use super::errors::ResourceError;
use super::functions::{fqdn, parse_import_id, sorted};
use super::traits::Resource;
use super::types::Ensure;

/// An rrset declaration: every record of one name and type in a zone.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSpec {
    pub zone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub ttl: u32,
    pub records: Vec<String>,
    /// Ask the server to maintain matching PTR records. Write-only.
    #[serde(default)]
    pub set_ptr: bool,
    #[serde(default)]
    pub ensure: Ensure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordState {
    pub id: String,
    pub zone: String,
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub ttl: u32,
    pub records: Vec<String>,
}

impl RecordState {
    fn from_records(zone: &str, id: &str, records: &[Record]) -> Option<Self> {
        let first = records.first()?;
        Some(RecordState {
            id: id.to_string(),
            zone: zone.to_string(),
            name: first.name.clone(),
            r#type: first.r#type.clone(),
            ttl: first.ttl,
            records: sorted(records.iter().map(|r| r.content.clone()).collect()),
        })
    }
}

pub struct RecordResource {
    pub client: PowerDns,
}

impl RecordResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RecordResource {
    type Spec = RecordSpec;
    type State = RecordState;

    fn type_name(&self) -> &'static str {
        "powerdns_record"
    }

    fn label(&self, spec: &RecordSpec) -> String {
        format!("{} {}", spec.name, spec.r#type)
    }

    fn ensure(&self, spec: &RecordSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &RecordSpec) -> Result<RecordState, ResourceError> {
        if spec.records.is_empty() {
            return Err(ResourceError::InvalidConfig {
                resource: "record",
                reason: format!("{} {} must have at least one record", spec.name, spec.r#type),
            });
        }

        let name = fqdn(&spec.name);
        let record_type = spec.r#type.trim().to_ascii_uppercase();
        Ok(RecordState {
            id: record_id(&name, &record_type),
            zone: fqdn(&spec.zone),
            name,
            r#type: record_type,
            ttl: spec.ttl,
            records: sorted(spec.records.clone()),
        })
    }

    async fn create(&self, spec: &RecordSpec) -> Result<RecordState, ResourceError> {
        let planned = self.planned(spec)?;

        if spec.records.iter().any(|content| content.trim().is_empty()) {
            warn!(
                zone = %planned.zone,
                name = %planned.name,
                "One or more values in 'records' contain empty strings"
            );
        }

        let rrset = ResourceRecordSet {
            name: planned.name.clone(),
            r#type: planned.r#type.clone(),
            ttl: planned.ttl,
            records: spec
                .records
                .iter()
                .map(|content| Record {
                    content: content.clone(),
                    set_ptr: spec.set_ptr,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let id = self.client.replace_record_set(&planned.zone, rrset).await?;
        info!(zone = %planned.zone, id = %id, "Record set written");
        Ok(RecordState { id, ..planned })
    }

    async fn read(&self, state: &RecordState) -> Result<Option<RecordState>, ResourceError> {
        let records = self
            .client
            .list_records_by_id(&state.zone, &state.id)
            .await?;
        Ok(RecordState::from_records(&state.zone, &state.id, &records))
    }

    /// A REPLACE of the whole rrset.
    async fn update(&self, spec: &RecordSpec, _current: &RecordState) -> Result<RecordState, ResourceError> {
        self.create(spec).await
    }

    async fn delete(&self, state: &RecordState) -> Result<(), ResourceError> {
        self.client
            .delete_record_set_by_id(&state.zone, &state.id)
            .await?;
        info!(zone = %state.zone, id = %state.id, "Record set deleted");
        Ok(())
    }

    /// `id` is `{"zone": "example.com.", "id": "www.example.com.:::A"}`.
    async fn import(&self, id: &str) -> Result<RecordState, ResourceError> {
        let (zone, record_id) = parse_import_id(id)?;
        parse_id(&record_id)?;

        let records = self.client.list_records_by_id(&zone, &record_id).await?;
        RecordState::from_records(&zone, &record_id, &records).ok_or_else(|| {
            ResourceError::NotFound {
                resource: "record",
                id: record_id.clone(),
            }
        })
    }
}
