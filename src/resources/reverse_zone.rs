// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

// Project imports
use crate::providers::powerdns::models::{ZoneInfo, ZoneInfoUpd};
use crate::providers::powerdns::PowerDns;
use crate::utility::reverse_dns::{get_reverse_zone_name, parse_reverse_zone_name, validate_cidr};

// Current module imports
use super::constants::DEFAULT_ZONE_KIND;
use super::errors::ResourceError;
use super::functions::{found, fqdn, nameserver_rrset, normalize_kind, sorted, zone_nameservers};
use super::traits::Resource;
use super::types::Ensure;

/// A reverse zone declared by the network it covers.
#[derive(Debug, Clone, Deserialize)]
pub struct ReverseZoneSpec {
    pub cidr: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub nameservers: Vec<String>,
    #[serde(default)]
    pub ensure: Ensure,
}

fn default_kind() -> String {
    DEFAULT_ZONE_KIND.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReverseZoneState {
    pub id: String,
    pub cidr: String,
    pub name: String,
    pub kind: String,
    pub nameservers: Vec<String>,
}

impl ReverseZoneState {
    pub(crate) fn from_zone(cidr: &str, zone: &ZoneInfo) -> Self {
        ReverseZoneState {
            id: if zone.id.is_empty() {
                zone.name.clone()
            } else {
                zone.id.clone()
            },
            cidr: cidr.to_string(),
            name: zone.name.clone(),
            kind: zone.kind.clone(),
            nameservers: zone_nameservers(zone),
        }
    }
}

/// Validates a CIDR declaration and returns its reverse zone name.
pub(crate) fn reverse_zone_name(cidr: &str) -> Result<String, ResourceError> {
    validate_cidr(&Value::String(cidr.to_string()), "cidr").map_err(|errors| {
        ResourceError::InvalidConfig {
            resource: "reverse_zone",
            reason: errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }
    })?;
    Ok(get_reverse_zone_name(cidr)?)
}

pub struct ReverseZoneResource {
    pub client: PowerDns,
}

impl ReverseZoneResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for ReverseZoneResource {
    type Spec = ReverseZoneSpec;
    type State = ReverseZoneState;

    fn type_name(&self) -> &'static str {
        "powerdns_reverse_zone"
    }

    fn label(&self, spec: &ReverseZoneSpec) -> String {
        spec.cidr.clone()
    }

    fn ensure(&self, spec: &ReverseZoneSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &ReverseZoneSpec) -> Result<ReverseZoneState, ResourceError> {
        let name = reverse_zone_name(&spec.cidr)?;
        Ok(ReverseZoneState {
            id: name.clone(),
            cidr: spec.cidr.clone(),
            name,
            kind: normalize_kind(&spec.kind)?,
            nameservers: sorted(spec.nameservers.iter().map(|ns| fqdn(ns)).collect()),
        })
    }

    fn in_sync(&self, spec: &ReverseZoneSpec, current: &ReverseZoneState) -> bool {
        let Ok(planned) = self.planned(spec) else {
            return false;
        };
        planned.kind == current.kind
            && (spec.nameservers.is_empty() || planned.nameservers == current.nameservers)
    }

    async fn create(&self, spec: &ReverseZoneSpec) -> Result<ReverseZoneState, ResourceError> {
        let planned = self.planned(spec)?;
        let zone = ZoneInfo {
            name: planned.name.clone(),
            kind: planned.kind.clone(),
            nameservers: planned.nameservers.clone(),
            ..Default::default()
        };

        let created = self.client.create_zone(&zone).await?;
        info!(zone = %created.name, cidr = %spec.cidr, "Reverse zone created");
        Ok(ReverseZoneState::from_zone(&spec.cidr, &created))
    }

    async fn read(&self, state: &ReverseZoneState) -> Result<Option<ReverseZoneState>, ResourceError> {
        Ok(found(self.client.get_zone(&state.id).await)?
            .map(|zone| ReverseZoneState::from_zone(&state.cidr, &zone)))
    }

    /// Rewrites zone metadata and the apex NS rrset. The kind is fixed at
    /// creation.
    async fn update(
        &self,
        spec: &ReverseZoneSpec,
        current: &ReverseZoneState,
    ) -> Result<ReverseZoneState, ResourceError> {
        let planned = self.planned(spec)?;
        if planned.kind != current.kind {
            return Err(ResourceError::RequiresReplacement {
                resource: "reverse_zone",
                id: current.id.clone(),
                field: "kind",
            });
        }

        let zone = self.client.get_zone(&current.id).await?;
        let update = ZoneInfoUpd {
            name: zone.name.clone(),
            kind: zone.kind.clone(),
            account: zone.account.clone(),
            soa_edit_api: zone.soa_edit_api.clone().filter(|soa| !soa.is_empty()),
        };
        self.client.update_zone(&current.id, &update).await?;

        self.client
            .replace_record_set(&zone.name, nameserver_rrset(&zone.name, &planned.nameservers))
            .await?;
        info!(zone = %zone.name, "Reverse zone nameservers updated");

        self.read(current).await?.ok_or_else(|| ResourceError::NotFound {
            resource: "reverse_zone",
            id: current.id.clone(),
        })
    }

    async fn delete(&self, state: &ReverseZoneState) -> Result<(), ResourceError> {
        self.client.delete_zone(&state.id).await?;
        info!(zone = %state.name, "Reverse zone deleted");
        Ok(())
    }

    /// `id` is the zone name, e.g. `1.168.192.in-addr.arpa.`.
    async fn import(&self, id: &str) -> Result<ReverseZoneState, ResourceError> {
        let cidr = parse_reverse_zone_name(id)?;
        found(self.client.get_zone(&fqdn(id)).await)?
            .map(|zone| ReverseZoneState::from_zone(&cidr, &zone))
            .ok_or_else(|| ResourceError::NotFound {
                resource: "reverse_zone",
                id: id.to_string(),
            })
    }
}
