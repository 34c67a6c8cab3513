// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// Project imports
use crate::providers::powerdns::models::RecursorZone;
use crate::providers::powerdns::PowerDns;

// Current module imports
use super::constants::{DEFAULT_DNS_PORT_SUFFIX, FORWARDED_KIND, MISSING_DOMAIN_ERROR};
use super::errors::ResourceError;
use super::functions::{error_matches, found, fqdn, sorted};
use super::traits::Resource;
use super::types::Ensure;

/// A zone the Recursor forwards to other servers.
#[derive(Debug, Clone, Deserialize)]
pub struct RecursorForwardZoneSpec {
    pub zone: String,
    pub servers: Vec<String>,
    #[serde(default)]
    pub recursion_desired: bool,
    #[serde(default)]
    pub notify_allowed: bool,
    #[serde(default)]
    pub ensure: Ensure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursorForwardZoneState {
    pub id: String,
    pub zone: String,
    pub servers: Vec<String>,
    pub recursion_desired: bool,
    pub notify_allowed: bool,
}

/// Sorted forwarders without the default `:53` port.
fn normalize_servers(servers: &[String]) -> Vec<String> {
    sorted(
        servers
            .iter()
            .map(|server| {
                server
                    .strip_suffix(DEFAULT_DNS_PORT_SUFFIX)
                    .unwrap_or(server)
                    .to_string()
            })
            .collect(),
    )
}

impl RecursorForwardZoneState {
    fn from_zone(zone: &RecursorZone) -> Self {
        RecursorForwardZoneState {
            id: if zone.id.is_empty() {
                zone.name.clone()
            } else {
                zone.id.clone()
            },
            zone: zone.name.clone(),
            servers: normalize_servers(&zone.servers),
            recursion_desired: zone.recursion_desired,
            notify_allowed: zone.notify_allowed,
        }
    }
}

pub struct RecursorForwardZoneResource {
    pub client: PowerDns,
}

impl RecursorForwardZoneResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RecursorForwardZoneResource {
    type Spec = RecursorForwardZoneSpec;
    type State = RecursorForwardZoneState;

    fn type_name(&self) -> &'static str {
        "powerdns_recursor_forward_zone"
    }

    fn label(&self, spec: &RecursorForwardZoneSpec) -> String {
        spec.zone.clone()
    }

    fn ensure(&self, spec: &RecursorForwardZoneSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &RecursorForwardZoneSpec) -> Result<RecursorForwardZoneState, ResourceError> {
        if spec.servers.is_empty() {
            return Err(ResourceError::InvalidConfig {
                resource: "recursor_forward_zone",
                reason: format!("{} needs at least one server", spec.zone),
            });
        }

        let zone = fqdn(&spec.zone);
        Ok(RecursorForwardZoneState {
            id: zone.clone(),
            zone,
            servers: normalize_servers(&spec.servers),
            recursion_desired: spec.recursion_desired,
            notify_allowed: spec.notify_allowed,
        })
    }

    async fn create(
        &self,
        spec: &RecursorForwardZoneSpec,
    ) -> Result<RecursorForwardZoneState, ResourceError> {
        let planned = self.planned(spec)?;
        let zone = RecursorZone {
            name: planned.zone.clone(),
            kind: FORWARDED_KIND.to_string(),
            servers: spec.servers.clone(),
            recursion_desired: planned.recursion_desired,
            notify_allowed: planned.notify_allowed,
            ..Default::default()
        };

        let created = self.client.create_recursor_zone(&zone).await?;
        info!(zone = %created.name, "Forward zone created");
        Ok(RecursorForwardZoneState::from_zone(&created))
    }

    /// Zones of another kind under the same name are reported as missing.
    async fn read(
        &self,
        state: &RecursorForwardZoneState,
    ) -> Result<Option<RecursorForwardZoneState>, ResourceError> {
        let Some(zone) = found(self.client.get_recursor_zone(&state.id).await)? else {
            return Ok(None);
        };

        if zone.kind != FORWARDED_KIND {
            warn!(zone = %zone.name, kind = %zone.kind, "Recursor zone is not a forward zone");
            return Ok(None);
        }

        Ok(Some(RecursorForwardZoneState::from_zone(&zone)))
    }

    /// The Recursor cannot edit a forward zone in place, so it is
    /// recreated.
    async fn update(
        &self,
        spec: &RecursorForwardZoneSpec,
        current: &RecursorForwardZoneState,
    ) -> Result<RecursorForwardZoneState, ResourceError> {
        self.delete(current).await?;
        self.create(spec).await
    }

    async fn delete(&self, state: &RecursorForwardZoneState) -> Result<(), ResourceError> {
        match self.client.delete_recursor_zone(&state.id).await {
            Ok(()) => {
                info!(zone = %state.zone, "Forward zone deleted");
                Ok(())
            }
            Err(e) if error_matches(&e, &[MISSING_DOMAIN_ERROR]) => {
                info!(zone = %state.zone, "Forward zone already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `id` is the zone name.
    async fn import(&self, id: &str) -> Result<RecursorForwardZoneState, ResourceError> {
        let zone = fqdn(id);
        let probe = RecursorForwardZoneState {
            id: zone.clone(),
            zone,
            servers: Vec::new(),
            recursion_desired: false,
            notify_allowed: false,
        };

        self.read(&probe).await?.ok_or_else(|| ResourceError::NotFound {
            resource: "recursor_forward_zone",
            id: id.to_string(),
        })
    }
}
