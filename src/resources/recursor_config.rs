// 3rd party crates
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

// Project imports
use crate::providers::powerdns::PowerDns;

// Current module imports
use super::errors::ResourceError;
use super::functions::found;
use super::traits::Resource;
use super::types::Ensure;

/// A Recursor runtime setting such as `allow-from`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecursorConfigSpec {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub ensure: Ensure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecursorConfigState {
    pub id: String,
    pub name: String,
    pub value: String,
}

pub struct RecursorConfigResource {
    pub client: PowerDns,
}

impl RecursorConfigResource {
    pub fn new(client: PowerDns) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for RecursorConfigResource {
    type Spec = RecursorConfigSpec;
    type State = RecursorConfigState;

    fn type_name(&self) -> &'static str {
        "powerdns_recursor_config"
    }

    fn label(&self, spec: &RecursorConfigSpec) -> String {
        spec.name.clone()
    }

    fn ensure(&self, spec: &RecursorConfigSpec) -> Ensure {
        spec.ensure
    }

    fn planned(&self, spec: &RecursorConfigSpec) -> Result<RecursorConfigState, ResourceError> {
        if spec.name.trim().is_empty() {
            return Err(ResourceError::InvalidConfig {
                resource: "recursor_config",
                reason: "name cannot be empty".to_string(),
            });
        }

        Ok(RecursorConfigState {
            id: spec.name.clone(),
            name: spec.name.clone(),
            value: spec.value.clone(),
        })
    }

    async fn create(&self, spec: &RecursorConfigSpec) -> Result<RecursorConfigState, ResourceError> {
        let planned = self.planned(spec)?;
        self.client
            .set_recursor_config_value(&planned.name, &planned.value)
            .await?;
        info!(setting = %planned.name, "Recursor setting written");
        Ok(planned)
    }

    async fn read(&self, state: &RecursorConfigState) -> Result<Option<RecursorConfigState>, ResourceError> {
        Ok(found(self.client.get_recursor_config_value(&state.id).await)?.map(|value| {
            RecursorConfigState {
                id: state.id.clone(),
                name: state.name.clone(),
                value,
            }
        }))
    }

    async fn update(
        &self,
        spec: &RecursorConfigSpec,
        current: &RecursorConfigState,
    ) -> Result<RecursorConfigState, ResourceError> {
        self.create(spec).await?;
        self.read(current).await?.ok_or_else(|| ResourceError::NotFound {
            resource: "recursor_config",
            id: current.id.clone(),
        })
    }

    async fn delete(&self, state: &RecursorConfigState) -> Result<(), ResourceError> {
        self.client.delete_recursor_config_value(&state.id).await?;
        info!(setting = %state.name, "Recursor setting deleted");
        Ok(())
    }

    /// `id` is the setting name.
    async fn import(&self, id: &str) -> Result<RecursorConfigState, ResourceError> {
        let value = found(self.client.get_recursor_config_value(id).await)?.ok_or_else(|| {
            ResourceError::NotFound {
                resource: "recursor_config",
                id: id.to_string(),
            }
        })?;

        Ok(RecursorConfigState {
            id: id.to_string(),
            name: id.to_string(),
            value,
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

    const SETTING_PATH: &str = "/api/v1/servers/localhost/config/allow-from";

    fn spec(value: &str) -> RecursorConfigSpec {
        RecursorConfigSpec {
            name: "allow-from".into(),
            value: value.into(),
            ensure: Ensure::Present,
        }
    }

    #[tokio::test]
    async fn unchanged_when_values_match() {
        let server = v1_server().await;
        Mock::given(method("GET"))
            .and(path(SETTING_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "allow-from", "type": "ConfigSetting", "value": "10.0.0.0/8"
            })))
            .mount(&server)
            .await;

        let settings = RecursorConfigResource::new(client_for(&server).await);
        assert_eq!(settings.apply(&spec("10.0.0.0/8")).await.unwrap(), Outcome::Unchanged);
    }

    #[tokio::test]
    async fn missing_setting_is_written() {
        let server = v1_server().await;
        Mock::given(method("PUT"))
            .and(path(SETTING_PATH))
            .and(body_partial_json(json!({"name": "allow-from", "value": "10.0.0.0/8"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let settings = RecursorConfigResource::new(client_for(&server).await);
        assert_eq!(settings.apply(&spec("10.0.0.0/8")).await.unwrap(), Outcome::Created);
        assert!(matches!(
            settings.import("allow-from").await,
            Err(ResourceError::NotFound { .. })
        ));
    }
}
