// 3rd party crates
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Current module imports
use super::functions::record_id;

/// PowerDNS sends `null` for some string and list fields on older versions.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A zone as served by `/servers/localhost/zones`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneInfo {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub dnssec: bool,
    #[serde(default)]
    pub serial: u64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<ResourceRecordSet>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub account: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub masters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soa_edit_api: Option<String>,
}

/// Body of a zone metadata update (`PUT`). An absent `soa_edit_api` is sent
/// as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoneInfoUpd {
    pub name: String,
    pub kind: String,
    pub account: String,
    pub soa_edit_api: Option<String>,
}

/// A single record, flattened out of its rrset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: u32,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, rename = "set-ptr", skip_serializing_if = "is_false")]
    pub set_ptr: bool,
}

impl Record {
    pub fn id(&self) -> String {
        record_id(&self.name, &self.r#type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub changetype: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<Record>,
}

impl ResourceRecordSet {
    pub fn id(&self) -> String {
        record_id(&self.name, &self.r#type)
    }
}

/// Body of a `PATCH` on a zone.
#[derive(Debug, Serialize)]
pub struct ZonePatch<'a> {
    pub rrsets: &'a [ResourceRecordSet],
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

/// A zone served by the Recursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecursorZone {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub r#type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub servers: Vec<String>,
    #[serde(default)]
    pub recursion_desired: bool,
    #[serde(default)]
    pub notify_allowed: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub rrsets: Vec<ResourceRecordSet>,
}

/// A Recursor runtime setting under `/servers/localhost/config/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecursorConfigSetting {
    pub name: String,
    #[serde(rename = "type", default = "config_setting_type")]
    pub r#type: String,
    pub value: Value,
}

fn config_setting_type() -> String {
    "ConfigSetting".to_string()
}

impl RecursorConfigSetting {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            r#type: config_setting_type(),
            value: Value::String(value.to_string()),
        }
    }

    /// The value as text; list settings such as `allow-from` are joined with
    /// `", "`.
    pub fn value_string(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}
