// Standard library
use std::path::PathBuf;
use std::sync::Arc;

// 3rd party crates
use serde::Deserialize;
use tokio::sync::RwLock;

// Project imports
use crate::providers::powerdns::PowerDnsConfig;
use crate::resources::ptr_record::PtrRecordSpec;
use crate::resources::record::RecordSpec;
use crate::resources::recursor_config::RecursorConfigSpec;
use crate::resources::recursor_forward_zone::RecursorForwardZoneSpec;
use crate::resources::reverse_zone::ReverseZoneSpec;
use crate::resources::zone::ZoneSpec;
use crate::resources::ResourceKind;

#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Reconcile {
    #[serde(default)]
    pub interval: u64,
}

/// Existing zones to look up and report.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Lookups {
    #[serde(default)]
    pub reverse_zones: Vec<String>,
    #[serde(default)]
    pub zones: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImportRequest {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log: Log,
    #[serde(default = "default_reconcile")]
    pub reconcile: Reconcile,
    #[serde(default)]
    pub powerdns: PowerDnsConfig,

    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
    #[serde(default)]
    pub reverse_zones: Vec<ReverseZoneSpec>,
    #[serde(default)]
    pub records: Vec<RecordSpec>,
    #[serde(default)]
    pub ptr_records: Vec<PtrRecordSpec>,
    #[serde(default)]
    pub recursor_configs: Vec<RecursorConfigSpec>,
    #[serde(default)]
    pub recursor_forward_zones: Vec<RecursorForwardZoneSpec>,

    #[serde(default)]
    pub lookups: Lookups,
    #[serde(default)]
    pub imports: Vec<ImportRequest>,
}

fn default_reconcile() -> Reconcile {
    Reconcile { interval: 0 }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Settings that passed [`Settings::validate`].
pub struct ValidatedSettings(pub(super) Settings);

/// Manages the application settings, allowing for loading and reloading configurations.
pub struct ConfigManager {
    pub settings: Arc<RwLock<Settings>>,
    pub config_path: PathBuf,
}
