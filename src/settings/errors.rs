// 3rd party crates
use thiserror::Error;

// Project imports
use crate::providers::powerdns::PowerDnsError;
use crate::resources::ResourceError;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid log level: {0}. Must be one of: error, warn, info, debug, trace")]
    InvalidLogLevel(String),
    #[error("PowerDNS configuration error: {0}")]
    PowerDns(#[from] PowerDnsError),
    #[error("Invalid CIDR in {field}: {reason}")]
    InvalidCidr { field: &'static str, reason: String },
    #[error("Record {name} {record_type} must have at least one value")]
    EmptyRecords { name: String, record_type: String },
    #[error("Resource configuration error: {0}")]
    InvalidResource(#[from] ResourceError),
}
