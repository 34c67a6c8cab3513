// 3rd party crates
use thiserror::Error;

// Project imports
use crate::providers::powerdns::PowerDnsError;
use crate::utility::reverse_dns::ReverseDnsError;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Api(#[from] PowerDnsError),

    #[error(transparent)]
    ReverseDns(#[from] ReverseDnsError),

    #[error("Invalid {resource} configuration: {reason}")]
    InvalidConfig {
        resource: &'static str,
        reason: String,
    },

    #[error("{resource} {id:?} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid import ID {id:?}: {reason}")]
    InvalidImportId { id: String, reason: String },

    #[error("{resource} {id:?} must be recreated to change {field}")]
    RequiresReplacement {
        resource: &'static str,
        id: String,
        field: &'static str,
    },
}
