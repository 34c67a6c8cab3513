// 3rd party crates
use thiserror::Error;

// Current module imports
use super::types::IpFamily;

/// Failures of the reverse DNS translation routines.
///
/// Every variant describes bad input; none of them is worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReverseDnsError {
    #[error("{field}: expected string, got {actual}")]
    TypeMismatch { field: String, actual: &'static str },

    #[error("invalid {expected} format: {input:?}")]
    MalformedInput { expected: &'static str, input: String },

    #[error("{family} prefix length must be {}, got /{prefix}", .family.allowed_prefix_lengths())]
    UnsupportedPrefixLength { family: IpFamily, prefix: u8 },

    #[error("unsupported label count in {name:?}: expected {expected}, got {got}")]
    UnsupportedLabelCount {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("invalid IPv6 nibble label {label:?} in {name:?}")]
    InvalidNibble { name: String, label: String },

    #[error("unsupported format {0:?}: expected a name ending in .in-addr.arpa. or .ip6.arpa.")]
    UnsupportedSuffix(String),
}
