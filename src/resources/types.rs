// Standard library
use std::fmt;

// 3rd party crates
use serde::Deserialize;

/// Whether a declared resource should exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

/// What reconciling one declaration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    Unchanged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => write!(f, "created"),
            Outcome::Updated => write!(f, "updated"),
            Outcome::Deleted => write!(f, "deleted"),
            Outcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Resource types that can be imported by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "powerdns_zone")]
    Zone,
    #[serde(rename = "powerdns_record")]
    Record,
    #[serde(rename = "powerdns_ptr_record")]
    PtrRecord,
    #[serde(rename = "powerdns_reverse_zone")]
    ReverseZone,
    #[serde(rename = "powerdns_recursor_config")]
    RecursorConfig,
    #[serde(rename = "powerdns_recursor_forward_zone")]
    RecursorForwardZone,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Zone => "powerdns_zone",
            ResourceKind::Record => "powerdns_record",
            ResourceKind::PtrRecord => "powerdns_ptr_record",
            ResourceKind::ReverseZone => "powerdns_reverse_zone",
            ResourceKind::RecursorConfig => "powerdns_recursor_config",
            ResourceKind::RecursorForwardZone => "powerdns_recursor_forward_zone",
        };
        write!(f, "{}", name)
    }
}
