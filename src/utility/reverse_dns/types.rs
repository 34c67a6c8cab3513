// Standard library
use std::fmt;
use std::net::IpAddr;

// Current module imports
use super::constants::{IPV4_ARPA_SUFFIX, IPV6_ARPA_SUFFIX};

/// Address family of a CIDR block, an address or a reverse name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// The arpa suffix, with its leading dot, under which this family's
    /// reverse names live.
    pub fn arpa_suffix(self) -> &'static str {
        match self {
            IpFamily::V4 => IPV4_ARPA_SUFFIX,
            IpFamily::V6 => IPV6_ARPA_SUFFIX,
        }
    }

    pub(crate) fn allowed_prefix_lengths(self) -> &'static str {
        match self {
            IpFamily::V4 => "8, 16, or 24",
            IpFamily::V6 => "a multiple of 4 between 4 and 124",
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}
