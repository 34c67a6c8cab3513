/// Suffix of every IPv4 reverse name, including the leading label separator.
pub const IPV4_ARPA_SUFFIX: &str = ".in-addr.arpa.";

/// Suffix of every IPv6 reverse name, including the leading label separator.
pub const IPV6_ARPA_SUFFIX: &str = ".ip6.arpa.";

/// Reverse zones for IPv4 only exist on octet boundaries.
pub const IPV4_ZONE_PREFIX_LENGTHS: [u8; 3] = [8, 16, 24];

pub const IPV6_MIN_PREFIX_LENGTH: u8 = 4;
pub const IPV6_MAX_PREFIX_LENGTH: u8 = 124;
pub const IPV6_PREFIX_STEP: u8 = 4;

/// Labels in a full PTR owner name.
pub const IPV4_PTR_LABELS: usize = 4;
pub const IPV6_PTR_LABELS: usize = 32;

/// Labels a reverse zone name may carry (the zone itself, not a host).
pub const IPV4_MAX_ZONE_LABELS: usize = 3;
pub const IPV6_MAX_ZONE_LABELS: usize = 31;

pub const BITS_PER_OCTET: usize = 8;
pub const BITS_PER_NIBBLE: usize = 4;
