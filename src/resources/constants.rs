pub const DEFAULT_ACCOUNT: &str = "admin";
pub const DEFAULT_ZONE_KIND: &str = "Native";

/// Zone kinds accepted in declarations, in canonical spelling.
pub const ZONE_KINDS: [&str; 3] = ["Native", "Master", "Slave"];
pub const SLAVE_KIND: &str = "Slave";
pub const FORWARDED_KIND: &str = "Forwarded";

pub const NS_TYPE: &str = "NS";
pub const PTR_TYPE: &str = "PTR";
pub const NS_RRSET_TTL: u32 = 3600;

/// The Recursor reports forwarders with the default port spelled out.
pub const DEFAULT_DNS_PORT_SUFFIX: &str = ":53";

/// Backends that cannot edit records answer a delete with one of these.
pub const READ_ONLY_BACKEND_ERRORS: [&str; 2] = [
    "Hosting backend does not support editing records",
    "Attempt to abort a transaction while there isn't one open",
];

pub const MISSING_DOMAIN_ERROR: &str = "Could not find domain";
