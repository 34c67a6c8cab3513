//! Translation between CIDR blocks, IP addresses and their names under
//! `in-addr.arpa.` and `ip6.arpa.`.

pub mod constants;
pub mod errors;
pub mod functions;
pub mod types;

pub use errors::ReverseDnsError;
pub use functions::{
    get_ptr_owner_name, get_ptr_record_name, get_reverse_zone_name, parse_ptr_record_name,
    parse_reverse_zone_name, ptr_record_suffix, validate_cidr,
};
pub use types::IpFamily;
