pub mod constants;
pub mod errors;
pub mod functions;
pub mod impls;
pub mod models;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::PowerDnsError;
pub use types::{PowerDns, PowerDnsConfig};
