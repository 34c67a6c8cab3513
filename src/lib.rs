//! Declarative management of PowerDNS Authoritative Server and Recursor
//! objects over their HTTP APIs.

pub mod functions;
pub mod providers;
pub mod resources;
pub mod settings;
pub mod utility;
