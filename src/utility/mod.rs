pub mod cache;
pub mod reverse_dns;
