pub mod constants;
pub mod data_sources;
pub mod errors;
pub mod functions;
pub mod ptr_record;
pub mod record;
pub mod recursor_config;
pub mod recursor_forward_zone;
pub mod reverse_zone;
pub mod traits;
pub mod types;
pub mod zone;

pub use errors::ResourceError;
pub use traits::Resource;
pub use types::{Ensure, Outcome, ResourceKind};
