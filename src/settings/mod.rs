pub mod constants;
pub mod errors;
pub mod impls;
pub mod types;

pub use errors::ValidationError;
pub use types::{ConfigManager, Settings};
