pub mod types;
pub mod config;
pub mod error;
pub mod lenient;

pub use types::*;
pub use config::{DiscoveryConfig, DEFAULT_PAGE_SIZE, DEFAULT_RADIUS_KM};
pub use error::DiscoveryError;
