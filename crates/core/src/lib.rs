pub mod config;
pub mod error;
pub mod partition;
pub mod types;
pub mod week;

pub use config::AppConfig;
pub use error::{RewardsError, RewardsResult};
pub use partition::partition_by_client;
