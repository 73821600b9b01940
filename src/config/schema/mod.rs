mod core;
mod gateway;
mod memory;
mod model;
mod recall;

pub use self::core::Config;
#[cfg(test)]
pub(crate) use self::core::test_env;
pub use gateway::GatewayConfig;
pub use memory::{StoreConfig, VectorBackend, VectorConfig};
pub use model::ModelConfig;
pub use recall::{ConsolidationConfig, RateLimitConfig, RecallConfig};
