pub mod schema;

pub use schema::{
    Config, ConsolidationConfig, GatewayConfig, ModelConfig, RateLimitConfig, RecallConfig,
    StoreConfig, VectorBackend, VectorConfig,
};
