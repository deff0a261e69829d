pub mod app_config;
pub mod redis_repo;
pub mod provider_client;

pub use app_config::Config;
pub use redis_repo::RedisClient;
pub use provider_client::HttpFlightProvider;
