pub mod rate_limit;

pub use rate_limit::{
    client_id, rate_limit_middleware, spawn_sweeper, FixedWindowLimiter, RateLimiter,
    RedisRateLimiter,
};
