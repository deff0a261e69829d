use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use skyfare_core::FlightProvider;

use crate::middleware::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn FlightProvider>,
    pub limiter: Arc<dyn RateLimiter>,
    /// Agency commission percentage applied to every offer.
    pub commission_rate: f64,
    pub provider_timeout: Duration,
    /// Peers whose `X-Forwarded-For` header is believed.
    pub trusted_proxies: Arc<[IpAddr]>,
}
