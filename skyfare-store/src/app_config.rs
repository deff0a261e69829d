use serde::Deserialize;
use std::env;
use std::net::IpAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub pricing: PricingConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub access_token: String,
    pub api_version: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    /// Agency commission as a percentage of the provider fare.
    pub commission_rate: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    Memory,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_requests: u32,
    pub backend: RateLimitBackend,
    pub redis_url: Option<String>,
    /// How often stale in-memory windows are purged.
    pub sweep_interval_ms: u64,
    /// Proxy addresses allowed to report the client through `X-Forwarded-For`.
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_for(&run_mode)
    }

    pub fn load_for(run_mode: &str) -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            .set_default("server.port", 3000)?
            .set_default("provider.base_url", "https://api.duffel.com")?
            .set_default("provider.access_token", "")?
            .set_default("provider.api_version", "v2")?
            .set_default("provider.timeout_ms", 20_000)?
            .set_default("pricing.commission_rate", 0.0)?
            .set_default("rate_limit.window_ms", 60_000)?
            .set_default("rate_limit.max_requests", 15)?
            .set_default("rate_limit.backend", "memory")?
            .set_default("rate_limit.sweep_interval_ms", 60_000)?
            .set_default("rate_limit.trusted_proxies", Vec::<String>::new())?
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `SKYFARE_RATE_LIMIT__MAX_REQUESTS=30`
            .add_source(
                config::Environment::with_prefix("SKYFARE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("rate_limit.trusted_proxies"),
            )
            // Plain variable names shared with the rest of the deployment
            .set_override_option("pricing.commission_rate", env::var("COMMISSION_RATE").ok())?
            .set_override_option("provider.access_token", env::var("PROVIDER_ACCESS_TOKEN").ok())?
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the service at runtime.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let limits = [
            ("provider.timeout_ms", self.provider.timeout_ms),
            ("rate_limit.window_ms", self.rate_limit.window_ms),
            ("rate_limit.sweep_interval_ms", self.rate_limit.sweep_interval_ms),
        ];
        for (key, value) in limits {
            if value == 0 {
                return Err(config::ConfigError::Message(format!(
                    "{} must be greater than zero",
                    key
                )));
            }
        }

        for proxy in &self.rate_limit.trusted_proxies {
            if proxy.parse::<IpAddr>().is_err() {
                return Err(config::ConfigError::Message(format!(
                    "rate_limit.trusted_proxies entry '{}' is not an IP address",
                    proxy
                )));
            }
        }
        Ok(())
    }

    /// Parsed `rate_limit.trusted_proxies`; entries are checked by `validate`.
    pub fn trusted_proxies(&self) -> Vec<IpAddr> {
        self.rate_limit
            .trusted_proxies
            .iter()
            .filter_map(|proxy| proxy.parse().ok())
            .collect()
    }
}
