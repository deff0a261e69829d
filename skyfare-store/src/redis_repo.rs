use redis::RedisResult;
use tracing::debug;

/// Fixed-window counter. Denies without incrementing once the window is
/// full; the first hit in a window arms the expiry.
const FIXED_WINDOW_SCRIPT: &str = r#"
    local count = tonumber(redis.call("GET", KEYS[1]) or "0")
    if count >= tonumber(ARGV[2]) then
        return 0
    end
    count = redis.call("INCR", KEYS[1])
    if count == 1 then
        redis.call("PEXPIRE", KEYS[1], ARGV[1])
    end
    return 1
"#;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub fn rate_limit_key(client_id: &str) -> String {
        format!("ratelimit:search:{}", client_id)
    }

    pub async fn check_rate_limit(
        &self,
        client_id: &str,
        max_requests: u32,
        window_ms: u64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::rate_limit_key(client_id);

        let allowed: i64 = redis::Script::new(FIXED_WINDOW_SCRIPT)
            .key(&key)
            .arg(window_ms)
            .arg(max_requests)
            .invoke_async(&mut conn)
            .await?;

        debug!(key = %key, allowed = allowed == 1, "Rate limit checked");
        Ok(allowed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced() {
        assert_eq!(RedisClient::rate_limit_key("10.0.0.1"), "ratelimit:search:10.0.0.1");
    }

    #[test]
    fn test_client_rejects_bad_url() {
        assert!(RedisClient::new("not a redis url").is_err());
        assert!(RedisClient::new("redis://127.0.0.1:6379").is_ok());
    }
}
