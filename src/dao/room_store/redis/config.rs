use std::env;

/// Environment variable naming the Redis REST endpoint.
pub const REDIS_REST_URL_ENV: &str = "REDIS_REST_URL";
/// Environment variable carrying the bearer token, if the endpoint needs one.
pub const REDIS_REST_TOKEN_ENV: &str = "REDIS_REST_TOKEN";

/// Connection settings for the Redis REST backend.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Base URL of the Upstash-compatible REST endpoint.
    pub base_url: String,
    /// Optional bearer token presented on every request.
    pub token: Option<String>,
}

impl RedisConfig {
    /// Read the connection settings from the environment.
    ///
    /// Returns `None` when no endpoint is configured, in which case the
    /// application keeps running without durable storage.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var(REDIS_REST_URL_ENV)
            .ok()
            .filter(|value| !value.is_empty())?;
        let token = env::var(REDIS_REST_TOKEN_ENV)
            .ok()
            .filter(|value| !value.is_empty());
        Some(Self { base_url, token })
    }
}
