use core_config::{ConfigError, FromEnv, env_first};

/// Redis connection settings.
///
/// `REDIS_URL` is read first; `REDIS_HOST` is accepted for deployments
/// that only set a host. A bare host gets the `redis://` scheme.
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// URL with a scheme, suitable for `redis::Client::open`.
    pub fn connection_url(&self) -> String {
        if self.url.contains("://") {
            self.url.clone()
        } else if self.url.contains(':') {
            format!("redis://{}", self.url)
        } else {
            format!("redis://{}:6379", self.url)
        }
    }
}

impl FromEnv for RedisConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_first(&["REDIS_URL", "REDIS_HOST"])
            .ok_or_else(|| ConfigError::MissingEnvVar("REDIS_URL or REDIS_HOST".to_string()))?;
        Ok(Self::new(url))
    }
}
