//! Backend connection settings.

use std::fmt;

/// Process-wide settings used to open every slot's connection.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RedisConfig {
    /// Backend host name or address.
    pub host: String,

    /// Backend TCP port.
    pub port: u16,

    /// Backend password; `None` when the backend requires none.
    pub password: Option<String>,
}

impl RedisConfig {
    /// Create settings for `host:port`. An empty password means none.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            host: host.into(),
            port,
            password: (!password.is_empty()).then_some(password),
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_config_empty_password_means_none() {
        let config = RedisConfig::new("localhost", 6379, "");
        assert!(config.password.is_none());
        let config = RedisConfig::new("localhost", 6379, "secret");
        assert_eq!(config.password.as_deref(), Some("secret"));
    }

    #[test]
    fn redis_config_debug_hides_password() {
        let config = RedisConfig::new("localhost", 6379, "hunter2");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"), "Debug must not print the password");
        assert!(rendered.contains("<redacted>"));
    }
}
