//! Process configuration read from the environment at startup.

use std::fmt;
use std::net::SocketAddr;

use slotgate_store::RedisConfig;

/// Default bind address: all interfaces, port 6380.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:6380";

/// Errors raised while loading configuration. All of them are fatal.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Which backend the pool connects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// A Redis server; each slot is the logical database of the same number.
    Redis(RedisConfig),
    /// The process-local in-memory store.
    Memory,
}

/// Gateway configuration.
#[derive(Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,

    /// Backend the slot pool connects to.
    pub backend: BackendKind,

    /// The one username accepted by the authentication gate.
    pub auth_username: String,

    /// Plain-text password for `auth_username`; hashed once at startup.
    pub auth_password: String,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    /// See [`GatewayConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] if a required variable is unset, or
    /// [`ConfigError::Invalid`] if a port, address or backend kind does not
    /// parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |var: &'static str| lookup(var).ok_or(ConfigError::Missing(var));

        let listen_raw = lookup("SLOTGATE_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "SLOTGATE_LISTEN_ADDR",
            reason: e.to_string(),
        })?;

        let backend = match lookup("SLOTGATE_BACKEND").as_deref().unwrap_or("redis") {
            "redis" => {
                let host = require("HOST")?;
                let port = require("PORT")?.parse::<u16>().map_err(|e| ConfigError::Invalid {
                    var: "PORT",
                    reason: e.to_string(),
                })?;
                BackendKind::Redis(RedisConfig::new(host, port, require("PASS")?))
            }
            "memory" => BackendKind::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "SLOTGATE_BACKEND",
                    reason: format!("unknown backend '{other}'; expected 'redis' or 'memory'"),
                })
            }
        };

        Ok(Self {
            listen_addr,
            backend,
            auth_username: require("AUTH_USERNAME")?,
            auth_password: require("AUTH_PASSWD")?,
        })
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("listen_addr", &self.listen_addr)
            .field("backend", &self.backend)
            .field("auth_username", &self.auth_username)
            .field("auth_password", &"<redacted>")
            .finish()
    }
}
