//! Configuration for Bawwab

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authentication gate configuration.
///
/// Constructed once at startup and shared read-only by all in-flight
/// verifications. Missing keys take their zero values; unrecognized keys
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Directory host
    pub host: String,

    /// Directory port
    pub port: u16,

    /// Root of the subtree identities live under
    /// Example: "dc=example,dc=com"
    pub base_dn: String,

    /// Identity attribute ("uid", "cn", "sAMAccountName", ...)
    pub attribute: String,

    /// Service account DN for search mode
    /// Example: "cn=readonly,dc=example,dc=com"
    pub bind_dn: String,

    /// Service account password
    pub bind_password: String,

    /// Search filter template (use {username} as placeholder).
    /// Presence selects search mode; absence selects bind mode.
    /// Example: "(sAMAccountName={username})"
    pub filter: Option<String>,

    /// Cache TTL in seconds; zero or negative disables caching
    pub cache_ttl: i64,

    /// Directory connect timeout in seconds; zero means the default
    pub timeout: u64,
}

impl GateConfig {
    /// Build a configuration from the proxy's structured key/value map.
    ///
    /// Proto-struct maps deliver every number as a double, so numeric keys
    /// accept both integer and float encodings.
    pub fn from_map(map: &serde_json::Map<String, Value>) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(host) = map.get("host").and_then(Value::as_str) {
            config.host = host.to_string();
        }
        if let Some(port) = map.get("port").and_then(as_u64_lenient) {
            config.port = u16::try_from(port)
                .map_err(|_| crate::Error::InvalidConfig(format!("port out of range: {}", port)))?;
        }
        if let Some(base_dn) = map.get("base_dn").and_then(Value::as_str) {
            config.base_dn = base_dn.to_string();
        }
        if let Some(attribute) = map.get("attribute").and_then(Value::as_str) {
            config.attribute = attribute.to_string();
        }
        if let Some(bind_dn) = map.get("bind_dn").and_then(Value::as_str) {
            config.bind_dn = bind_dn.to_string();
        }
        if let Some(bind_password) = map.get("bind_password").and_then(Value::as_str) {
            config.bind_password = bind_password.to_string();
        }
        if let Some(filter) = map.get("filter").and_then(Value::as_str) {
            config.filter = Some(filter.to_string());
        }
        if let Some(cache_ttl) = map.get("cache_ttl").and_then(as_i64_lenient) {
            config.cache_ttl = cache_ttl;
        }
        if let Some(timeout) = map.get("timeout").and_then(as_u64_lenient) {
            config.timeout = timeout;
        }

        Ok(config)
    }

    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| crate::Error::InvalidConfig(format!("Failed to parse config: {}", e)))
    }

    /// True when a filter template is configured (search-then-bind mode)
    pub fn search_mode(&self) -> bool {
        self.filter.is_some()
    }

    /// Directory URL, plain TCP: "ldap://host:port"
    pub fn server_url(&self) -> String {
        format!("ldap://{}:{}", self.host, self.port)
    }

    /// Connect timeout with the zero value mapped to the default
    pub fn connect_timeout(&self) -> Duration {
        if self.timeout == 0 {
            Duration::from_secs(crate::DEFAULT_CONNECT_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.timeout)
        }
    }

    /// Build the search filter with the username substituted in.
    ///
    /// The caller is expected to LDAP-escape the username first.
    pub fn build_filter(&self, username: &str) -> Option<String> {
        self.filter.as_ref().map(|f| f.replace("{username}", username))
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::Error::InvalidConfig("host is required".into()));
        }

        if self.port == 0 {
            return Err(crate::Error::InvalidConfig("port is required".into()));
        }

        if self.base_dn.is_empty() {
            return Err(crate::Error::InvalidConfig("base_dn is required".into()));
        }

        if self.attribute.is_empty() {
            return Err(crate::Error::InvalidConfig("attribute is required".into()));
        }

        if let Some(filter) = &self.filter {
            if !filter.contains("{username}") {
                return Err(crate::Error::InvalidConfig(
                    "filter must contain the {username} placeholder".into(),
                ));
            }
            if self.bind_dn.is_empty() {
                return Err(crate::Error::InvalidConfig(
                    "search mode requires a bind_dn service account".into(),
                ));
            }
        }

        Ok(())
    }
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_f64().map(|f| f as u64))
}

fn as_i64_lenient(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}
