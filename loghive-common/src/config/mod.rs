mod defaults;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;
use serde::{Deserialize, Serialize};

use crate::{ColorPair, Secret};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UiConfig {
    /// CSS string applied as the `user_shade` of internal entries.
    #[serde(default = "_default_accent")]
    pub accent: String,

    #[serde(default = "_default_entries_per_page")]
    pub entries_per_page: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent: _default_accent(),
            entries_per_page: _default_entries_per_page(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InjectionGuardConfig {
    /// Tokens that reject a credential string wherever they appear.
    #[serde(default = "_default_guard_cases")]
    pub cases: Vec<String>,

    /// Token groups that reject a string when all members are found in
    /// the given order.
    #[serde(default = "_default_guard_groups")]
    pub groups: Vec<Vec<String>>,

    /// (find, replace) pairs applied to strings that passed the scans.
    #[serde(default = "_default_guard_replaces")]
    pub replaces: Vec<(String, String)>,
}

impl Default for InjectionGuardConfig {
    fn default() -> Self {
        Self {
            cases: _default_guard_cases(),
            groups: _default_guard_groups(),
            replaces: _default_guard_replaces(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoginConfig {
    /// Failed attempts from one address before it is locked out.
    #[serde(default = "_default_max_tries")]
    pub max_tries: u32,

    #[serde(default = "_default_lockout", with = "humantime_serde")]
    pub lockout: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            max_tries: _default_max_tries(),
            lockout: _default_lockout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub injection_guard: InjectionGuardConfig,

    #[serde(default)]
    pub login: LoginConfig,
}

/// A producer known ahead of time, keyed by its identifier in the
/// `producers` map.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProducerConfig {
    #[serde(default)]
    pub fore: Option<String>,

    #[serde(default)]
    pub back: Option<String>,

    /// Display name shown next to the producer identifier.
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoghiveConfigStore {
    #[serde(default = "_default_listen")]
    pub listen: SocketAddr,

    /// When set, severities and producers are bulk-loaded from this
    /// database at boot and logins are checked against it.
    #[serde(default)]
    pub database_url: Option<Secret<String>>,

    /// Public instances let every viewer see every producer's entries.
    #[serde(default = "_default_false")]
    pub public: bool,

    #[serde(default = "_default_true")]
    pub require_login: bool,

    #[serde(default = "_default_severities")]
    pub severities: HashMap<String, ColorPair>,

    #[serde(default)]
    pub producers: HashMap<String, ProducerConfig>,

    #[serde(default)]
    pub external_url: Option<String>,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for LoghiveConfigStore {
    fn default() -> Self {
        Self {
            listen: _default_listen(),
            database_url: None,
            public: false,
            require_login: true,
            severities: _default_severities(),
            producers: HashMap::new(),
            external_url: None,
            ui: UiConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoghiveConfig {
    pub store: LoghiveConfigStore,
    pub paths_relative_to: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_core_severities() {
        let store = LoghiveConfigStore::default();
        for name in ["success", "warning", "attention", "error", "critical"] {
            assert!(store.severities.contains_key(name), "missing {name}");
        }
        assert_eq!(store.ui.entries_per_page, 20);
        assert_eq!(store.security.login.max_tries, 5);
    }

    #[test]
    fn test_store_deserializes_from_empty_map() {
        let store: LoghiveConfigStore = serde_json::from_str("{}").unwrap();
        assert!(store.require_login);
        assert!(!store.public);
        assert!(store.database_url.is_none());
    }

    #[test]
    fn test_lockout_parses_humantime() {
        let store: LoghiveConfigStore =
            serde_json::from_str(r#"{"security": {"login": {"lockout": "15m"}}}"#).unwrap();
        assert_eq!(store.security.login.lockout, Duration::from_secs(900));
    }
}
