//! The per-environment configuration document model

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A named connection string record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionString {
    pub name: String,
    pub connection_string: String,
    #[serde(default)]
    pub provider_name: String,
}

/// One environment's configuration: key/value settings plus named
/// connection strings.
///
/// This is also the shape of the host's active configuration store, so
/// synchronization is a diff between two documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentDocument {
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    #[serde(default)]
    pub connection_strings: Vec<ConnectionString>,
}

impl EnvironmentDocument {
    /// Look up a setting value by key.
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Look up a connection string record by name.
    pub fn connection_string(&self, name: &str) -> Option<&ConnectionString> {
        self.connection_strings.iter().find(|c| c.name == name)
    }

    /// The set of setting keys.
    pub fn setting_keys(&self) -> BTreeSet<&str> {
        self.settings.keys().map(String::as_str).collect()
    }

    /// The set of connection-string names.
    pub fn connection_names(&self) -> BTreeSet<&str> {
        self.connection_strings
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Whether both documents expose exactly the same setting keys.
    /// Values are not compared.
    pub fn same_setting_keys(&self, other: &Self) -> bool {
        self.settings.len() == other.settings.len() && self.setting_keys() == other.setting_keys()
    }

    /// Whether both documents expose exactly the same connection-string
    /// names. Values and providers are not compared.
    pub fn same_connection_names(&self, other: &Self) -> bool {
        self.connection_strings.len() == other.connection_strings.len()
            && self.connection_names() == other.connection_names()
    }

    /// Key-and-value equality for the settings category.
    pub fn eq_settings(&self, other: &Self) -> bool {
        self.settings == other.settings
    }

    /// Full `(name, connection_string, provider_name)` equality for the
    /// connection-strings category, order-insensitive.
    pub fn eq_connection_strings(&self, other: &Self) -> bool {
        if !self.same_connection_names(other) {
            return false;
        }
        self.connection_strings.iter().all(|c| {
            other
                .connection_string(&c.name)
                .is_some_and(|o| o.connection_string == c.connection_string
                    && o.provider_name == c.provider_name)
        })
    }
}
