//! Format-agnostic loading and saving of environment documents

use crate::{Error, EnvironmentDocument, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::{BTreeMap, BTreeSet};

/// Document extensions probed when locating files by environment name,
/// in priority order.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

/// The environments-definitions document: a mapping from lowercase
/// identity candidate (or literal key) to environment name.
///
/// The `"default"` entry is mandatory and names the fallback environment,
/// which is also the parity baseline for validation.
#[derive(Debug, Clone)]
pub struct EnvironmentDefinitions {
    entries: BTreeMap<String, String>,
}

impl EnvironmentDefinitions {
    /// Build definitions from raw entries, lowercasing keys for
    /// case-insensitive candidate matching.
    ///
    /// Fails with [`Error::MissingDefault`] when no `"default"` entry
    /// exists; `path` is only used for the error message.
    pub fn from_entries(
        entries: BTreeMap<String, String>,
        path: &NormalizedPath,
    ) -> Result<Self> {
        let entries: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        if !entries.contains_key("default") {
            return Err(Error::MissingDefault {
                path: path.to_native(),
            });
        }
        Ok(Self { entries })
    }

    /// The environment named by the `"default"` entry.
    pub fn default_environment(&self) -> &str {
        // Presence is checked on construction.
        &self.entries["default"]
    }

    /// Case-insensitive candidate lookup. The `"default"` entry is a
    /// regular key here; candidates named "default" match it.
    pub fn lookup(&self, candidate: &str) -> Option<&str> {
        self.entries
            .get(&candidate.to_lowercase())
            .map(String::as_str)
    }

    /// Every distinct environment name referenced by any entry,
    /// including the default.
    pub fn environment_names(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    /// Number of mapping entries, including `"default"`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Format-agnostic document store.
///
/// Detects the format from the file extension and handles
/// serialization transparently: `.toml`, `.json`, `.yaml`/`.yml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStore;

impl DocumentStore {
    pub fn new() -> Self {
        Self
    }

    /// Load any deserializable value from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let content = io::read_text(path)?;
        let extension = path.extension().unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(|e| Error::Parse {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(&content).map_err(|e| Error::Parse {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| Error::Parse {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Save a serializable value to a file, atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let extension = path.extension().unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(value).map_err(|e| Error::Serialize {
                path: path.to_native(),
                format: "TOML".into(),
                message: e.to_string(),
            })?,
            "json" => serde_json::to_string_pretty(value).map_err(|e| Error::Serialize {
                path: path.to_native(),
                format: "JSON".into(),
                message: e.to_string(),
            })?,
            "yaml" | "yml" => serde_yaml::to_string(value).map_err(|e| Error::Serialize {
                path: path.to_native(),
                format: "YAML".into(),
                message: e.to_string(),
            })?,
            _ => {
                return Err(Error::UnsupportedFormat {
                    extension: extension.to_string(),
                });
            }
        };

        io::write_atomic(path, content.as_bytes())
    }

    /// Load an environment document.
    pub fn load_document(&self, path: &NormalizedPath) -> Result<EnvironmentDocument> {
        self.load(path)
    }

    /// Load the environments-definitions document and enforce the
    /// mandatory `"default"` entry.
    pub fn load_definitions(&self, path: &NormalizedPath) -> Result<EnvironmentDefinitions> {
        let entries: BTreeMap<String, String> = self.load(path)?;
        EnvironmentDefinitions::from_entries(entries, path)
    }

    /// Resolve `<root>/<name>.<ext>` by probing the supported
    /// extensions in priority order.
    pub fn document_path(&self, root: &NormalizedPath, name: &str) -> Result<NormalizedPath> {
        for ext in SUPPORTED_EXTENSIONS {
            let candidate = root.join(&format!("{name}.{ext}"));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
        Err(Error::EnvironmentNotFound {
            name: name.to_string(),
            root: root.to_native(),
        })
    }

    /// Load the document for an environment by name.
    pub fn load_environment(
        &self,
        root: &NormalizedPath,
        name: &str,
    ) -> Result<EnvironmentDocument> {
        let path = self.document_path(root, name)?;
        self.load_document(&path)
    }
}
