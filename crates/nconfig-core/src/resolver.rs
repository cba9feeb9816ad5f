//! Environment resolution
//!
//! Maps the machine's identity candidates through the definitions
//! document to a single environment name and loads its document,
//! enforcing key-set parity against the default environment.

use crate::{Category, Error, Result};
use nconfig_fs::{DocumentStore, EnvironmentDefinitions, EnvironmentDocument, NormalizedPath};

/// The outcome of a successful resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Name of the resolved environment.
    pub environment: String,
    /// The resolved environment's full document.
    pub document: EnvironmentDocument,
}

/// Resolves identity candidates to an environment.
pub struct EnvironmentResolver {
    root: NormalizedPath,
    store: DocumentStore,
}

impl EnvironmentResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            store: DocumentStore::new(),
        }
    }

    /// Resolve the environment for the given candidates.
    ///
    /// The first candidate present in the definitions wins; no match
    /// falls back to the effective default (`default_override` when
    /// supplied, else the definitions' `"default"` entry).
    ///
    /// When the resolved environment is not the effective default, both
    /// documents are loaded and checked for key-set parity: same setting
    /// keys and same connection-string names, values free to differ.
    /// Resolving to the default itself needs no check.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentEnvironment`] on a parity mismatch, naming
    /// the environment and the offending category. Document load
    /// failures propagate as [`Error::Fs`].
    pub fn resolve(
        &self,
        definitions: &EnvironmentDefinitions,
        candidates: &[String],
        default_override: Option<&str>,
    ) -> Result<Resolution> {
        let effective_default = default_override.unwrap_or(definitions.default_environment());

        let environment = candidates
            .iter()
            .find_map(|candidate| definitions.lookup(candidate))
            .unwrap_or(effective_default)
            .to_string();

        tracing::debug!(environment = %environment, default = %effective_default, "Resolved environment");

        if environment != effective_default {
            let default_doc = self.store.load_environment(&self.root, effective_default)?;
            let environment_doc = self.store.load_environment(&self.root, &environment)?;

            if !default_doc.same_setting_keys(&environment_doc) {
                return Err(Error::InconsistentEnvironment {
                    environment,
                    category: Category::Settings,
                });
            }
            if !default_doc.same_connection_names(&environment_doc) {
                return Err(Error::InconsistentEnvironment {
                    environment,
                    category: Category::ConnectionStrings,
                });
            }

            return Ok(Resolution {
                environment,
                document: environment_doc,
            });
        }

        let document = self.store.load_environment(&self.root, &environment)?;
        Ok(Resolution {
            environment,
            document,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::{TempDir, tempdir};

    fn write_env(dir: &TempDir, name: &str, body: &str) {
        std::fs::write(dir.path().join(format!("{name}.toml")), body).unwrap();
    }

    fn definitions(entries: &[(&str, &str)]) -> EnvironmentDefinitions {
        let map: BTreeMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentDefinitions::from_entries(map, &NormalizedPath::new("environments.toml"))
            .unwrap()
    }

    fn candidates(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn first_match_wins_over_more_specific_keys() {
        let dir = tempdir().unwrap();
        write_env(&dir, "dev", "[settings]\nA = \"1\"\n");
        write_env(&dir, "stage", "[settings]\nA = \"2\"\n");
        write_env(&dir, "prod", "[settings]\nA = \"3\"\n");

        let defs = definitions(&[("default", "dev"), ("a", "stage"), ("b.com", "prod")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let resolution = resolver
            .resolve(&defs, &candidates(&["a.b.com", "a", "b.com"]), None)
            .unwrap();
        assert_eq!(resolution.environment, "stage");
    }

    #[test]
    fn no_match_falls_back_to_default() {
        let dir = tempdir().unwrap();
        write_env(&dir, "dev", "[settings]\nA = \"1\"\n");

        let defs = definitions(&[("default", "dev"), ("otherhost", "stage")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let resolution = resolver
            .resolve(&defs, &candidates(&["unknown"]), None)
            .unwrap();
        assert_eq!(resolution.environment, "dev");
        assert_eq!(resolution.document.setting("A"), Some("1"));
    }

    #[test]
    fn override_replaces_the_default() {
        let dir = tempdir().unwrap();
        write_env(&dir, "local", "[settings]\nA = \"x\"\n");

        let defs = definitions(&[("default", "dev")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let resolution = resolver
            .resolve(&defs, &candidates(&["unknown"]), Some("local"))
            .unwrap();
        assert_eq!(resolution.environment, "local");
    }

    #[test]
    fn resolution_is_deterministic() {
        let dir = tempdir().unwrap();
        write_env(&dir, "dev", "[settings]\nA = \"1\"\nB = \"2\"\n");
        write_env(&dir, "stage", "[settings]\nA = \"9\"\nB = \"2\"\n");

        let defs = definitions(&[("default", "dev"), ("myhost", "stage")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));
        let cands = candidates(&["myhost"]);

        for _ in 0..3 {
            let resolution = resolver.resolve(&defs, &cands, None).unwrap();
            assert_eq!(resolution.environment, "stage");
            assert_eq!(resolution.document.setting("A"), Some("9"));
        }
    }

    #[test]
    fn missing_setting_key_fails_parity() {
        let dir = tempdir().unwrap();
        write_env(&dir, "dev", "[settings]\nA = \"1\"\nB = \"2\"\n");
        write_env(&dir, "stage", "[settings]\nA = \"9\"\n");

        let defs = definitions(&[("default", "dev"), ("myhost", "stage")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let err = resolver
            .resolve(&defs, &candidates(&["myhost"]), None)
            .unwrap_err();
        match err {
            Error::InconsistentEnvironment {
                environment,
                category,
            } => {
                assert_eq!(environment, "stage");
                assert_eq!(category, Category::Settings);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn connection_name_mismatch_fails_parity() {
        let dir = tempdir().unwrap();
        write_env(
            &dir,
            "dev",
            "[[connection_strings]]\nname = \"db\"\nconnection_string = \"x\"\n",
        );
        write_env(
            &dir,
            "stage",
            "[[connection_strings]]\nname = \"cache\"\nconnection_string = \"y\"\n",
        );

        let defs = definitions(&[("default", "dev"), ("myhost", "stage")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let err = resolver
            .resolve(&defs, &candidates(&["myhost"]), None)
            .unwrap_err();
        match err {
            Error::InconsistentEnvironment { category, .. } => {
                assert_eq!(category, Category::ConnectionStrings);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resolving_the_default_skips_parity() {
        let dir = tempdir().unwrap();
        // Only the default's document exists; that is fine when the
        // default itself is resolved.
        write_env(&dir, "dev", "[settings]\nA = \"1\"\n");

        let defs = definitions(&[("default", "dev"), ("myhost", "dev")]);
        let resolver = EnvironmentResolver::new(NormalizedPath::new(dir.path()));

        let resolution = resolver
            .resolve(&defs, &candidates(&["myhost"]), None)
            .unwrap();
        assert_eq!(resolution.environment, "dev");
    }
}
