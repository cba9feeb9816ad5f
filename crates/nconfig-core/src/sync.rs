//! Synchronizing the active store with an environment document
//!
//! The equality check before any write is load-bearing: the active store
//! may be file-backed under the same watched directory tree, and an
//! unconditional save would trigger a change notification that refreshes
//! again, forever. No semantic change, no write.

use crate::{ActiveStore, Error, Result};
use nconfig_fs::EnvironmentDocument;

/// Merge `document` into `store` with replace semantics.
///
/// Settings and connection strings are compared independently; each
/// category found unequal is cleared and repopulated wholesale so the
/// store exactly mirrors the document afterwards. A single durable save
/// happens only if at least one category changed.
///
/// Returns whether any write occurred.
pub fn sync(store: &mut dyn ActiveStore, document: &EnvironmentDocument) -> Result<bool> {
    let settings_equal = settings_equal(store, document);
    let connections_equal = connections_equal(store, document);

    if settings_equal && connections_equal {
        tracing::debug!("Active store already matches environment document, skipping write");
        return Ok(false);
    }

    if !settings_equal {
        store.clear_settings();
        for (key, value) in &document.settings {
            store.set_setting(key, value);
        }
    }

    if !connections_equal {
        store.clear_connection_strings();
        for conn in &document.connection_strings {
            store.set_connection_string(conn.clone());
        }
    }

    store.save().map_err(|source| Error::Persist { source })?;
    tracing::info!(
        settings_changed = !settings_equal,
        connections_changed = !connections_equal,
        "Active configuration updated"
    );
    Ok(true)
}

fn settings_equal(store: &dyn ActiveStore, document: &EnvironmentDocument) -> bool {
    *store.settings() == document.settings
}

fn connections_equal(store: &dyn ActiveStore, document: &EnvironmentDocument) -> bool {
    let current = store.connection_strings();
    current.len() == document.connection_strings.len()
        && current.iter().all(|c| {
            document
                .connection_string(&c.name)
                .is_some_and(|d| d.connection_string == c.connection_string
                    && d.provider_name == c.provider_name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileStore;
    use nconfig_fs::{ConnectionString, NormalizedPath};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn document(settings: &[(&str, &str)], conns: &[(&str, &str, &str)]) -> EnvironmentDocument {
        EnvironmentDocument {
            settings: settings
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            connection_strings: conns
                .iter()
                .map(|(n, c, p)| ConnectionString {
                    name: n.to_string(),
                    connection_string: c.to_string(),
                    provider_name: p.to_string(),
                })
                .collect(),
        }
    }

    fn file_store(dir: &tempfile::TempDir) -> FileStore {
        FileStore::open(NormalizedPath::new(dir.path().join("active.toml"))).unwrap()
    }

    #[test]
    fn first_sync_writes_second_sync_is_a_noop() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        let doc = document(&[("A", "1"), ("B", "2")], &[("db", "server=x", "p")]);

        assert!(sync(&mut store, &doc).unwrap());
        // Fixed point: same document again performs zero writes.
        assert!(!sync(&mut store, &doc).unwrap());
    }

    #[test]
    fn equal_content_produces_no_file_write() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        let doc = document(&[("A", "1")], &[]);
        sync(&mut store, &doc).unwrap();

        let mtime = std::fs::metadata(store.path().to_native())
            .unwrap()
            .modified()
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(!sync(&mut store, &doc).unwrap());
        let mtime_after = std::fs::metadata(store.path().to_native())
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(mtime, mtime_after);
    }

    #[test]
    fn changed_value_replaces_whole_category() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        sync(&mut store, &document(&[("A", "1"), ("STALE", "x")], &[])).unwrap();

        let next = document(&[("A", "9"), ("B", "2")], &[]);
        assert!(sync(&mut store, &next).unwrap());

        assert_eq!(store.document().settings, next.settings);
        assert!(store.settings().get("STALE").is_none());
    }

    #[test]
    fn settings_change_leaves_equal_connections_untouched() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        let conns = [("db", "server=x", "p")];
        sync(&mut store, &document(&[("A", "1")], &conns)).unwrap();

        assert!(sync(&mut store, &document(&[("A", "2")], &conns)).unwrap());
        assert_eq!(store.connection_strings().len(), 1);
        assert_eq!(store.connection_strings()[0].connection_string, "server=x");
    }

    #[test]
    fn provider_change_is_a_connection_change() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        sync(&mut store, &document(&[], &[("db", "x", "old")])).unwrap();

        assert!(sync(&mut store, &document(&[], &[("db", "x", "new")])).unwrap());
        assert_eq!(store.connection_strings()[0].provider_name, "new");
    }

    #[test]
    fn sync_to_empty_document_clears_store() {
        let dir = tempdir().unwrap();
        let mut store = file_store(&dir);
        sync(&mut store, &document(&[("A", "1")], &[("db", "x", "p")])).unwrap();

        assert!(sync(&mut store, &EnvironmentDocument::default()).unwrap());
        assert!(store.settings().is_empty());
        assert!(store.connection_strings().is_empty());
    }
}
