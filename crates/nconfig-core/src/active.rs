//! The host's active configuration store
//!
//! The store is owned by the host process; the core only reads it and
//! mutates it through this trait during a sync, never replacing the
//! store object itself.

use nconfig_fs::{
    ConnectionString, DocumentStore, EnvironmentDocument, NormalizedPath, Result as FsResult,
};
use std::collections::BTreeMap;

/// Accessor contract for the live configuration the host actually uses.
pub trait ActiveStore: Send {
    fn settings(&self) -> &BTreeMap<String, String>;
    fn connection_strings(&self) -> &[ConnectionString];

    fn set_setting(&mut self, key: &str, value: &str);
    fn set_connection_string(&mut self, conn: ConnectionString);
    fn clear_settings(&mut self);
    fn clear_connection_strings(&mut self);

    /// Persist the store durably. Called at most once per sync, and only
    /// when something changed.
    fn save(&mut self) -> FsResult<()>;
}

/// File-backed active store: an environment document at a fixed path,
/// persisted through the document store.
#[derive(Debug)]
pub struct FileStore {
    path: NormalizedPath,
    document: EnvironmentDocument,
    store: DocumentStore,
}

impl FileStore {
    /// Open the store at `path`, loading the existing document or
    /// starting empty when the file does not exist yet.
    pub fn open(path: NormalizedPath) -> FsResult<Self> {
        let store = DocumentStore::new();
        let document = if path.is_file() {
            store.load_document(&path)?
        } else {
            EnvironmentDocument::default()
        };
        Ok(Self {
            path,
            document,
            store,
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// The live document. The sync layer compares against this.
    pub fn document(&self) -> &EnvironmentDocument {
        &self.document
    }
}

impl ActiveStore for FileStore {
    fn settings(&self) -> &BTreeMap<String, String> {
        &self.document.settings
    }

    fn connection_strings(&self) -> &[ConnectionString] {
        &self.document.connection_strings
    }

    fn set_setting(&mut self, key: &str, value: &str) {
        self.document
            .settings
            .insert(key.to_string(), value.to_string());
    }

    fn set_connection_string(&mut self, conn: ConnectionString) {
        match self
            .document
            .connection_strings
            .iter_mut()
            .find(|c| c.name == conn.name)
        {
            Some(existing) => *existing = conn,
            None => self.document.connection_strings.push(conn),
        }
    }

    fn clear_settings(&mut self) {
        self.document.settings.clear();
    }

    fn clear_connection_strings(&mut self) {
        self.document.connection_strings.clear();
    }

    fn save(&mut self) -> FsResult<()> {
        self.store.save(&self.path, &self.document)
    }
}
