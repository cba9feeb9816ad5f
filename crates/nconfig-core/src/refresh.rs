//! Refresh orchestration and process-wide state
//!
//! The [`RefreshController`] is the single context object a host
//! constructs at startup. It owns the active store, memoizes the located
//! root, serializes refresh cycles, and publishes the resolved
//! environment for concurrent readers.
//!
//! Two separate synchronization domains, deliberately not collapsed:
//! a refresh (resolution + sync, bounded I/O) runs under an unbounded
//! mutex so bursts of triggers coalesce into sequential full recomputes,
//! while the published `{environment, snapshot}` pair sits behind a
//! reader/writer lock with a short bounded wait so readers and the
//! publishing refresh can never deadlock each other.

use crate::{
    ActiveStore, Error, EnvironmentResolver, HostIdentity, Identity, Result, ValidationReport,
    sync, validate,
};
use nconfig_fs::{DocumentStore, EnvironmentDocument, NormalizedPath, definitions_path, locate_root};
use parking_lot::{Mutex, RwLock};
use std::time::Duration;

/// Bounded wait for published-state lock acquisition.
const STATE_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// The last successfully published resolution.
#[derive(Debug, Clone)]
pub struct ResolvedState {
    pub environment: String,
    pub snapshot: EnvironmentDocument,
}

/// Everything a refresh cycle mutates, guarded by the refresh mutex.
struct RefreshInner {
    /// Memoized after the first successful location.
    root: Option<NormalizedPath>,
    /// Explicit fallback environment, set by
    /// [`RefreshController::initialize_with_default`].
    default_override: Option<String>,
    /// The host's live configuration store.
    active: Box<dyn ActiveStore>,
}

/// Owns process-wide resolution state and serializes refreshes.
pub struct RefreshController {
    start_dir: NormalizedPath,
    identity: Box<dyn Identity>,
    inner: Mutex<RefreshInner>,
    state: RwLock<Option<ResolvedState>>,
}

impl RefreshController {
    /// Create a controller using the host's network identity.
    pub fn new(start_dir: NormalizedPath, active: Box<dyn ActiveStore>) -> Self {
        Self::with_identity(start_dir, Box::new(HostIdentity::new()), active)
    }

    /// Create a controller with an explicit identity source (tests, or
    /// hosts that pin their identity).
    pub fn with_identity(
        start_dir: NormalizedPath,
        identity: Box<dyn Identity>,
        active: Box<dyn ActiveStore>,
    ) -> Self {
        Self {
            start_dir,
            identity,
            inner: Mutex::new(RefreshInner {
                root: None,
                default_override: None,
                active,
            }),
            state: RwLock::new(None),
        }
    }

    /// Run a full resolution + sync cycle. Idempotent; safe to call any
    /// number of times.
    pub fn initialize(&self) -> Result<()> {
        self.refresh()
    }

    /// Like [`initialize`](Self::initialize), but fall back to the given
    /// environment instead of the definitions' `"default"` entry. The
    /// override persists for subsequent refreshes.
    pub fn initialize_with_default(&self, default_environment: &str) -> Result<()> {
        self.inner.lock().default_override = Some(default_environment.to_string());
        self.refresh()
    }

    /// Re-run resolution and synchronization.
    ///
    /// Serialized: concurrent callers queue behind the refresh mutex and
    /// each performs a full, idempotent recompute. Any failure leaves
    /// the previously published state untouched.
    pub fn refresh(&self) -> Result<()> {
        let mut inner = self.inner.lock();

        let root = match &inner.root {
            Some(root) => root.clone(),
            None => {
                let root = locate_root(&self.start_dir)?;
                inner.root = Some(root.clone());
                root
            }
        };

        // Definitions are reloaded fresh on every cycle.
        let definitions = DocumentStore::new().load_definitions(&definitions_path(&root)?)?;
        let candidates = self.identity.candidate_keys();
        let resolver = EnvironmentResolver::new(root);
        let resolution =
            resolver.resolve(&definitions, &candidates, inner.default_override.as_deref())?;

        // Resolution and parity checks are done; only now may we write.
        sync::sync(inner.active.as_mut(), &resolution.document)?;

        self.publish(ResolvedState {
            environment: resolution.environment,
            snapshot: resolution.document,
        })
    }

    /// The last published environment name; empty before the first
    /// successful refresh.
    pub fn environment(&self) -> Result<String> {
        let state = self.read_state("environment")?;
        Ok(state.map(|s| s.environment).unwrap_or_default())
    }

    /// A setting value from the published snapshot.
    pub fn setting(&self, key: &str) -> Result<Option<String>> {
        let state = self.read_state("setting")?;
        Ok(state.and_then(|s| s.snapshot.setting(key).map(str::to_string)))
    }

    /// A connection-string value from the published snapshot.
    pub fn connection_string(&self, name: &str) -> Result<Option<String>> {
        let state = self.read_state("connection_string")?;
        Ok(state.and_then(|s| {
            s.snapshot
                .connection_string(name)
                .map(|c| c.connection_string.clone())
        }))
    }

    /// The identity candidates that resolution would try, in order.
    pub fn candidate_keys(&self) -> Vec<String> {
        self.identity.candidate_keys()
    }

    /// Validate every environment against the default. Does not touch
    /// the published state.
    pub fn validate(&self) -> Result<ValidationReport> {
        let root = self.root()?;
        let definitions = DocumentStore::new().load_definitions(&definitions_path(&root)?)?;
        validate::validate_all(&root, &definitions)
    }

    /// The located root directory, memoizing on first use.
    pub fn root(&self) -> Result<NormalizedPath> {
        let mut inner = self.inner.lock();
        match &inner.root {
            Some(root) => Ok(root.clone()),
            None => {
                let root = locate_root(&self.start_dir)?;
                inner.root = Some(root.clone());
                Ok(root)
            }
        }
    }

    fn publish(&self, state: ResolvedState) -> Result<()> {
        let mut guard = self
            .state
            .try_write_for(STATE_LOCK_TIMEOUT)
            .ok_or(Error::LockTimeout {
                operation: "publish",
            })?;
        tracing::debug!(environment = %state.environment, "Publishing resolved environment");
        *guard = Some(state);
        Ok(())
    }

    fn read_state(&self, operation: &'static str) -> Result<Option<ResolvedState>> {
        let guard = self
            .state
            .try_read_for(STATE_LOCK_TIMEOUT)
            .ok_or(Error::LockTimeout { operation })?;
        Ok(guard.clone())
    }
}
