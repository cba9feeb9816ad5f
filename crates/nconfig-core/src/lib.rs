//! Core orchestration layer for nconfig
//!
//! Resolves which named environment the running machine belongs to and
//! keeps the host's active configuration store synchronized with the
//! environment's document on disk.

pub mod active;
pub mod error;
pub mod identity;
pub mod refresh;
pub mod resolver;
pub mod sync;
pub mod validate;
pub mod watch;

pub use active::{ActiveStore, FileStore};
pub use error::{Category, Error, Result};
pub use identity::{FixedIdentity, HostIdentity, Identity};
pub use refresh::{RefreshController, ResolvedState};
pub use resolver::{EnvironmentResolver, Resolution};
pub use sync::sync;
pub use validate::{ValidationReport, validate_all};
pub use watch::WatchGuard;
