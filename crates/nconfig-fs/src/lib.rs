//! Filesystem layer for nconfig
//!
//! Locates the environment-definitions root and loads/saves environment
//! documents in a format-agnostic way.

pub mod document;
pub mod error;
pub mod io;
pub mod locate;
pub mod path;
pub mod store;

pub use document::{ConnectionString, EnvironmentDocument};
pub use error::{Error, Result};
pub use locate::{definitions_path, locate_root};
pub use path::NormalizedPath;
pub use store::{DocumentStore, EnvironmentDefinitions, SUPPORTED_EXTENSIONS};
