//! Locating the environment-definitions root directory
//!
//! The root is a directory named `nconfig.environments` found by walking
//! parent directories upward from a start directory. An ancestor may
//! instead carry a `.nconfig` redirect file whose single-line content is a
//! relative path to the real root.

use crate::{Error, NormalizedPath, Result, SUPPORTED_EXTENSIONS, io};

/// Directory name holding the environment definitions.
pub const ENVIRONMENTS_DIR: &str = "nconfig.environments";

/// Redirect marker file name.
pub const REDIRECT_FILE: &str = ".nconfig";

/// Base name of the definitions document inside the root.
pub const DEFINITIONS_BASENAME: &str = "environments";

/// Walk upward from `start` until an `nconfig.environments` directory or
/// a `.nconfig` redirect file is found.
///
/// # Errors
///
/// - [`Error::RootNotFound`] when the filesystem root is reached without
///   a match. This is an unrecoverable startup condition.
/// - [`Error::Redirect`] when a redirect file is empty or points at a
///   directory that does not exist.
pub fn locate_root(start: &NormalizedPath) -> Result<NormalizedPath> {
    let mut current = start.clone();

    loop {
        let environments = current.join(ENVIRONMENTS_DIR);
        let redirect = current.join(REDIRECT_FILE);

        if redirect.is_file() {
            return follow_redirect(&current, &redirect);
        }
        if environments.is_dir() {
            tracing::debug!(root = %environments, "Located environments root");
            return Ok(environments);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => {
                return Err(Error::RootNotFound {
                    start: start.to_native(),
                });
            }
        }
    }
}

fn follow_redirect(dir: &NormalizedPath, redirect: &NormalizedPath) -> Result<NormalizedPath> {
    let content = io::read_text(redirect)?;
    let target = content.trim();
    if target.is_empty() {
        return Err(Error::Redirect {
            path: redirect.to_native(),
            message: "redirect file is empty".to_string(),
        });
    }

    let resolved = dir.join(target);
    if !resolved.is_dir() {
        return Err(Error::Redirect {
            path: redirect.to_native(),
            message: format!("redirect target {resolved} does not exist"),
        });
    }
    tracing::debug!(root = %resolved, "Located environments root via redirect");
    Ok(resolved)
}

/// Resolve the `environments.<ext>` definitions document inside the root,
/// probing supported extensions in priority order.
pub fn definitions_path(root: &NormalizedPath) -> Result<NormalizedPath> {
    for ext in SUPPORTED_EXTENSIONS {
        let candidate = root.join(&format!("{DEFINITIONS_BASENAME}.{ext}"));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(Error::DefinitionsNotFound {
        root: root.to_native(),
    })
}
