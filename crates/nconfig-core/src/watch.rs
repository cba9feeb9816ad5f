//! File-system change notifications driving refreshes
//!
//! Watches the environments root (non-recursive) and calls
//! [`RefreshController::refresh`] on every create/modify/delete/rename.
//! Event payloads carry no meaning; each trigger is a full idempotent
//! recompute, and bursts serialize behind the refresh mutex. Refresh
//! failures are logged, never propagated into the watcher thread.

use crate::{RefreshController, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Keeps the watcher and its dispatch thread alive. Dropping the guard
/// stops watching.
pub struct WatchGuard {
    watcher: Option<RecommendedWatcher>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshController {
    /// Start watching the environments root for changes.
    ///
    /// Locates the root first if it has not been located yet. The guard
    /// must be held for as long as change-driven refreshes are wanted;
    /// typically the process lifetime.
    pub fn watch(self: &Arc<Self>) -> Result<WatchGuard> {
        let root = self.root()?;

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
        watcher.watch(&root.to_native(), RecursiveMode::NonRecursive)?;
        tracing::info!(root = %root, "Watching environments root");

        let controller = Arc::clone(self);
        let handle = std::thread::spawn(move || {
            // The loop ends when the watcher (the only sender) is dropped.
            for result in rx {
                match result {
                    Ok(event) if is_relevant(&event) => {
                        tracing::debug!(kind = ?event.kind, "Environments root changed");
                        if let Err(e) = controller.refresh() {
                            tracing::warn!(error = %e, "Change-driven refresh failed");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!(error = %e, "Watcher error"),
                }
            }
        });

        Ok(WatchGuard {
            watcher: Some(watcher),
            handle: Some(handle),
        })
    }
}

fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        // Drop the watcher first so the channel closes and the thread
        // drains out.
        self.watcher.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
