//! Debounced filesystem change watching.
//!
//! The watcher coalesces rapid filesystem events into a single invalidation
//! per debounce window, so a bulk copy into the content root triggers one
//! cache rebuild instead of hundreds. Events are delivered from notify's
//! callback thread into a tokio task through an unbounded channel; the task
//! drains the burst, sleeps out the window, and then fires the callback.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::core::{RepoError, Result};

/// Callback invoked once per debounced change burst.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// A running filesystem watcher bound to one content root.
///
/// Dropping the handle (or cancelling its token) stops the watcher task.
pub struct ChangeWatcher {
    // Held for its Drop side effect: dropping unregisters the OS watches.
    _watcher: RecommendedWatcher,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher").finish()
    }
}

impl ChangeWatcher {
    /// Start watching `root` recursively.
    ///
    /// `on_change` runs after each debounced burst of relevant events
    /// (create/modify/remove/rename; access events are ignored). The watcher
    /// stops when `cancel` fires or the handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error when the OS watcher cannot be created or the root
    /// cannot be registered.
    pub fn start(
        root: &Path,
        debounce: Duration,
        on_change: ChangeCallback,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_relevant(&event.kind) => {
                    let _ = tx.send(event);
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "filesystem watcher error"),
            }
        })
        .map_err(watcher_error)?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(watcher_error)?;

        let debounce_ms = debounce.as_millis() as u64;
        debug!(root = %root.display(), debounce_ms, "change watcher started");

        let task_cancel = cancel.clone();
        let task = tokio::spawn(debounce_loop(rx, debounce, on_change, task_cancel));

        Ok(Self {
            _watcher: watcher,
            cancel,
            task,
        })
    }

    /// Stop the watcher task.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

async fn debounce_loop(
    mut rx: mpsc::UnboundedReceiver<Event>,
    debounce: Duration,
    on_change: ChangeCallback,
    cancel: CancellationToken,
) {
    loop {
        // Wait for the first event of a burst.
        let first = tokio::select! {
            _ = cancel.cancelled() => return,
            event = rx.recv() => event,
        };
        if first.is_none() {
            return; // watcher dropped
        }
        trace!("change burst started");

        // Drain the rest of the burst until the window stays quiet.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(debounce) => break,
                event = rx.recv() => {
                    if event.is_none() {
                        break;
                    }
                }
            }
        }

        debug!("content change detected, invalidating caches");
        on_change();
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

fn watcher_error(err: notify::Error) -> RepoError {
    RepoError::Io(std::io::Error::other(err))
}
