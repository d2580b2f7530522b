//! Watch loop.
//!
//! Subscribes to "created" and "moved in" events for the root (non-recursive)
//! and runs the organizer's per-file step on every file that shows up, after
//! waiting for it to stop growing (see [`SettleWindow`]).
//!
//! Events caused by our own moves are filtered by the organizer's skip rules,
//! not by muting the subscription. A file that is still growing when its
//! settle window runs out is kept pending and probed again on the next tick,
//! so slow copies are sorted once they finish. The loop exits within one poll
//! tick of the cancel token being set; queued events and pending files are
//! dropped at that point.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::errors::{OrganizeError, WatchError};
use crate::organize::{FileOutcome, Organizer, PassSummary};
use crate::shutdown::CancelToken;
use crate::utils::{stable_file_probe, SettleWindow};

/// How often the loop re-checks the cancel token while idle.
pub const POLL_TICK: Duration = Duration::from_millis(250);

/// An installed, not yet running, subscription on one directory.
///
/// Events are buffered from [`Subscription::install`] on, so a caller can
/// install first, sort what is already there, and then [`run`](Subscription::run)
/// without missing files that land in between.
pub struct Subscription {
    root: PathBuf,
    watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
}

impl Subscription {
    pub fn install(root: &Path) -> Result<Self, WatchError> {
        let subscribe_err = |source| WatchError::Subscribe {
            path: root.to_path_buf(),
            source,
        };
        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).map_err(subscribe_err)?;
        watcher
            .watch(root, RecursiveMode::NonRecursive)
            .map_err(subscribe_err)?;
        info!(root = %root.display(), "Watching directory for new files");
        Ok(Self {
            root: root.to_path_buf(),
            watcher,
            events,
        })
    }

    /// Handle buffered and new events until `cancel` is set.
    pub fn run<F>(
        mut self,
        organizer: &Organizer,
        settle: SettleWindow,
        cancel: &CancelToken,
        mut on_event: F,
    ) -> Result<PassSummary, WatchError>
    where
        F: FnMut(&FileOutcome),
    {
        let mut summary = PassSummary::default();
        let mut pending: BTreeSet<PathBuf> = BTreeSet::new();

        let result = loop {
            if cancel.is_requested() {
                break Ok(());
            }
            let mut due = std::mem::take(&mut pending);
            match self.events.recv_timeout(POLL_TICK) {
                Ok(Ok(event)) => due.extend(arrivals(&event)),
                Ok(Err(e)) => warn!(error = %e, "Filesystem watch reported an error"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    break Err(WatchError::Disconnected(self.root.clone()));
                }
            }
            for path in due {
                if cancel.is_requested() {
                    break;
                }
                match handle_arrival(organizer, &path, settle, cancel) {
                    Some(outcome) => {
                        on_event(&outcome);
                        summary.record(outcome);
                    }
                    None => {
                        pending.insert(path);
                    }
                }
            }
        };

        if !pending.is_empty() {
            info!(count = pending.len(), "Files still being written were left in place");
        }
        let _ = self.watcher.unwatch(&self.root);
        info!(
            root = %self.root.display(),
            moved = summary.moved_count(),
            failed = summary.failed_count(),
            "Stopped watching directory"
        );
        result.map(|()| summary)
    }
}

/// Paths that may hold a newly arrived file, for events we react to.
fn arrivals(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::File | CreateKind::Any | CreateKind::Other) => {
            event.paths.clone()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any)) => {
            event.paths.clone()
        }
        // Both: paths are [from, to]; only the destination is an arrival.
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().cloned().into_iter().collect()
        }
        _ => Vec::new(),
    }
}

/// Wait for a reported file to settle, then run the per-file step on it.
///
/// `None` means the file was still growing when the window ran out.
fn handle_arrival(
    organizer: &Organizer,
    path: &Path,
    settle: SettleWindow,
    cancel: &CancelToken,
) -> Option<FileOutcome> {
    // Skip rules first so directories, our own moves and vanished paths never wait.
    if let Err(skipped) = organizer.classify(path) {
        return Some(skipped);
    }
    debug!(path = %path.display(), "New file, waiting for it to settle");
    match stable_file_probe(path, settle, cancel) {
        Ok(()) => Some(organizer.organize_file(path)),
        Err(OrganizeError::StillChanging(_)) => {
            debug!(path = %path.display(), "File still being written, will probe again");
            None
        }
        Err(e) => Some(FileOutcome::from_error(path.to_path_buf(), e)),
    }
}

/// Watch the organizer's root on the calling thread until `cancel` is set,
/// logging every outcome.
pub fn watch(
    organizer: &Organizer,
    settle: SettleWindow,
    cancel: &CancelToken,
) -> Result<PassSummary, WatchError> {
    watch_with(organizer, settle, cancel, FileOutcome::log)
}

/// Like [`watch`], but hands every outcome to `on_event` instead of logging it.
pub fn watch_with<F>(
    organizer: &Organizer,
    settle: SettleWindow,
    cancel: &CancelToken,
    on_event: F,
) -> Result<PassSummary, WatchError>
where
    F: FnMut(&FileOutcome),
{
    Subscription::install(organizer.root())?.run(organizer, settle, cancel, on_event)
}

/// Handle to a watch loop running on a background thread.
///
/// Dropping the handle requests cancellation but does not wait for the thread.
#[derive(Debug)]
pub struct WatchHandle {
    cancel: CancelToken,
    thread: Option<JoinHandle<Result<PassSummary, WatchError>>>,
}

impl WatchHandle {
    /// Token that stops this watch when requested.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation and wait for the loop to return its accumulated summary.
    pub fn stop(mut self) -> Result<PassSummary, WatchError> {
        self.cancel.request();
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| WatchError::WorkerPanicked)?,
            None => Ok(PassSummary::default()),
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel.request();
    }
}

/// Install a subscription on the organizer's root and run the watch loop on a
/// new thread. The subscription is active when this returns.
pub fn spawn_watch(organizer: Organizer, settle: SettleWindow) -> Result<WatchHandle, WatchError> {
    let subscription = Subscription::install(organizer.root())?;
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let thread = thread::Builder::new()
        .name("file-organizer-watch".into())
        .spawn(move || subscription.run(&organizer, settle, &worker_cancel, FileOutcome::log))
        .map_err(WatchError::Spawn)?;
    Ok(WatchHandle {
        cancel,
        thread: Some(thread),
    })
}
