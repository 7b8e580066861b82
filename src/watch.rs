//! File system watching for watch mode
//!
//! A recursive `notify` watcher on the vault root feeds raw events into a
//! channel. Each tick drains the channel and translates the batch into vault
//! events, pairing the two halves of a rename so that goals and history move
//! with the file instead of being dropped.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::Result;
use crate::events::VaultEvent;
use crate::vault::FsVault;

/// Watches every file below the vault root
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    /// Rename halves whose partner had not arrived by the last drain
    held: Vec<Event>,
}

impl VaultWatcher {
    pub fn new(vault: &FsVault) -> Result<Self> {
        let (tx, rx) = channel();

        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(vault.root(), RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            held: Vec::new(),
        })
    }

    /// Everything that happened since the previous call
    ///
    /// A rename half received without its partner is kept back for one more
    /// drain, so a rename split across two ticks still pairs up.
    pub fn drain(&mut self, vault: &FsVault) -> Vec<VaultEvent> {
        let mut fresh = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(Ok(event)) => fresh.push(event),
                Ok(Err(e)) => tracing::warn!("watch error: {}", e),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let partnered: HashSet<usize> = fresh
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
                )
            })
            .filter_map(|e| e.attrs.tracker())
            .collect();
        let (hold, fresh): (Vec<Event>, Vec<Event>) = fresh.into_iter().partition(|e| {
            matches!(e.kind, EventKind::Modify(ModifyKind::Name(RenameMode::From)))
                && e.attrs.tracker().map_or(false, |t| !partnered.contains(&t))
        });

        let mut raw = std::mem::replace(&mut self.held, hold);
        raw.extend(fresh);
        vault_events(vault, raw)
    }
}

/// Translate a batch of raw watcher events into vault events
///
/// Renames reported as a single event with both paths become `Renamed`. Split
/// rename halves are paired by their tracker id; a half without a partner is a
/// move into or out of the vault and becomes `Modified` or `Deleted`. Paths
/// outside the vault or inside hidden folders are dropped.
pub fn vault_events(vault: &FsVault, events: Vec<Event>) -> Vec<VaultEvent> {
    let whole: HashSet<usize> = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Modify(ModifyKind::Name(RenameMode::Both))))
        .filter_map(|e| e.attrs.tracker())
        .collect();

    let mut out = Vec::new();
    let mut moved_out: HashMap<usize, String> = HashMap::new();

    for event in events {
        let tracker = event.attrs.tracker();
        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if let [from, to, ..] = event.paths.as_slice() {
                    push_rename(&mut out, vault_path(vault, from), vault_path(vault, to));
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                for path in event.paths.iter().filter_map(|p| vault_path(vault, p)) {
                    match tracker {
                        Some(t) if whole.contains(&t) => {}
                        Some(t) => {
                            moved_out.insert(t, path);
                        }
                        None => out.push(VaultEvent::Deleted(path)),
                    }
                }
            }
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                for path in event.paths.iter().filter_map(|p| vault_path(vault, p)) {
                    match tracker {
                        Some(t) if whole.contains(&t) => {}
                        Some(t) => match moved_out.remove(&t) {
                            Some(from) => push_rename(&mut out, Some(from), Some(path)),
                            None => out.push(VaultEvent::Modified(path)),
                        },
                        None => out.push(VaultEvent::Modified(path)),
                    }
                }
            }
            EventKind::Modify(ModifyKind::Name(_)) => {
                for path in &event.paths {
                    let Some(vpath) = vault_path(vault, path) else {
                        continue;
                    };
                    if path.exists() {
                        out.push(VaultEvent::Modified(vpath));
                    } else {
                        out.push(VaultEvent::Deleted(vpath));
                    }
                }
            }
            EventKind::Create(_) | EventKind::Modify(_) => out.extend(
                event
                    .paths
                    .iter()
                    .filter_map(|p| vault_path(vault, p))
                    .map(VaultEvent::Modified),
            ),
            EventKind::Remove(_) => out.extend(
                event
                    .paths
                    .iter()
                    .filter_map(|p| vault_path(vault, p))
                    .map(VaultEvent::Deleted),
            ),
            EventKind::Access(_) | EventKind::Any | EventKind::Other => {}
        }
    }

    let mut unpaired: Vec<(usize, String)> = moved_out.into_iter().collect();
    unpaired.sort();
    out.extend(unpaired.into_iter().map(|(_, path)| VaultEvent::Deleted(path)));
    out
}

fn push_rename(out: &mut Vec<VaultEvent>, from: Option<String>, to: Option<String>) {
    match (from, to) {
        (Some(from), Some(to)) => out.push(VaultEvent::Renamed { from, to }),
        (Some(from), None) => out.push(VaultEvent::Deleted(from)),
        (None, Some(to)) => out.push(VaultEvent::Modified(to)),
        (None, None) => {}
    }
}

/// Vault path of a watched location; None for the root, outside paths and hidden entries
fn vault_path(vault: &FsVault, absolute: &Path) -> Option<String> {
    let path = vault.vault_path(absolute)?;
    if path.is_empty() || path.split('/').any(|segment| segment.starts_with('.')) {
        return None;
    }
    Some(path)
}
