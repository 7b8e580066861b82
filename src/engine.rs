//! GoalEngine - goal tracking over a vault
//!
//! Owns the settings, the history store and the published snapshot, and routes
//! vault events and user actions through them:
//! - file/metadata changes reconcile tracked notes and rebuild goals
//! - renames and deletions re-key or drop goals and their history
//! - every rebuild publishes a fresh immutable snapshot

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::error::{GoalError, Notice, Result};
use crate::events::{ChangeFilter, VaultEvent};
use crate::goal::{Goal, GoalBuilder, Goals};
use crate::history::{HistoryLog, HistoryStore};
use crate::settings::{Settings, SettingsStore};
use crate::sync::SettingsSync;
use crate::util;
use crate::vault::{FsVault, VaultEntry, VaultProvider};

/// Published UI state: every tracked goal plus the full history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalSnapshot {
    pub goals: Goals,
    pub history: HistoryLog,
}

impl GoalSnapshot {
    pub fn goal(&self, path: &str) -> Option<&Goal> {
        self.goals.get(path)
    }
}

/// Single channel through which snapshots reach consumers
#[derive(Debug, Default)]
pub struct SnapshotPublisher {
    latest: Arc<GoalSnapshot>,
    subscribers: Vec<Sender<Arc<GoalSnapshot>>>,
}

impl SnapshotPublisher {
    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<GoalSnapshot> {
        Arc::clone(&self.latest)
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&mut self) -> Receiver<Arc<GoalSnapshot>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replace the latest snapshot and notify subscribers
    pub fn publish(&mut self, snapshot: GoalSnapshot) -> Arc<GoalSnapshot> {
        self.latest = Arc::new(snapshot);
        let latest = &self.latest;
        self.subscribers.retain(|tx| tx.send(Arc::clone(latest)).is_ok());
        Arc::clone(&self.latest)
    }
}

/// Core engine for goal tracking
pub struct GoalEngine<V: VaultProvider = FsVault> {
    vault: V,
    settings_store: SettingsStore,
    settings: Settings,
    history: HistoryStore,
    filter: ChangeFilter,
    publisher: SnapshotPublisher,
    notices: Vec<Notice>,
}

impl GoalEngine<FsVault> {
    /// Open the engine for a vault on disk, loading settings and history
    pub fn open(vault: FsVault) -> Result<Self> {
        let data_dir = vault.data_dir();
        let settings_store = SettingsStore::new(&data_dir);
        let history = HistoryStore::load(&data_dir)?;
        Self::new(vault, settings_store, history)
    }
}

impl<V: VaultProvider> GoalEngine<V> {
    pub fn new(vault: V, settings_store: SettingsStore, history: HistoryStore) -> Result<Self> {
        let settings = settings_store.load()?;
        tracing::debug!(
            notes = settings.note_goals.len(),
            folders = settings.folder_goals.len(),
            "loaded settings"
        );
        Ok(Self {
            vault,
            settings_store,
            settings,
            history,
            filter: ChangeFilter::new(),
            publisher: SnapshotPublisher::default(),
            notices: Vec::new(),
        })
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<GoalSnapshot> {
        self.publisher.latest()
    }

    pub fn subscribe(&mut self) -> Receiver<Arc<GoalSnapshot>> {
        self.publisher.subscribe()
    }

    /// Non-fatal problems collected since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Rebuild every tracked goal and publish the result
    pub fn refresh(&mut self) -> Arc<GoalSnapshot> {
        let mut goals = Goals::new();
        let mut builder = GoalBuilder::new(&self.vault, &self.settings, &mut self.history);

        for path in &self.settings.note_goals {
            let target = self.vault.resolve(path);
            if let Some(goal) = builder.build(target.as_ref(), None, None) {
                goals.insert(path.clone(), goal);
            }
        }
        for folder in &self.settings.folder_goals {
            let target = self.vault.resolve(&folder.path);
            if let Some(goal) = builder.build(target.as_ref(), folder.goal_count, folder.daily_goal_count) {
                goals.insert(folder.path.clone(), goal);
            }
        }

        self.notices.extend(builder.into_notices());
        tracing::debug!(goals = goals.len(), "rebuilt goals");

        self.publisher.publish(GoalSnapshot {
            goals,
            history: self.history.load_all().clone(),
        })
    }

    /// Apply a vault event; returns whether goals were rebuilt
    pub fn handle(&mut self, event: VaultEvent) -> Result<bool> {
        match event {
            VaultEvent::Modified(path) | VaultEvent::MetadataChanged(path) => {
                let path = util::normalize_vault_path(&path);
                let Some(entry) = self.vault.resolve(&path) else {
                    return Ok(false);
                };
                if entry.is_folder() {
                    return Ok(false);
                }

                let content = match self.vault.read(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        tracing::warn!(path = %path, "cannot read changed file: {}", e);
                        return Ok(false);
                    }
                };
                if !self.filter.accept(&path, &content) {
                    tracing::trace!(path = %path, "duplicate change notification");
                    return Ok(false);
                }

                let sync = SettingsSync::new(&self.vault, &self.settings);
                if sync.reconcile(&mut self.settings, &path) {
                    self.persist_settings();
                }
            }
            VaultEvent::Renamed { from, to } => {
                let from = util::normalize_vault_path(&from);
                let to = util::normalize_vault_path(&to);
                let sync = SettingsSync::new(&self.vault, &self.settings);
                if sync.rename(&mut self.settings, &from, &to) {
                    self.persist_settings();
                }
                if let Err(e) = self.history.rename_path(&from, &to) {
                    self.notice(&to, e);
                }
                self.filter.rename(&from, &to);
            }
            VaultEvent::Deleted(path) => {
                let path = util::normalize_vault_path(&path);
                let removed = self.settings.remove_goals_within(&path);
                if !removed.is_empty() {
                    tracing::info!(path = %path, removed = removed.len(), "dropped goals of deleted target");
                    self.persist_settings();
                }
                if let Err(e) = self.history.remove_within(&path) {
                    self.notice(&path, e);
                }
                self.filter.forget(&path);
            }
            VaultEvent::LayoutReady => {}
        }

        self.refresh();
        Ok(true)
    }

    /// Show the goal of `path`, tracking it first if its frontmatter declares one
    pub fn view(&mut self, path: &str, pin: bool) -> Result<Option<Goal>> {
        let path = util::normalize_vault_path(path);
        if self.vault.resolve(&path).is_none() {
            return Err(GoalError::TargetNotFound(path));
        }

        let sync = SettingsSync::new(&self.vault, &self.settings);
        let changed = sync.reconcile(&mut self.settings, &path);
        if pin {
            self.settings.open_view(&path);
        }
        if changed || pin {
            self.persist_settings();
        }

        let snapshot = self.refresh();
        Ok(snapshot.goal(&path).cloned())
    }

    /// Add or update the goal of a note or folder
    pub fn set_goal(
        &mut self,
        path: &str,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
    ) -> Result<Option<Goal>> {
        let path = util::normalize_vault_path(path);
        let target = self
            .vault
            .resolve(&path)
            .ok_or_else(|| GoalError::TargetNotFound(path.clone()))?;

        let sync = SettingsSync::new(&self.vault, &self.settings);
        sync.add_or_update_goal(&mut self.settings, &target, goal_count, daily_goal_count)?;
        if self.settings.show_goal_on_create_and_update && !self.settings.no_goal(&path) {
            self.settings.open_view(&path);
        }
        self.persist_settings();
        self.filter.forget(&path);

        let snapshot = self.refresh();
        Ok(snapshot.goal(&path).cloned())
    }

    /// Remove the goal of `path` together with its history
    pub fn remove_goal(&mut self, path: &str) -> Result<bool> {
        let path = util::normalize_vault_path(path);
        if self.settings.no_goal(&path) {
            return Ok(false);
        }

        let sync = SettingsSync::new(&self.vault, &self.settings);
        let result = sync.remove_goal(&mut self.settings, &path);
        if let Err(ref e) = result {
            // Settings are already updated; the note just keeps its keys
            self.notices.push(Notice::new(&path, format!("Error removing goal frontmatter: {}", e)));
        }
        self.persist_settings();
        if let Err(e) = self.history.remove_history(&path) {
            self.notice(&path, e);
        }
        self.filter.forget(&path);

        self.refresh();
        Ok(true)
    }

    /// Move a file or folder inside the vault, carrying goals and history along
    pub fn move_path(&mut self, from: &str, to: &str) -> Result<()> {
        let from = util::normalize_vault_path(from);
        let to = util::normalize_vault_path(to);
        self.vault.rename(&from, &to)?;
        self.handle(VaultEvent::Renamed { from, to })?;
        Ok(())
    }

    /// Replace the set of open goal views (the periodic timer writer)
    pub fn persist_open_views(&mut self, views: Vec<String>) {
        self.settings.goal_leaves = views;
        self.persist_settings();
    }

    /// Change one setting and rebuild
    pub fn update_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.settings.set_value(key, value)?;
        self.persist_settings();
        self.refresh();
        Ok(())
    }

    /// Drop history of paths that are no longer tracked
    pub fn prune_history(&mut self) -> Result<usize> {
        let keep: HashSet<String> = self
            .settings
            .note_goals
            .iter()
            .cloned()
            .chain(self.settings.folder_goals.iter().map(|g| g.path.clone()))
            .collect();
        let dropped = self.history.prune(&keep)?;
        if dropped > 0 {
            self.refresh();
        }
        Ok(dropped)
    }

    /// Tracked targets whose path no longer resolves
    pub fn missing_targets(&self) -> Vec<String> {
        self.settings
            .note_goals
            .iter()
            .chain(self.settings.folder_goals.iter().map(|g| &g.path))
            .filter(|path| self.vault.resolve(path).is_none())
            .cloned()
            .collect()
    }

    /// Resolve a vault path
    pub fn resolve(&self, path: &str) -> Option<VaultEntry> {
        self.vault.resolve(path)
    }

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            let path = util::display_path(self.settings_store.path());
            self.notice(&path, e);
        }
    }

    fn notice(&mut self, path: &str, error: GoalError) {
        tracing::warn!(path, "{}", error);
        self.notices.push(Notice::new(path, error.to_string()));
    }
}
