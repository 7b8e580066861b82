//! Goal snapshots and the builder that computes them
//!
//! A goal is rebuilt from scratch on every refresh: the current word count is
//! read from the vault (summed over descendants for folders) and today's
//! baseline comes from the history store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use serde::Serialize;

use crate::error::Notice;
use crate::history::HistoryStore;
use crate::settings::{FrontmatterKeys, Settings};
use crate::util;
use crate::vault::{VaultEntry, VaultProvider};
use crate::word_count::WordCounter;
use crate::frontmatter::Frontmatter;

/// Kind of goal target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Note,
    Folder,
}

/// Goal state of one target at the time it was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub path: String,
    pub title: String,
    pub goal_type: GoalType,
    /// Lifetime word-count goal
    ///
    /// A missing key and a count of 0 both mean "no goal" and are held as
    /// `None`; history files store that as 0.
    pub target_count: Option<u64>,
    pub daily_target_count: Option<u64>,
    /// Word count when the target was first seen today
    pub start_count: u64,
    pub current_count: u64,
}

impl Goal {
    /// Words written today (negative after deleting text)
    pub fn daily_progress(&self) -> i64 {
        self.current_count as i64 - self.start_count as i64
    }

    /// Progress toward the lifetime goal in percent, None without a goal
    pub fn percent(&self) -> Option<f64> {
        match self.target_count {
            Some(target) if target > 0 => Some(self.current_count as f64 * 100.0 / target as f64),
            _ => None,
        }
    }

    pub fn daily_percent(&self) -> Option<f64> {
        match self.daily_target_count {
            Some(target) if target > 0 => {
                Some(self.daily_progress().max(0) as f64 * 100.0 / target as f64)
            }
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.target_count, Some(t) if t > 0 && self.current_count >= t)
    }

    pub fn is_daily_complete(&self) -> bool {
        matches!(self.daily_target_count, Some(t) if t > 0 && self.daily_progress() >= t as i64)
    }

    /// Compact indicator, e.g. `150/5000 (+30/500)`
    pub fn label(&self) -> String {
        let mut label = match self.target_count {
            Some(target) if target > 0 => format!("{}/{}", self.current_count, target),
            _ => format!("{} words", self.current_count),
        };
        if let Some(daily) = self.daily_target_count.filter(|d| *d > 0) {
            label.push_str(&format!(" ({:+}/{})", self.daily_progress(), daily));
        }
        label
    }
}

/// Target path to goal
pub type Goals = BTreeMap<String, Goal>;

/// Computes goals against a vault, recording daily baselines in the history
pub struct GoalBuilder<'a, V: VaultProvider + ?Sized> {
    vault: &'a V,
    settings: &'a Settings,
    keys: FrontmatterKeys,
    counter: WordCounter,
    history: &'a mut HistoryStore,
    notices: Vec<Notice>,
}

impl<'a, V: VaultProvider + ?Sized> GoalBuilder<'a, V> {
    pub fn new(vault: &'a V, settings: &'a Settings, history: &'a mut HistoryStore) -> Self {
        Self {
            vault,
            settings,
            keys: settings.keys(),
            counter: WordCounter::from_settings(settings),
            history,
            notices: Vec::new(),
        }
    }

    /// Build the goal for `target`; None when there is no target
    ///
    /// Countable files take their goals from frontmatter; folders (and files
    /// that are not counted) use the supplied counts.
    pub fn build(
        &mut self,
        target: Option<&VaultEntry>,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
    ) -> Option<Goal> {
        self.build_on(util::today(), target, goal_count, daily_goal_count)
    }

    /// Build with the baseline taken from `date`'s history entry
    pub fn build_on(
        &mut self,
        date: NaiveDate,
        target: Option<&VaultEntry>,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
    ) -> Option<Goal> {
        let target = target?;

        let (goal_type, goal_count, daily_goal_count) = if self.is_countable(target) {
            let fm = self.vault.frontmatter(target.path());
            let read = |key: &str| fm.as_ref().and_then(|fm| fm.count(key));
            (GoalType::Note, read(&self.keys.goal), read(&self.keys.daily_goal))
        } else if target.is_folder() {
            (GoalType::Folder, goal_count, daily_goal_count)
        } else {
            (GoalType::Note, goal_count, daily_goal_count)
        };

        let word_count = self.word_count(target);
        let path = target.path();

        let today = match self
            .history
            .ensure_entry_on(date, path, goal_count, daily_goal_count, word_count)
        {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path, "failed to save goal history: {}", e);
                self.notices.push(Notice::new(path, e.to_string()));
                self.history.entry_on(date, path)
            }
        };

        Some(Goal {
            path: path.to_string(),
            title: util::title_of(target.name()),
            goal_type,
            target_count: goal_count,
            daily_target_count: daily_goal_count,
            start_count: today.start_count,
            current_count: word_count,
        })
    }

    /// Word count of a file, or the recursive sum over a folder
    pub fn word_count(&self, target: &VaultEntry) -> u64 {
        match target {
            VaultEntry::File { .. } if self.is_countable(target) => self.file_word_count(target.path()),
            VaultEntry::File { .. } => 0,
            VaultEntry::Folder { path, .. } => match self.vault.children(path) {
                Ok(children) => children.iter().map(|child| self.word_count(child)).sum(),
                Err(e) => {
                    tracing::warn!(path = %path, "cannot list folder: {}", e);
                    0
                }
            },
        }
    }

    fn file_word_count(&self, path: &str) -> u64 {
        match self.vault.read(path) {
            Ok(content) => {
                let fm = Frontmatter::parse(&content);
                self.counter.count(&content, fm.as_ref())
            }
            Err(e) => {
                tracing::warn!(path, "cannot read file: {}", e);
                0
            }
        }
    }

    fn is_countable(&self, target: &VaultEntry) -> bool {
        target
            .extension()
            .map_or(false, |ext| self.settings.is_countable_extension(ext))
    }

    /// Persistence problems collected while building
    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}
