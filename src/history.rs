//! Daily goal history
//!
//! Each tracked path owns a date-ordered sequence of entries, at most one per
//! calendar day, recording the word count when the target was first seen that
//! day. The whole log is held in memory and rewritten to disk on every change.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants as C;
use crate::error::Result;
use crate::util;

/// Baseline and goal configuration of one target on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub start_count: u64,
    #[serde(default, with = "zero_as_none")]
    pub goal_count: Option<u64>,
    #[serde(default, with = "zero_as_none")]
    pub daily_goal_count: Option<u64>,
    /// When the entry was written; decides rename collisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl HistoryEntry {
    /// Zero-valued entry for `date`
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            start_count: 0,
            goal_count: None,
            daily_goal_count: None,
            recorded_at: None,
        }
    }
}

/// Goal counts are stored as plain numbers with 0 for "no goal"
mod zero_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.unwrap_or(0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.filter(|count| *count > 0))
    }
}

/// Target path to date-ordered entries
pub type HistoryLog = BTreeMap<String, Vec<HistoryEntry>>;

/// Owner of the history log and its file
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    log: HistoryLog,
}

impl HistoryStore {
    /// Load the history file from `data_dir`; a missing file yields an empty log
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(C::HISTORY_FILENAME);
        let mut log: HistoryLog = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HistoryLog::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HistoryLog::new()
        };

        for entries in log.values_mut() {
            normalize(entries);
        }
        log.retain(|_, entries| !entries.is_empty());

        tracing::debug!(targets = log.len(), "loaded goal history");
        Ok(Self { path, log })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full log
    pub fn load_all(&self) -> &HistoryLog {
        &self.log
    }

    /// Entries for one path, oldest first
    pub fn history_for(&self, path: &str) -> &[HistoryEntry] {
        self.log.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Today's entry, creating it with `current` as baseline when missing
    pub fn ensure_today_entry(
        &mut self,
        path: &str,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
        current: u64,
    ) -> Result<HistoryEntry> {
        self.ensure_entry_on(util::today(), path, goal_count, daily_goal_count, current)
    }

    /// Entry for `date`, creating it with `current` as baseline when missing
    ///
    /// An existing entry is returned untouched. When saving fails the new entry
    /// stays in memory and the error is returned.
    pub fn ensure_entry_on(
        &mut self,
        date: NaiveDate,
        path: &str,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
        current: u64,
    ) -> Result<HistoryEntry> {
        let entries = self.log.entry(path.to_string()).or_default();
        if let Some(existing) = entries.iter().find(|e| e.date == date) {
            return Ok(existing.clone());
        }

        let entry = HistoryEntry {
            date,
            start_count: current,
            goal_count,
            daily_goal_count,
            recorded_at: Some(Utc::now()),
        };
        let at = entries.partition_point(|e| e.date < date);
        entries.insert(at, entry.clone());
        tracing::debug!(path, %date, start = current, "recorded daily baseline");

        self.save()?;
        Ok(entry)
    }

    /// Today's entry without creating one
    pub fn todays_entry(&self, path: &str) -> HistoryEntry {
        self.entry_on(util::today(), path)
    }

    /// Entry for `date`, or a zero-valued entry
    pub fn entry_on(&self, date: NaiveDate, path: &str) -> HistoryEntry {
        self.history_for(path)
            .iter()
            .find(|e| e.date == date)
            .cloned()
            .unwrap_or_else(|| HistoryEntry::empty(date))
    }

    /// Drop all entries of `path`; returns whether anything was removed
    pub fn remove_history(&mut self, path: &str) -> Result<bool> {
        if self.log.remove(path).is_none() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Drop entries of `path` and every path below it
    pub fn remove_within(&mut self, path: &str) -> Result<bool> {
        let before = self.log.len();
        self.log.retain(|key, _| !util::is_within(key, path));
        if before == self.log.len() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Re-key `old` (and, for folders, its descendants) to `new`
    ///
    /// Sequences that land on an existing key are merged by date; for a date
    /// present on both sides the entry with the later `recorded_at` wins, and
    /// the moved entry wins ties.
    pub fn rename_path(&mut self, old: &str, new: &str) -> Result<bool> {
        if old == new {
            return Ok(false);
        }

        let moved: Vec<(String, String)> = self
            .log
            .keys()
            .filter_map(|key| util::rebase_path(key, old, new).map(|rebased| (key.clone(), rebased)))
            .collect();
        if moved.is_empty() {
            return Ok(false);
        }

        let mut taken = Vec::with_capacity(moved.len());
        for (from, to) in moved {
            if let Some(entries) = self.log.remove(&from) {
                taken.push((to, entries));
            }
        }
        for (to, entries) in taken {
            let merged = match self.log.remove(&to) {
                Some(existing) => merge(existing, entries),
                None => entries,
            };
            self.log.insert(to, merged);
        }

        tracing::debug!(old, new, "re-keyed goal history");
        self.save()?;
        Ok(true)
    }

    /// Drop history for paths not in `keep`; returns how many paths were dropped
    pub fn prune(&mut self, keep: &HashSet<String>) -> Result<usize> {
        let before = self.log.len();
        self.log.retain(|key, _| keep.contains(key));
        let dropped = before - self.log.len();
        if dropped > 0 {
            self.save()?;
        }
        Ok(dropped)
    }

    /// Write the whole log
    pub fn save(&self) -> Result<()> {
        util::write_json_atomic(&self.path, &self.log)
    }
}

/// Sort by date and keep the last entry written for each date
fn normalize(entries: &mut Vec<HistoryEntry>) {
    let mut by_date: BTreeMap<NaiveDate, HistoryEntry> = BTreeMap::new();
    for entry in entries.drain(..) {
        by_date.insert(entry.date, entry);
    }
    entries.extend(by_date.into_values());
}

fn merge(existing: Vec<HistoryEntry>, moved: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut by_date: BTreeMap<NaiveDate, HistoryEntry> =
        existing.into_iter().map(|e| (e.date, e)).collect();
    for entry in moved {
        let keep_moved = by_date
            .get(&entry.date)
            .map_or(true, |current| entry.recorded_at >= current.recorded_at);
        if keep_moved {
            by_date.insert(entry.date, entry);
        }
    }
    by_date.into_values().collect()
}
