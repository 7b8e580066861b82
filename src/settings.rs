//! Persisted settings: tracked targets, toggles and frontmatter key names

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants as C;
use crate::error::{GoalError, Result};
use crate::util;

/// Goal configured explicitly for a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderGoal {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_goal_count: Option<u64>,
}

/// Frontmatter key names, resolved once from settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterKeys {
    pub goal: String,
    pub daily_goal: String,
    pub word_count: String,
}

impl Default for FrontmatterKeys {
    fn default() -> Self {
        Self {
            goal: C::DEFAULT_GOAL_KEY.to_string(),
            daily_goal: C::DEFAULT_DAILY_GOAL_KEY.to_string(),
            word_count: C::DEFAULT_WORD_COUNT_KEY.to_string(),
        }
    }
}

/// Plugin-style settings blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Notes tracked because their frontmatter declares a goal
    #[serde(default)]
    pub note_goals: Vec<String>,
    #[serde(default)]
    pub folder_goals: Vec<FolderGoal>,
    #[serde(default = "default_true")]
    pub show_in_file_explorer: bool,
    #[serde(default = "default_true")]
    pub show_single_goal_view: bool,
    #[serde(default = "default_true")]
    pub show_goal_on_create_and_update: bool,
    #[serde(default)]
    pub include_frontmatter_in_count: bool,
    #[serde(default = "default_goal_key")]
    pub custom_goal_frontmatter_key: String,
    #[serde(default = "default_daily_goal_key")]
    pub custom_daily_goal_frontmatter_key: String,
    #[serde(default = "default_word_count_key")]
    pub word_count_frontmatter_key: String,
    /// Extensions counted in addition to "md"
    #[serde(default)]
    pub additional_file_types: Vec<String>,
    /// Paths of currently open goal views
    #[serde(default)]
    pub goal_leaves: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_goal_key() -> String {
    C::DEFAULT_GOAL_KEY.to_string()
}

fn default_daily_goal_key() -> String {
    C::DEFAULT_DAILY_GOAL_KEY.to_string()
}

fn default_word_count_key() -> String {
    C::DEFAULT_WORD_COUNT_KEY.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            note_goals: Vec::new(),
            folder_goals: Vec::new(),
            show_in_file_explorer: true,
            show_single_goal_view: true,
            show_goal_on_create_and_update: true,
            include_frontmatter_in_count: false,
            custom_goal_frontmatter_key: default_goal_key(),
            custom_daily_goal_frontmatter_key: default_daily_goal_key(),
            word_count_frontmatter_key: default_word_count_key(),
            additional_file_types: Vec::new(),
            goal_leaves: Vec::new(),
        }
    }
}

impl Settings {
    /// Frontmatter key names
    pub fn keys(&self) -> FrontmatterKeys {
        FrontmatterKeys {
            goal: self.custom_goal_frontmatter_key.clone(),
            daily_goal: self.custom_daily_goal_frontmatter_key.clone(),
            word_count: self.word_count_frontmatter_key.clone(),
        }
    }

    /// Whether files with this extension are counted
    pub fn is_countable_extension(&self, extension: &str) -> bool {
        extension == C::MARKDOWN_EXTENSION
            || self
                .additional_file_types
                .iter()
                .any(|ext| ext.trim_start_matches('.') == extension)
    }

    /// Whether `path` has no goal at all
    pub fn no_goal(&self, path: &str) -> bool {
        !self.is_note_tracked(path) && self.folder_goal(path).is_none()
    }

    pub fn is_note_tracked(&self, path: &str) -> bool {
        self.note_goals.iter().any(|p| p == path)
    }

    pub fn folder_goal(&self, path: &str) -> Option<&FolderGoal> {
        self.folder_goals.iter().find(|g| g.path == path)
    }

    /// Track a note; returns whether it was newly added
    pub fn track_note(&mut self, path: &str) -> bool {
        if self.is_note_tracked(path) {
            return false;
        }
        self.note_goals.push(path.to_string());
        true
    }

    /// Stop tracking a note; returns whether it was tracked
    pub fn untrack_note(&mut self, path: &str) -> bool {
        let before = self.note_goals.len();
        self.note_goals.retain(|p| p != path);
        self.note_goals.len() != before
    }

    /// Add or replace a folder goal; returns whether anything changed
    pub fn upsert_folder_goal(&mut self, goal: FolderGoal) -> bool {
        match self.folder_goals.iter_mut().find(|g| g.path == goal.path) {
            Some(existing) if *existing == goal => false,
            Some(existing) => {
                *existing = goal;
                true
            }
            None => {
                self.folder_goals.push(goal);
                true
            }
        }
    }

    /// Remove every goal registered for `path`; returns whether anything changed
    pub fn remove_goal(&mut self, path: &str) -> bool {
        let before = self.note_goals.len() + self.folder_goals.len() + self.goal_leaves.len();
        self.note_goals.retain(|p| p != path);
        self.folder_goals.retain(|g| g.path != path);
        self.goal_leaves.retain(|p| p != path);
        before != self.note_goals.len() + self.folder_goals.len() + self.goal_leaves.len()
    }

    /// Remove goals for `path` and everything below it (folder deletion)
    pub fn remove_goals_within(&mut self, path: &str) -> Vec<String> {
        let mut removed: Vec<String> = self
            .note_goals
            .iter()
            .filter(|p| util::is_within(p, path))
            .cloned()
            .collect();
        removed.extend(
            self.folder_goals
                .iter()
                .filter(|g| util::is_within(&g.path, path))
                .map(|g| g.path.clone()),
        );

        self.note_goals.retain(|p| !util::is_within(p, path));
        self.folder_goals.retain(|g| !util::is_within(&g.path, path));
        self.goal_leaves.retain(|p| !util::is_within(p, path));
        removed
    }

    /// Re-key tracked paths after a rename; folders carry their descendants along
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        for path in self.note_goals.iter_mut().chain(self.goal_leaves.iter_mut()) {
            if let Some(rebased) = util::rebase_path(path, old, new) {
                *path = rebased;
                changed = true;
            }
        }
        for goal in self.folder_goals.iter_mut() {
            if let Some(rebased) = util::rebase_path(&goal.path, old, new) {
                goal.path = rebased;
                changed = true;
            }
        }
        dedup(&mut self.note_goals);
        dedup(&mut self.goal_leaves);
        changed
    }

    /// Record an opened goal view, replacing others in single-view mode
    pub fn open_view(&mut self, path: &str) {
        if self.show_single_goal_view {
            self.goal_leaves.clear();
        }
        if !self.goal_leaves.iter().any(|p| p == path) {
            self.goal_leaves.push(path.to_string());
        }
    }

    pub fn close_view(&mut self, path: &str) -> bool {
        let before = self.goal_leaves.len();
        self.goal_leaves.retain(|p| p != path);
        before != self.goal_leaves.len()
    }

    /// Set a setting by its camelCase name from a string value
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |reason: &str| GoalError::InvalidSetting {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        let flag = || match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid("expected true or false")),
        };
        let name = || {
            let name = value.trim();
            if name.is_empty() {
                Err(invalid("key name cannot be empty"))
            } else {
                Ok(name.to_string())
            }
        };

        match key {
            "showInFileExplorer" => self.show_in_file_explorer = flag()?,
            "showSingleGoalView" => self.show_single_goal_view = flag()?,
            "showGoalOnCreateAndUpdate" => self.show_goal_on_create_and_update = flag()?,
            "includeFrontmatterInCount" => self.include_frontmatter_in_count = flag()?,
            "customGoalFrontmatterKey" => self.custom_goal_frontmatter_key = name()?,
            "customDailyGoalFrontmatterKey" => self.custom_daily_goal_frontmatter_key = name()?,
            "wordCountFrontmatterKey" => self.word_count_frontmatter_key = name()?,
            "additionalFileTypes" => {
                self.additional_file_types = value
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_string())
                    .filter(|ext| !ext.is_empty())
                    .collect();
            }
            _ => return Err(invalid("unknown or read-only setting")),
        }
        Ok(())
    }
}

fn dedup(paths: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
}

/// Loads and saves the settings file
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(C::SETTINGS_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Replace the persisted settings with `settings`
    pub fn save(&self, settings: &Settings) -> Result<()> {
        util::write_json_atomic(&self.path, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.show_in_file_explorer);
        assert!(!settings.include_frontmatter_in_count);
        assert_eq!(settings.keys(), FrontmatterKeys::default());
    }

    #[test]
    fn test_camel_case_json() {
        let settings: Settings = serde_json::from_str(
            r#"{"noteGoals":["a.md"],"folderGoals":[{"path":"Drafts","goalCount":10000,"dailyGoalCount":1000}],"additionalFileTypes":["txt"]}"#,
        )
        .unwrap();
        assert!(settings.is_note_tracked("a.md"));
        assert_eq!(settings.folder_goal("Drafts").unwrap().goal_count, Some(10000));
        assert!(settings.is_countable_extension("txt"));
        assert!(settings.is_countable_extension("md"));
        assert!(!settings.is_countable_extension("png"));
    }

    #[test]
    fn test_track_and_remove() {
        let mut settings = Settings::default();
        assert!(settings.track_note("a.md"));
        assert!(!settings.track_note("a.md"));
        assert!(!settings.no_goal("a.md"));
        assert!(settings.remove_goal("a.md"));
        assert!(settings.no_goal("a.md"));
        assert!(!settings.remove_goal("a.md"));
    }

    #[test]
    fn test_upsert_folder_goal() {
        let mut settings = Settings::default();
        let goal = FolderGoal { path: "Drafts".into(), goal_count: Some(10), daily_goal_count: None };
        assert!(settings.upsert_folder_goal(goal.clone()));
        assert!(!settings.upsert_folder_goal(goal));
        assert!(settings.upsert_folder_goal(FolderGoal {
            path: "Drafts".into(),
            goal_count: Some(20),
            daily_goal_count: Some(2),
        }));
        assert_eq!(settings.folder_goals.len(), 1);
        assert_eq!(settings.folder_goal("Drafts").unwrap().daily_goal_count, Some(2));
    }

    #[test]
    fn test_rename_folder_moves_descendants() {
        let mut settings = Settings::default();
        settings.track_note("Drafts/ch1.md");
        settings.track_note("Other/x.md");
        settings.upsert_folder_goal(FolderGoal { path: "Drafts".into(), goal_count: Some(1), daily_goal_count: None });
        settings.open_view("Drafts/ch1.md");

        assert!(settings.rename("Drafts", "Book"));
        assert_eq!(settings.note_goals, vec!["Book/ch1.md", "Other/x.md"]);
        assert_eq!(settings.folder_goals[0].path, "Book");
        assert_eq!(settings.goal_leaves, vec!["Book/ch1.md"]);
        assert!(!settings.rename("Missing", "Elsewhere"));
    }

    #[test]
    fn test_remove_goals_within() {
        let mut settings = Settings::default();
        settings.track_note("Drafts/ch1.md");
        settings.track_note("Other/x.md");
        settings.upsert_folder_goal(FolderGoal { path: "Drafts/Part".into(), goal_count: None, daily_goal_count: None });
        let mut removed = settings.remove_goals_within("Drafts");
        removed.sort();
        assert_eq!(removed, vec!["Drafts/Part", "Drafts/ch1.md"]);
        assert_eq!(settings.note_goals, vec!["Other/x.md"]);
        assert!(settings.folder_goals.is_empty());
    }

    #[test]
    fn test_open_view_single_mode() {
        let mut settings = Settings::default();
        settings.open_view("a.md");
        settings.open_view("b.md");
        assert_eq!(settings.goal_leaves, vec!["b.md"]);

        settings.show_single_goal_view = false;
        settings.open_view("c.md");
        settings.open_view("c.md");
        assert_eq!(settings.goal_leaves, vec!["b.md", "c.md"]);
        assert!(settings.close_view("b.md"));
        assert!(!settings.close_view("b.md"));
    }

    #[test]
    fn test_set_value() {
        let mut settings = Settings::default();
        settings.set_value("includeFrontmatterInCount", "on").unwrap();
        assert!(settings.include_frontmatter_in_count);
        settings.set_value("additionalFileTypes", ".txt, org").unwrap();
        assert_eq!(settings.additional_file_types, vec!["txt", "org"]);
        assert!(settings.set_value("showInFileExplorer", "maybe").is_err());
        assert!(settings.set_value("noteGoals", "x").is_err());
        assert!(settings.set_value("customGoalFrontmatterKey", "  ").is_err());
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(&dir.path().join(C::DATA_DIR));
        assert_eq!(store.load().unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.track_note("a.md");
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }
}
