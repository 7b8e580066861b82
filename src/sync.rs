//! Keeps the tracked-target set in step with note frontmatter and user actions

use serde_yaml::Value;

use crate::error::{GoalError, Result};
use crate::settings::{FolderGoal, FrontmatterKeys, Settings};
use crate::vault::{VaultEntry, VaultProvider};

/// Reconciles settings against the vault
pub struct SettingsSync<'a, V: VaultProvider + ?Sized> {
    vault: &'a V,
    keys: FrontmatterKeys,
}

impl<'a, V: VaultProvider + ?Sized> SettingsSync<'a, V> {
    pub fn new(vault: &'a V, settings: &Settings) -> Self {
        Self {
            vault,
            keys: settings.keys(),
        }
    }

    /// Track or untrack a changed file according to its goal keys
    ///
    /// Returns whether the tracked set changed. Folders, missing paths and
    /// files that are not counted never change anything.
    pub fn reconcile(&self, settings: &mut Settings, path: &str) -> bool {
        let Some(entry) = self.vault.resolve(path) else {
            return false;
        };
        let countable = entry
            .extension()
            .map_or(false, |ext| settings.is_countable_extension(ext));
        if !countable {
            return false;
        }

        let declares_goal = self.vault.frontmatter(entry.path()).map_or(false, |fm| {
            fm.get(&self.keys.goal).is_some() || fm.get(&self.keys.daily_goal).is_some()
        });

        let changed = if declares_goal {
            settings.track_note(entry.path())
        } else {
            settings.untrack_note(entry.path())
        };
        if changed {
            tracing::info!(path = entry.path(), tracked = declares_goal, "goal tracking changed");
        }
        changed
    }

    /// Set goals for a note (in its frontmatter) or a folder (in settings)
    ///
    /// `None` keeps the current value, `Some(0)` clears it.
    pub fn add_or_update_goal(
        &self,
        settings: &mut Settings,
        target: &VaultEntry,
        goal_count: Option<u64>,
        daily_goal_count: Option<u64>,
    ) -> Result<bool> {
        match target {
            VaultEntry::Folder { path, .. } => {
                let existing = settings.folder_goal(path).cloned();
                let merge = |new: Option<u64>, old: Option<u64>| match new {
                    Some(0) => None,
                    Some(n) => Some(n),
                    None => old,
                };
                let goal = FolderGoal {
                    path: path.clone(),
                    goal_count: merge(goal_count, existing.as_ref().and_then(|g| g.goal_count)),
                    daily_goal_count: merge(
                        daily_goal_count,
                        existing.as_ref().and_then(|g| g.daily_goal_count),
                    ),
                };
                Ok(settings.upsert_folder_goal(goal))
            }
            VaultEntry::File { path, extension, .. } => {
                if !settings.is_countable_extension(extension) {
                    return Err(GoalError::invalid_path(
                        path.as_str(),
                        format!("'.{}' files are not counted", extension),
                    ));
                }

                let keys = &self.keys;
                self.vault.process_frontmatter(path, &mut |map: &mut serde_yaml::Mapping| {
                    for (key, count) in [(&keys.goal, goal_count), (&keys.daily_goal, daily_goal_count)] {
                        match count {
                            Some(0) => {
                                map.remove(key.as_str());
                            }
                            Some(n) => {
                                map.insert(Value::String(key.clone()), Value::Number(n.into()));
                            }
                            None => {}
                        }
                    }
                })?;

                Ok(self.reconcile(settings, path))
            }
        }
    }

    /// Clear every goal on `path`, stripping goal keys from a note's frontmatter
    pub fn remove_goal(&self, settings: &mut Settings, path: &str) -> Result<bool> {
        let changed = settings.remove_goal(path);

        if let Some(VaultEntry::File { .. }) = self.vault.resolve(path) {
            let keys = &self.keys;
            self.vault.process_frontmatter(path, &mut |map: &mut serde_yaml::Mapping| {
                map.remove(keys.goal.as_str());
                map.remove(keys.daily_goal.as_str());
            })?;
        }
        Ok(changed)
    }

    /// Re-key goals after `old` moved to `new`
    pub fn rename(&self, settings: &mut Settings, old: &str, new: &str) -> bool {
        settings.rename(old, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::FsVault;
    use std::fs;
    use tempfile::TempDir;

    fn vault(files: &[(&str, &str)]) -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_reconcile_tracks_and_untracks() {
        let (dir, vault) = vault(&[("a.md", "---\ngoal: 100\n---\nText")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);

        assert!(sync.reconcile(&mut settings, "a.md"));
        assert!(settings.is_note_tracked("a.md"));
        // Repeated notifications for the same content change nothing
        assert!(!sync.reconcile(&mut settings, "a.md"));

        fs::write(dir.path().join("a.md"), "Text only").unwrap();
        assert!(sync.reconcile(&mut settings, "a.md"));
        assert!(!settings.is_note_tracked("a.md"));
    }

    #[test]
    fn test_reconcile_daily_key_alone_tracks() {
        let (_dir, vault) = vault(&[("a.md", "---\ndaily_goal: 10\n---\n")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);
        assert!(sync.reconcile(&mut settings, "a.md"));
    }

    #[test]
    fn test_reconcile_ignores_other_files() {
        let (_dir, vault) = vault(&[("a.txt", "---\ngoal: 100\n---\n"), ("Drafts/x.md", "x")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);
        assert!(!sync.reconcile(&mut settings, "a.txt"));
        assert!(!sync.reconcile(&mut settings, "Drafts"));
        assert!(!sync.reconcile(&mut settings, "missing.md"));

        settings.additional_file_types.push("txt".into());
        assert!(sync.reconcile(&mut settings, "a.txt"));
    }

    #[test]
    fn test_custom_keys() {
        let (_dir, vault) = vault(&[("a.md", "---\ntarget: 100\n---\n")]);
        let mut settings = Settings::default();
        settings.custom_goal_frontmatter_key = "target".into();
        let sync = SettingsSync::new(&vault, &settings);
        assert!(sync.reconcile(&mut settings, "a.md"));
    }

    #[test]
    fn test_add_goal_to_note_writes_frontmatter() {
        let (_dir, vault) = vault(&[("a.md", "Body")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);
        let entry = vault.resolve("a.md").unwrap();

        assert!(sync.add_or_update_goal(&mut settings, &entry, Some(500), Some(50)).unwrap());
        let fm = vault.frontmatter("a.md").unwrap();
        assert_eq!(fm.count("goal"), Some(500));
        assert_eq!(fm.count("daily_goal"), Some(50));
        assert!(settings.is_note_tracked("a.md"));

        // Update keeps the daily goal, clears nothing else
        sync.add_or_update_goal(&mut settings, &entry, Some(600), None).unwrap();
        let fm = vault.frontmatter("a.md").unwrap();
        assert_eq!(fm.count("goal"), Some(600));
        assert_eq!(fm.count("daily_goal"), Some(50));
    }

    #[test]
    fn test_add_goal_to_folder() {
        let (_dir, vault) = vault(&[("Drafts/a.md", "x")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);
        let folder = vault.resolve("Drafts").unwrap();

        assert!(sync.add_or_update_goal(&mut settings, &folder, Some(10000), Some(1000)).unwrap());
        assert!(sync.add_or_update_goal(&mut settings, &folder, None, Some(0)).unwrap());
        let goal = settings.folder_goal("Drafts").unwrap();
        assert_eq!(goal.goal_count, Some(10000));
        assert_eq!(goal.daily_goal_count, None);
    }

    #[test]
    fn test_add_goal_rejects_uncounted_file() {
        let (_dir, vault) = vault(&[("img.png", "x")]);
        let mut settings = Settings::default();
        let sync = SettingsSync::new(&vault, &settings);
        let entry = vault.resolve("img.png").unwrap();
        assert!(sync.add_or_update_goal(&mut settings, &entry, Some(1), None).is_err());
    }

    #[test]
    fn test_remove_goal_strips_frontmatter() {
        let (_dir, vault) = vault(&[("a.md", "---\ngoal: 1\ndaily_goal: 2\ntitle: X\n---\nBody")]);
        let mut settings = Settings::default();
        settings.track_note("a.md");
        let sync = SettingsSync::new(&vault, &settings);

        assert!(sync.remove_goal(&mut settings, "a.md").unwrap());
        assert!(settings.no_goal("a.md"));
        let fm = vault.frontmatter("a.md").unwrap();
        assert!(fm.get("goal").is_none());
        assert!(fm.get("title").is_some());
    }
}
