//! Vault access
//!
//! `VaultProvider` is the seam between goal tracking and the storage holding the
//! notes. `FsVault` implements it over a directory on disk; vault paths are
//! `/`-separated and relative to the vault root, which itself is `""`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::constants as C;
use crate::error::{GoalError, Result};
use crate::frontmatter::{self, Frontmatter};
use crate::util;

/// A file or folder inside the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEntry {
    File {
        path: String,
        name: String,
        extension: String,
    },
    Folder {
        path: String,
        name: String,
    },
}

impl VaultEntry {
    pub fn path(&self) -> &str {
        match self {
            VaultEntry::File { path, .. } | VaultEntry::Folder { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VaultEntry::File { name, .. } | VaultEntry::Folder { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, VaultEntry::Folder { .. })
    }

    /// File extension, None for folders
    pub fn extension(&self) -> Option<&str> {
        match self {
            VaultEntry::File { extension, .. } => Some(extension),
            VaultEntry::Folder { .. } => None,
        }
    }
}

/// Host file and metadata access used by goal tracking
pub trait VaultProvider {
    /// Resolve a vault path; None when nothing exists there
    fn resolve(&self, path: &str) -> Option<VaultEntry>;

    /// Read a file's text
    fn read(&self, path: &str) -> Result<String>;

    /// Direct children of a folder
    fn children(&self, folder: &str) -> Result<Vec<VaultEntry>>;

    /// Rewrite a file's frontmatter mapping in place
    fn process_frontmatter(&self, path: &str, edit: &mut dyn FnMut(&mut Mapping)) -> Result<()>;

    /// Move a file or folder
    fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Parsed frontmatter of a file; None when absent or unreadable
    fn frontmatter(&self, path: &str) -> Option<Frontmatter> {
        let content = self.read(path).ok()?;
        Frontmatter::parse(&content)
    }
}

/// Vault backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open a vault rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(GoalError::TargetNotFound(util::display_path(&root)));
        }
        let root = dunce::canonicalize(&root).unwrap_or(root);
        Ok(Self { root })
    }

    /// Vault root on disk
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding settings and history
    pub fn data_dir(&self) -> PathBuf {
        self.root.join(C::DATA_DIR)
    }

    /// Absolute location of a vault path
    pub fn absolute(&self, path: &str) -> Result<PathBuf> {
        util::secure_path(&self.root, path)
            .map_err(|e| GoalError::invalid_path(path, e.to_string()))
    }

    /// Vault path of an absolute location under the root
    pub fn vault_path(&self, absolute: &Path) -> Option<String> {
        let relative = absolute.strip_prefix(&self.root).ok()?;
        Some(util::normalize_vault_path(&util::display_path(relative)))
    }

    fn entry_for(&self, path: String, absolute: &Path) -> Option<VaultEntry> {
        let name = if path.is_empty() {
            self.root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        } else {
            path.rsplit(C::VAULT_SEPARATOR).next().unwrap_or(&path).to_string()
        };

        if absolute.is_dir() {
            Some(VaultEntry::Folder { path, name })
        } else if absolute.is_file() {
            let extension = absolute
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            Some(VaultEntry::File { path, name, extension })
        } else {
            None
        }
    }
}

impl VaultProvider for FsVault {
    fn resolve(&self, path: &str) -> Option<VaultEntry> {
        let path = util::normalize_vault_path(path);
        let absolute = self.absolute(&path).ok()?;
        self.entry_for(path, &absolute)
    }

    fn read(&self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(self.absolute(path)?)?)
    }

    fn children(&self, folder: &str) -> Result<Vec<VaultEntry>> {
        let folder = util::normalize_vault_path(folder);
        let dir = self.absolute(&folder)?;

        let mut children = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Skip hidden entries, including the data directory
            if name.starts_with('.') {
                continue;
            }
            // Links are not followed: a linked folder can loop back or repeat content
            if entry.file_type()?.is_symlink() {
                tracing::trace!(folder = %folder, name = %name, "skipping symlink");
                continue;
            }

            let path = util::join_vault_path(&folder, &name);
            if let Some(child) = self.entry_for(path, &entry.path()) {
                children.push(child);
            }
        }
        children.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(children)
    }

    fn process_frontmatter(&self, path: &str, edit: &mut dyn FnMut(&mut Mapping)) -> Result<()> {
        let absolute = self.absolute(path)?;
        let content = fs::read_to_string(&absolute)?;
        let updated = frontmatter::update(&content, |map| edit(map))?;
        if updated != content {
            fs::write(&absolute, updated)?;
        }
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.absolute(from)?;
        let dest = self.absolute(to)?;
        if !source.exists() {
            return Err(GoalError::TargetNotFound(from.to_string()));
        }
        if dest.exists() {
            return Err(GoalError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Destination already exists: {}", to),
            )));
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &dest)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vault() -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("Drafts/Part 1")).unwrap();
        fs::create_dir_all(dir.path().join(C::DATA_DIR)).unwrap();
        fs::write(dir.path().join("Drafts/ch1.md"), "---\ngoal: 10\n---\nOne two").unwrap();
        fs::write(dir.path().join("Drafts/Part 1/ch2.md"), "Three").unwrap();
        fs::write(dir.path().join("image.png"), [0u8, 1, 2]).unwrap();
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    #[test]
    fn test_resolve_file_and_folder() {
        let (_dir, vault) = vault();
        assert_eq!(
            vault.resolve("Drafts/ch1.md"),
            Some(VaultEntry::File {
                path: "Drafts/ch1.md".to_string(),
                name: "ch1.md".to_string(),
                extension: "md".to_string(),
            })
        );
        assert!(vault.resolve("/Drafts/").unwrap().is_folder());
        assert!(vault.resolve("missing.md").is_none());
        assert!(vault.resolve("../outside").is_none());
    }

    #[test]
    fn test_children_skip_hidden_and_sort() {
        let (_dir, vault) = vault();
        let root: Vec<String> = vault.children("").unwrap().iter().map(|c| c.path().to_string()).collect();
        assert_eq!(root, vec!["Drafts", "image.png"]);

        let drafts: Vec<String> = vault.children("Drafts").unwrap().iter().map(|c| c.path().to_string()).collect();
        assert_eq!(drafts, vec!["Drafts/Part 1", "Drafts/ch1.md"]);
    }

    #[test]
    fn test_frontmatter_and_process() {
        let (_dir, vault) = vault();
        assert_eq!(vault.frontmatter("Drafts/ch1.md").unwrap().count("goal"), Some(10));
        assert!(vault.frontmatter("Drafts/Part 1/ch2.md").is_none());

        vault
            .process_frontmatter("Drafts/ch1.md", &mut |map: &mut Mapping| {
                map.remove("goal");
            })
            .unwrap();
        assert_eq!(vault.read("Drafts/ch1.md").unwrap(), "One two");
    }

    #[test]
    fn test_rename() {
        let (_dir, vault) = vault();
        vault.rename("Drafts/ch1.md", "Final/ch1.md").unwrap();
        assert!(vault.resolve("Drafts/ch1.md").is_none());
        assert!(vault.resolve("Final/ch1.md").is_some());
        assert!(vault.rename("Drafts/ch1.md", "x.md").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_children_skip_symlinks() {
        let (dir, vault) = vault();
        std::os::unix::fs::symlink(dir.path().join("Drafts"), dir.path().join("Drafts/loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("image.png"), dir.path().join("Drafts/pic.png")).unwrap();

        let drafts: Vec<String> = vault.children("Drafts").unwrap().iter().map(|c| c.path().to_string()).collect();
        assert_eq!(drafts, vec!["Drafts/Part 1", "Drafts/ch1.md"]);
    }
}
