//! Vault location resolution
//!
//! The vault root comes from, in order:
//! - the `--vault` command-line option
//! - the WRITING_GOALS_VAULT environment variable
//! - the current working directory

use std::path::PathBuf;

use crate::constants as C;
use crate::error::Result;
use crate::util;
use crate::vault::FsVault;

/// Resolution context shared by all commands
#[derive(Debug, Clone)]
pub struct VaultContext {
    /// The vault root directory
    pub root: PathBuf,
    /// Whether to output in JSON format
    pub json: bool,
}

impl VaultContext {
    /// Create a context from the command-line vault option
    pub fn new(vault: Option<&str>, json: bool) -> Self {
        // Treat empty strings as None
        let from_env = std::env::var(C::ENV_VAULT).ok().filter(|s| !s.is_empty());

        let root = match vault.map(str::to_string).or(from_env) {
            Some(path) => util::expand_home(&path),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        };

        Self { root, json }
    }

    /// Open the vault
    pub fn open_vault(&self) -> Result<FsVault> {
        FsVault::open(&self.root)
    }

    /// Convert a command-line path into a vault path
    ///
    /// Paths that exist relative to the current directory and lie inside the
    /// vault are accepted too, so `writing-goals view ./ch1.md` works from a
    /// subfolder.
    pub fn vault_path(&self, vault: &FsVault, arg: &str) -> String {
        let candidate = PathBuf::from(arg);
        if candidate.exists() {
            if let Ok(absolute) = dunce::canonicalize(&candidate) {
                if let Some(path) = vault.vault_path(&absolute) {
                    return path;
                }
            }
        }
        util::normalize_vault_path(arg)
    }
}
