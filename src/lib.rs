pub mod cli;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod frontmatter;
pub mod goal;
pub mod history;
pub mod resolve;
pub mod settings;
pub mod sync;
pub mod util;
pub mod vault;
pub mod watch;
pub mod word_count;

pub use cli::{Cli, Command};
pub use engine::{GoalEngine, GoalSnapshot, SnapshotPublisher};
pub use error::{GoalError, Notice, Result};
pub use events::{ChangeFilter, VaultEvent};
pub use frontmatter::Frontmatter;
pub use goal::{Goal, GoalBuilder, GoalType, Goals};
pub use history::{HistoryEntry, HistoryLog, HistoryStore};
pub use resolve::VaultContext;
pub use settings::{FolderGoal, FrontmatterKeys, Settings, SettingsStore};
pub use sync::SettingsSync;
pub use vault::{FsVault, VaultEntry, VaultProvider};
pub use watch::{vault_events, VaultWatcher};
pub use word_count::WordCounter;
