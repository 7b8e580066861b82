//! Constants for writing-goals
//!
//! File names, default frontmatter keys, environment variables and other
//! hardcoded values shared across the codebase.

// === File and Directory Names ===

/// Data directory inside the vault holding settings and history
pub const DATA_DIR: &str = ".writing-goals";

/// Settings file name (inside DATA_DIR)
pub const SETTINGS_FILENAME: &str = "settings.json";

/// History file name (inside DATA_DIR)
pub const HISTORY_FILENAME: &str = "history.json";

/// Extension always considered countable
pub const MARKDOWN_EXTENSION: &str = "md";

/// Path separator used for vault paths
pub const VAULT_SEPARATOR: char = '/';

// === Frontmatter ===

/// Default frontmatter key for the lifetime goal
pub const DEFAULT_GOAL_KEY: &str = "goal";

/// Default frontmatter key for the daily goal
pub const DEFAULT_DAILY_GOAL_KEY: &str = "daily_goal";

/// Default frontmatter key that opts a file out of word counting
pub const DEFAULT_WORD_COUNT_KEY: &str = "wordcount";

/// Frontmatter fence
pub const FRONTMATTER_FENCE: &str = "---";

/// Maximum size of frontmatter to parse (prevents DoS on malformed files)
pub const MAX_FRONTMATTER_SIZE: usize = 64 * 1024; // 64KB

// === Dates and Timers ===

/// Date format used in history entries and display
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default interval between watch ticks, in seconds
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 5;

// === Environment Variables ===

/// Vault root override
pub const ENV_VAULT: &str = "WRITING_GOALS_VAULT";

/// Override for "today" (YYYY-MM-DD), used by tests
pub const ENV_TODAY: &str = "WRITING_GOALS_TODAY";

/// Log filter (tracing EnvFilter syntax)
pub const ENV_LOG: &str = "WRITING_GOALS_LOG";

/// Default log filter when ENV_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";
