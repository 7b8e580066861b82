use clap::{Parser, Subcommand};

/// writing-goals - Word-count goals and daily progress for a markdown vault
///
/// # Quick Reference
///
/// ## Goals on notes
///
/// Notes declare goals in their frontmatter:
///
/// ```text
/// ---
/// goal: 5000
/// daily_goal: 500
/// ---
/// ```
///
/// ```bash
/// writing-goals set "Drafts/ch1.md" --goal 5000 --daily 500
/// writing-goals view "Drafts/ch1.md"     # Goal and today's progress
/// writing-goals sync "Drafts/ch1.md"     # Re-read frontmatter after editing
/// writing-goals remove "Drafts/ch1.md"   # Drop goal, keys and history
/// ```
///
/// ## Goals on folders
///
/// ```bash
/// writing-goals set Drafts --goal 80000 --daily 1000
/// writing-goals view Drafts             # Sum over every note below Drafts
/// ```
///
/// ## Overview
///
/// ```bash
/// writing-goals list                    # Every tracked goal
/// writing-goals history                 # Daily baselines for all targets
/// writing-goals history Drafts          # ... for one target
/// writing-goals watch                   # Keep goals current while writing
/// ```
///
/// ## Settings
///
/// ```bash
/// writing-goals config                              # Show settings
/// writing-goals config includeFrontmatterInCount true
/// writing-goals config additionalFileTypes txt,org
/// ```
///
/// ## Environment Variables
///
/// - `WRITING_GOALS_VAULT`: Vault directory (default: current directory)
/// - `WRITING_GOALS_LOG`: Log filter, e.g. `debug` (default: warn)
/// - `WRITING_GOALS_TODAY`: Override today's date (YYYY-MM-DD)
#[derive(Parser, Debug)]
#[command(name = "writing-goals")]
#[command(version)]
#[command(about = "Word-count goals and daily progress for a markdown vault")]
pub struct Cli {
    /// Vault directory (default: $WRITING_GOALS_VAULT or current directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub vault: Option<String>,

    /// Output in JSON format (for scripting)
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the goal for a note or folder
    #[command(alias = "v")]
    View {
        /// Note or folder path inside the vault
        path: String,

        /// Keep this goal among the open goal views
        #[arg(long)]
        pin: bool,
    },

    /// List every tracked goal
    #[command(alias = "ls")]
    List,

    /// Add or update a goal for a note or folder
    Set {
        /// Note or folder path inside the vault
        path: String,

        /// Lifetime word-count goal (0 clears it)
        #[arg(short, long)]
        goal: Option<u64>,

        /// Daily word-count goal (0 clears it)
        #[arg(short, long)]
        daily: Option<u64>,
    },

    /// Remove the goal, its frontmatter keys and its history
    #[command(alias = "rm")]
    Remove {
        /// Note or folder path inside the vault
        path: String,
    },

    /// Show daily history
    History {
        /// Restrict to one target
        path: Option<String>,

        /// Drop history of targets that are no longer tracked
        #[arg(long)]
        prune: bool,
    },

    /// Re-read a changed file and update tracking
    Sync {
        /// Changed file paths (all tracked targets when empty)
        paths: Vec<String>,
    },

    /// Move a note or folder, keeping its goals and history
    #[command(alias = "move")]
    Mv {
        /// Current path
        from: String,

        /// New path
        to: String,
    },

    /// Watch the vault and keep goals up to date
    Watch {
        /// Seconds between scans
        #[arg(short, long, default_value_t = crate::constants::DEFAULT_WATCH_INTERVAL_SECS)]
        interval: u64,
    },

    /// Show or change settings
    Config {
        /// Setting name (camelCase, as in settings.json)
        key: Option<String>,

        /// New value
        value: Option<String>,
    },
}
