use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use writing_goals::constants as C;
use writing_goals::{Cli, Command, VaultContext};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(C::ENV_LOG)
                .unwrap_or_else(|_| EnvFilter::new(C::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = VaultContext::new(cli.vault.as_deref(), cli.json);

    let result = match cli.command {
        Command::View { path, pin } => cmd::view::run(&ctx, path, pin),
        Command::List => cmd::list::run(&ctx),
        Command::Set { path, goal, daily } => cmd::set::run(&ctx, path, goal, daily),
        Command::Remove { path } => cmd::remove::run(&ctx, path),
        Command::History { path, prune } => cmd::history::run(&ctx, path, prune),
        Command::Sync { paths } => cmd::sync::run(&ctx, paths),
        Command::Mv { from, to } => cmd::mv::run(&ctx, from, to),
        Command::Watch { interval } => cmd::watch::run(&ctx, interval),
        Command::Config { key, value } => cmd::config::run(&ctx, key, value),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

mod cmd {
    pub mod config;
    pub mod history;
    pub mod list;
    pub mod mv;
    pub mod remove;
    pub mod render;
    pub mod set;
    pub mod sync;
    pub mod view;
    pub mod watch;
}
