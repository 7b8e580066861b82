//! Show daily history

use writing_goals::{GoalEngine, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, path: Option<String>, prune: bool) -> Result<()> {
    let vault = ctx.open_vault()?;
    let path = path.map(|p| ctx.vault_path(&vault, &p));
    let mut engine = GoalEngine::open(vault)?;

    if prune {
        let dropped = engine.prune_history()?;
        eprintln!("Pruned history of {} untracked target(s)", dropped);
    }

    let history = engine.history();
    if let Some(path) = path {
        let entries = history.history_for(&path);
        if ctx.json {
            return render::json(entries);
        }
        render::history(&path, entries);
        return Ok(());
    }

    if ctx.json {
        return render::json(history.load_all());
    }
    if history.load_all().is_empty() {
        println!("(no history)");
    }
    for (path, entries) in history.load_all() {
        render::history(path, entries);
    }
    Ok(())
}
