//! Remove a goal

use writing_goals::{GoalEngine, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, path: String) -> Result<()> {
    let vault = ctx.open_vault()?;
    let path = ctx.vault_path(&vault, &path);
    let mut engine = GoalEngine::open(vault)?;

    let removed = engine.remove_goal(&path)?;
    render::notices(&mut engine);

    if ctx.json {
        return render::json(&serde_json::json!({ "path": path, "removed": removed }));
    }
    if removed {
        eprintln!("Removed writing goal for {}", path);
    } else {
        eprintln!("No writing goal for {}", path);
    }
    Ok(())
}
