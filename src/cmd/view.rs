//! View the goal of a note or folder

use writing_goals::{GoalEngine, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, path: String, pin: bool) -> Result<()> {
    let vault = ctx.open_vault()?;
    let path = ctx.vault_path(&vault, &path);
    let mut engine = GoalEngine::open(vault)?;

    let goal = engine.view(&path, pin)?;
    render::notices(&mut engine);

    if ctx.json {
        return render::json(&goal);
    }

    match goal {
        Some(goal) => render::goal(&goal),
        None => {
            println!("No writing goal for {}", path);
            println!("  Add one with: writing-goals set \"{}\" --goal <words>", path);
        }
    }
    Ok(())
}
