//! Add or update a goal

use writing_goals::{GoalEngine, GoalError, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, path: String, goal: Option<u64>, daily: Option<u64>) -> Result<()> {
    if goal.is_none() && daily.is_none() {
        return Err(GoalError::InvalidSetting {
            key: "goal".to_string(),
            reason: "pass --goal and/or --daily".to_string(),
        });
    }

    let vault = ctx.open_vault()?;
    let path = ctx.vault_path(&vault, &path);
    let mut engine = GoalEngine::open(vault)?;
    let is_new = engine.settings().no_goal(&path);

    let result = engine.set_goal(&path, goal, daily)?;
    render::notices(&mut engine);

    if ctx.json {
        return render::json(&result);
    }

    match result {
        Some(goal) => {
            eprintln!("{} writing goal for {}", if is_new { "Added" } else { "Updated" }, path);
            if engine.settings().show_goal_on_create_and_update {
                render::goal(&goal);
            }
        }
        None => eprintln!("Cleared writing goal for {}", path),
    }
    Ok(())
}
