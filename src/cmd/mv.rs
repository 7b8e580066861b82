//! Move a note or folder inside the vault

use writing_goals::{GoalEngine, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext, from: String, to: String) -> Result<()> {
    let vault = ctx.open_vault()?;
    let from = ctx.vault_path(&vault, &from);
    let to = writing_goals::util::normalize_vault_path(&to);
    let mut engine = GoalEngine::open(vault)?;

    engine.move_path(&from, &to)?;
    render::notices(&mut engine);

    eprintln!("Moved {} -> {}", from, to);
    Ok(())
}
