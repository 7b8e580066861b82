//! Process change notifications for files

use writing_goals::{GoalEngine, Result, VaultContext, VaultEvent};

use super::render;

pub fn run(ctx: &VaultContext, paths: Vec<String>) -> Result<()> {
    let vault = ctx.open_vault()?;
    let paths: Vec<String> = paths.iter().map(|p| ctx.vault_path(&vault, p)).collect();
    let mut engine = GoalEngine::open(vault)?;

    if paths.is_empty() {
        engine.handle(VaultEvent::LayoutReady)?;
    }
    for path in &paths {
        if engine.resolve(path).is_some() {
            engine.handle(VaultEvent::MetadataChanged(path.clone()))?;
        } else {
            engine.handle(VaultEvent::Deleted(path.clone()))?;
        }
    }
    render::notices(&mut engine);

    let snapshot = engine.snapshot();
    if ctx.json {
        return render::json(&snapshot.goals);
    }
    for path in &paths {
        match snapshot.goal(path) {
            Some(goal) => println!("{:<28} {}", goal.label(), path),
            None => println!("{:<28} {}", "(no goal)", path),
        }
    }
    if paths.is_empty() {
        println!("Refreshed {} goal(s)", snapshot.goals.len());
    }
    Ok(())
}
