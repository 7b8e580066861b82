//! List every tracked goal

use writing_goals::{GoalEngine, Result, VaultContext};

use super::render;

pub fn run(ctx: &VaultContext) -> Result<()> {
    let mut engine = GoalEngine::open(ctx.open_vault()?)?;
    let snapshot = engine.refresh();
    render::notices(&mut engine);

    if ctx.json {
        return render::json(&snapshot.goals);
    }

    if snapshot.goals.is_empty() {
        println!("(no writing goals)");
        return Ok(());
    }

    let labels = engine.settings().show_in_file_explorer;
    for (path, goal) in &snapshot.goals {
        if labels {
            println!("{:<28} {}", goal.label(), path);
        } else {
            println!("{}", path);
        }
    }

    for path in engine.missing_targets() {
        eprintln!("Warning: tracked target no longer exists: {}", path);
    }
    Ok(())
}
