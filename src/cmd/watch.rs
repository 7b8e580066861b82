//! Watch the vault and keep goals current

use std::thread;
use std::time::Duration;

use writing_goals::{GoalEngine, Result, VaultContext, VaultEvent, VaultWatcher};

use super::render;

pub fn run(ctx: &VaultContext, interval: u64) -> Result<()> {
    let mut engine = GoalEngine::open(ctx.open_vault()?)?;
    let mut watcher = VaultWatcher::new(engine.vault())?;
    let interval = Duration::from_secs(interval.max(1));

    engine.handle(VaultEvent::LayoutReady)?;
    print_views(ctx, &mut engine)?;

    loop {
        thread::sleep(interval);

        let mut events = watcher.drain(engine.vault());
        events.extend(engine.missing_targets().into_iter().map(VaultEvent::Deleted));

        let mut refreshed = false;
        for event in events {
            tracing::debug!(?event, "vault change");
            refreshed |= engine.handle(event)?;
        }

        // Periodic snapshot of the open goal views
        let views = engine.settings().goal_leaves.clone();
        engine.persist_open_views(views);

        if refreshed {
            print_views(ctx, &mut engine)?;
        } else {
            render::notices(&mut engine);
        }
    }
}

/// Print the goals shown in open views, or all goals when none are open
fn print_views(ctx: &VaultContext, engine: &mut GoalEngine) -> Result<()> {
    render::notices(engine);
    let snapshot = engine.snapshot();
    let views = &engine.settings().goal_leaves;

    let goals: Vec<_> = snapshot
        .goals
        .values()
        .filter(|goal| views.is_empty() || views.contains(&goal.path))
        .collect();

    if ctx.json {
        return render::json(&goals);
    }
    println!("{}", chrono::Local::now().format("%H:%M:%S"));
    for goal in goals {
        println!("  {:<28} {}", goal.label(), goal.path);
    }
    Ok(())
}
