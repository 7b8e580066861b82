//! Shared output formatting for commands

use serde::Serialize;
use writing_goals::{Goal, GoalEngine, GoalType, HistoryEntry, Result, VaultProvider};

/// Print notices collected by the engine to stderr
pub fn notices<V: VaultProvider>(engine: &mut GoalEngine<V>) {
    for notice in engine.take_notices() {
        eprintln!("Warning: {}", notice);
    }
}

/// Print a value as pretty JSON
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a goal with its progress
pub fn goal(goal: &Goal) {
    let kind = match goal.goal_type {
        GoalType::Note => "note",
        GoalType::Folder => "folder",
    };
    println!("{} ({})", goal.title, kind);
    println!("  Path:    {}", goal.path);

    match (goal.target_count, goal.percent()) {
        (Some(target), Some(percent)) => {
            println!("  Words:   {} / {} ({:.1}%)", goal.current_count, target, percent)
        }
        _ => println!("  Words:   {}", goal.current_count),
    }

    match (goal.daily_target_count, goal.daily_percent()) {
        (Some(daily), Some(percent)) => println!(
            "  Today:   {:+} / {} ({:.1}%)",
            goal.daily_progress(),
            daily,
            percent
        ),
        _ => println!("  Today:   {:+}", goal.daily_progress()),
    }
    println!("  Started: {}", goal.start_count);

    if goal.is_complete() {
        println!("  Goal reached!");
    } else if goal.is_daily_complete() {
        println!("  Daily goal reached!");
    }
}

/// Print the history of one target
pub fn history(path: &str, entries: &[HistoryEntry]) {
    println!("{}", path);
    if entries.is_empty() {
        println!("  (no history)");
        return;
    }
    for entry in entries {
        let count = |c: Option<u64>| c.map_or_else(|| "-".to_string(), |c| c.to_string());
        println!(
            "  {}  start {:<8} goal {:<8} daily {}",
            entry.date,
            entry.start_count,
            count(entry.goal_count),
            count(entry.daily_goal_count)
        );
    }
}
