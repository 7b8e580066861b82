use std::fs;

use chrono::NaiveDate;
use notify::event::{DataChange, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tempfile::TempDir;
use writing_goals::{vault_events, FsVault, GoalEngine, GoalType, HistoryStore, VaultEvent};

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

fn write(dir: &TempDir, path: &str, content: &str) {
    let full = dir.path().join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

fn open(dir: &TempDir) -> GoalEngine {
    GoalEngine::open(FsVault::open(dir.path()).unwrap()).unwrap()
}

#[test]
fn goals_and_baselines_survive_reopening_the_vault() {
    let dir = TempDir::new().unwrap();
    write(&dir, "Book/ch1.md", &format!("---\ngoal: 2000\n---\n{}", words(100)));
    write(&dir, "Book/ch2.md", &words(50));

    {
        let mut engine = open(&dir);
        engine.handle(VaultEvent::LayoutReady).unwrap();
        engine.handle(VaultEvent::Modified("Book/ch1.md".into())).unwrap();
        engine.set_goal("Book", Some(50000), Some(1000)).unwrap();
        assert!(engine.take_notices().is_empty());
    }

    write(&dir, "Book/ch2.md", &words(80));

    let mut engine = open(&dir);
    let snapshot = engine.refresh();
    let folder = snapshot.goal("Book").unwrap();
    assert_eq!(folder.goal_type, GoalType::Folder);
    assert_eq!(folder.start_count, 150);
    assert_eq!(folder.current_count, 180);
    assert_eq!(folder.daily_progress(), 30);

    let note = snapshot.goal("Book/ch1.md").unwrap();
    assert_eq!(note.goal_type, GoalType::Note);
    assert_eq!(note.title, "ch1");
    assert_eq!(note.target_count, Some(2000));
    assert_eq!(note.label(), "100/2000");

    assert_eq!(snapshot.history.len(), 2);
    assert!(dir.path().join(".writing-goals/settings.json").exists());
    assert!(dir.path().join(".writing-goals/history.json").exists());
}

#[test]
fn watcher_events_drive_the_engine() {
    let dir = TempDir::new().unwrap();
    write(&dir, "draft.md", &words(10));
    let mut engine = open(&dir);
    let root = engine.vault().root().to_path_buf();

    write(&dir, "draft.md", &format!("---\ndaily_goal: 300\n---\n{}", words(12)));
    let changed = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
        .add_path(root.join("draft.md"));
    for event in vault_events(engine.vault(), vec![changed]) {
        engine.handle(event).unwrap();
    }
    let goal = engine.snapshot().goal("draft.md").cloned().unwrap();
    assert_eq!(goal.daily_target_count, Some(300));
    assert_eq!(goal.target_count, None);

    fs::remove_file(dir.path().join("draft.md")).unwrap();
    let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(root.join("draft.md"));
    for event in vault_events(engine.vault(), vec![removed]) {
        engine.handle(event).unwrap();
    }
    assert!(engine.snapshot().goals.is_empty());
    assert!(engine.history().load_all().is_empty());
}

#[test]
fn external_rename_keeps_earlier_history() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", &format!("---\ngoal: 1000\n---\n{}", words(20)));
    {
        let vault = FsVault::open(dir.path()).unwrap();
        let mut history = HistoryStore::load(&vault.data_dir()).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        history.ensure_entry_on(earlier, "a.md", Some(1000), None, 5).unwrap();
    }

    let mut engine = open(&dir);
    engine.handle(VaultEvent::Modified("a.md".into())).unwrap();
    assert_eq!(engine.history().history_for("a.md").len(), 2);

    fs::rename(dir.path().join("a.md"), dir.path().join("b.md")).unwrap();
    let root = engine.vault().root().to_path_buf();
    let raw = vec![
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::From)))
            .add_path(root.join("a.md"))
            .set_tracker(7),
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(root.join("b.md"))
            .set_tracker(7),
        Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(root.join("a.md"))
            .add_path(root.join("b.md"))
            .set_tracker(7),
    ];
    let events = vault_events(engine.vault(), raw);
    assert_eq!(events, vec![VaultEvent::Renamed { from: "a.md".into(), to: "b.md".into() }]);
    for event in events {
        engine.handle(event).unwrap();
    }

    let entries = engine.history().history_for("b.md");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].start_count, 5);
    assert!(engine.history().history_for("a.md").is_empty());
    assert!(engine.settings().is_note_tracked("b.md"));
    assert!(engine.snapshot().goal("b.md").is_some());
}

#[test]
fn opted_out_notes_count_zero() {
    let dir = TempDir::new().unwrap();
    write(&dir, "Notes/a.md", &words(30));
    write(&dir, "Notes/skip.md", &format!("---\nwordcount: false\n---\n{}", words(500)));
    write(&dir, "Notes/data.csv", &words(200));

    let mut engine = open(&dir);
    let goal = engine.set_goal("Notes", Some(100), None).unwrap().unwrap();
    assert_eq!(goal.current_count, 30);

    engine.update_setting("additionalFileTypes", "csv").unwrap();
    assert_eq!(engine.snapshot().goal("Notes").unwrap().current_count, 230);
}
