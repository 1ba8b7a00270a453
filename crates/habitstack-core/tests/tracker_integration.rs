//! Integration tests for the tracker lifecycle: rehydrate, act, roll the day
//! over, flush, and rehydrate again.

use habitstack_core::{
    CalendarDate, Cadence, CadenceKind, Config, FileStore, FixedClock, HabitDraft, KeyValueStore,
    MemoryStore, Tracker,
};

fn date(s: &str) -> CalendarDate {
    CalendarDate::parse(s).unwrap()
}

#[tokio::test]
async fn missed_tasks_carry_over_and_break_the_streak() {
    let store = MemoryStore::new();
    let config = Config::default();

    // Day 1: two tasks, both done.
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-01")), &config).await;
    t.reconcile_day();
    let a = t.add_task("Inbox zero", None).unwrap();
    let b = t.add_task("Run", None).unwrap();
    t.toggle_task(&a);
    t.toggle_task(&b);
    assert_eq!(t.task_streak(), 1);
    t.flush(&store).await.unwrap();

    // Day 2: one task left open.
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-02")), &config).await;
    t.reconcile_day();
    let c = t.add_task("Taxes", None).unwrap();
    assert_eq!(t.task_streak(), 1);
    t.flush(&store).await.unwrap();

    // Day 3: the open task is carried, day 2 is failed.
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-03")), &config).await;
    let report = t.reconcile_day();
    assert_eq!(report.carried, vec![c.clone()]);
    assert!(t.todo().failed_days.contains(&date("2026-02-02")));
    assert_eq!(t.todo().task(&c).unwrap().scheduled_date, date("2026-02-03"));
    assert_eq!(t.todo().tasks.len(), 3);
    assert_eq!(t.task_streak(), 0);

    // Finishing it today starts a new run.
    t.toggle_task(&c);
    assert!(t.todo().completed_days.contains(&date("2026-02-03")));
    assert_eq!(t.task_streak(), 1);
}

#[tokio::test]
async fn double_activation_does_not_double_apply() {
    let store = MemoryStore::new();
    let config = Config::default();
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-01")), &config).await;
    t.add_task("Laundry", None).unwrap();
    t.flush(&store).await.unwrap();

    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-05")), &config).await;
    let first = t.reconcile_day();
    let snapshot = t.todo().clone();
    let second = t.reconcile_day();
    assert!(first.applied);
    assert!(!second.applied);
    assert_eq!(t.todo(), &snapshot);
}

#[tokio::test]
async fn habit_streak_tracks_due_days() {
    let store = MemoryStore::new();
    let config = Config::default();
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-01")), &config).await;

    let id = t
        .add_habit_stack(
            &[
                HabitDraft {
                    behaviour: Some("Make tea".into()),
                    time: Some("07:30".into()),
                    location: Some("Kitchen".into()),
                },
                HabitDraft::behaviour("Plan the day"),
            ],
            Cadence::daily(),
            Some(date("2026-02-01")),
        )
        .unwrap();
    t.toggle_habit_completion(&id, Some(date("2026-02-01")));
    t.toggle_habit_completion(&id, Some(date("2026-02-02")));
    t.flush(&store).await.unwrap();

    let at_02 = Tracker::load(&store, FixedClock::new(date("2026-02-02")), &config).await;
    assert_eq!(at_02.habit_streak(&id), 2);

    let at_03 = Tracker::load(&store, FixedClock::new(date("2026-02-03")), &config).await;
    assert_eq!(at_03.habit_streak(&id), 2, "today unfinished is not a break");

    let at_04 = Tracker::load(&store, FixedClock::new(date("2026-02-04")), &config).await;
    assert_eq!(at_04.habit_streak(&id), 0, "missed 2026-02-03");
}

#[tokio::test]
async fn reorder_of_filtered_view_survives_persistence() {
    let store = MemoryStore::new();
    let config = Config::default();
    // 2026-02-02 is a Monday.
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-02")), &config).await;
    let monday = |t: &mut Tracker<FixedClock>, name: &str| {
        t.add_habit_stack(
            &[HabitDraft::behaviour(name)],
            Cadence::new(CadenceKind::Weekly, [1]).unwrap(),
            Some(date("2026-01-01")),
        )
        .unwrap()
    };
    let friday = |t: &mut Tracker<FixedClock>, name: &str| {
        t.add_habit_stack(
            &[HabitDraft::behaviour(name)],
            Cadence::new(CadenceKind::Weekly, [5]).unwrap(),
            Some(date("2026-01-01")),
        )
        .unwrap()
    };
    // New stacks go first, so add in reverse to end up with A, B, C, D.
    let d = friday(&mut t, "D");
    let c = monday(&mut t, "C");
    let b = friday(&mut t, "B");
    let a = monday(&mut t, "A");

    let order: Vec<_> = t.habits().stacks.iter().map(|s| s.id.clone()).collect();
    assert_eq!(order, vec![a.clone(), b.clone(), c.clone(), d.clone()]);

    let visible: Vec<_> = t
        .due_stacks(date("2026-02-02"))
        .into_iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(visible, vec![a.clone(), c.clone()]);

    assert!(t.reorder_habit_stacks(date("2026-02-02"), &[c.clone(), a.clone()]));
    t.flush(&store).await.unwrap();

    let t = Tracker::load(&store, FixedClock::new(date("2026-02-02")), &config).await;
    let order: Vec<_> = t.habits().stacks.iter().map(|s| s.id.clone()).collect();
    assert_eq!(order, vec![c, b, a, d]);
}

#[tokio::test]
async fn removing_a_stack_forgets_its_completions() {
    let store = MemoryStore::new();
    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-02")), &Config::default()).await;
    let id = t
        .add_habit_stack(&[HabitDraft::behaviour("Floss")], Cadence::daily(), None)
        .unwrap();
    t.toggle_habit_completion(&id, None);
    assert!(t.habits().completed_habits.is_completed(&id, date("2026-02-02")));

    t.remove_habit_stack(&id);
    assert!(t.habits().stacks.is_empty());
    assert!(t.habits().completed_habits.is_empty());
}

#[tokio::test]
async fn file_store_persists_snapshots_in_expected_shape() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let config = Config::default();

    let mut t = Tracker::load(&store, FixedClock::new(date("2026-02-01")), &config).await;
    t.reconcile_day();
    t.add_task("Write report", None).unwrap();
    let id = t
        .add_habit_stack(&[HabitDraft::behaviour("Read")], Cadence::daily(), None)
        .unwrap();
    t.toggle_habit_completion(&id, None);
    t.flush(&store).await.unwrap();

    let todo: serde_json::Value =
        serde_json::from_slice(&store.get("todo-storage").await.unwrap().unwrap()).unwrap();
    assert_eq!(todo["lastActiveDate"], "2026-02-01");
    assert_eq!(todo["tasks"][0]["title"], "Write report");

    let habits: serde_json::Value =
        serde_json::from_slice(&store.get("habit-storage").await.unwrap().unwrap()).unwrap();
    assert_eq!(habits["stacks"][0]["cadence"]["type"], "daily");
    assert_eq!(habits["stacks"][0]["startDate"], "2026-02-01");
    assert_eq!(habits["completedHabits"]["2026-02-01"][0], id.as_str());

    let reloaded = Tracker::load(&store, FixedClock::new(date("2026-02-01")), &config).await;
    assert_eq!(reloaded.todo(), t.todo());
    assert_eq!(reloaded.habits(), t.habits());
}
