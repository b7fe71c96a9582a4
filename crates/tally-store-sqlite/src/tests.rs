//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc, Weekday};
use tally_core::{
  day::{DayKey, Moment, ReferenceZone},
  habit::{CompletionRecord, Frequency, Habit, HabitAttributes, HabitId},
  store::HabitStore,
  tracker::{FixedClock, Tracker},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(y: i32, m: u32, d: u32) -> DayKey { DayKey::from_ymd(y, m, d).unwrap() }

fn habit(name: &str) -> Habit {
  let attrs = HabitAttributes {
    name: name.into(),
    description: Some("every morning".into()),
    emoji: Some("🧘".into()),
    frequency: Frequency::Custom { days: vec![Weekday::Mon, Weekday::Thu] },
    reminder_time: Some("06:45".parse().unwrap()),
  };
  Habit::new(attrs, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_round_trips_attributes() {
  let s = store().await;
  let h = habit("Yoga");
  s.insert_habit(h.clone()).await.unwrap();

  let fetched = s.get_habit(h.habit_id).await.unwrap().unwrap();
  assert_eq!(fetched, h);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get_habit(HabitId::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let mut older = habit("Older");
  older.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
  let newer = habit("Newer");

  s.insert_habit(older.clone()).await.unwrap();
  s.insert_habit(newer.clone()).await.unwrap();

  let names: Vec<String> = s
    .list_habits()
    .await
    .unwrap()
    .into_iter()
    .map(|h| h.attributes.name)
    .collect();
  assert_eq!(names, vec!["Newer", "Older"]);
}

// ─── Completions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_replaces_completions_and_counters() {
  let s = store().await;
  let mut h = habit("Read");
  s.insert_habit(h.clone()).await.unwrap();

  for (d, note) in [(day(2024, 6, 1), Some("ch. 1")), (day(2024, 6, 2), None)] {
    let rec = CompletionRecord::new(d, note.map(str::to_owned), Some(Utc::now())).unwrap();
    h.completions.insert(d, rec);
  }
  h.current_streak = 2;
  h.longest_streak = 2;
  assert!(s.put_habit(h.clone()).await.unwrap());

  let fetched = s.get_habit(h.habit_id).await.unwrap().unwrap();
  assert_eq!(fetched.day_keys(), vec![day(2024, 6, 1), day(2024, 6, 2)]);
  assert_eq!(fetched.record(day(2024, 6, 1)).unwrap().note.as_deref(), Some("ch. 1"));
  assert_eq!((fetched.current_streak, fetched.longest_streak), (2, 2));

  h.completions.remove(&day(2024, 6, 1));
  h.current_streak = 1;
  s.put_habit(h.clone()).await.unwrap();

  let fetched = s.get_habit(h.habit_id).await.unwrap().unwrap();
  assert_eq!(fetched.day_keys(), vec![day(2024, 6, 2)]);
  assert_eq!((fetched.current_streak, fetched.longest_streak), (1, 2));
}

#[tokio::test]
async fn put_unknown_habit_returns_false() {
  let s = store().await;
  assert!(!s.put_habit(habit("Ghost")).await.unwrap());
  assert!(s.list_habits().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_cascades_to_completions() {
  let s = store().await;
  let mut h = habit("Run");
  let d = day(2024, 6, 3);
  h.completions.insert(d, CompletionRecord::new(d, None, None).unwrap());
  s.insert_habit(h.clone()).await.unwrap();

  assert!(s.delete_habit(h.habit_id).await.unwrap());
  assert!(s.get_habit(h.habit_id).await.unwrap().is_none());
  assert!(!s.delete_habit(h.habit_id).await.unwrap());

  let orphans: i64 = s
    .conn_for_tests()
    .call(|conn| {
      Ok(conn.query_row("SELECT COUNT(*) FROM completions", [], |r| r.get(0))?)
    })
    .await
    .unwrap();
  assert_eq!(orphans, 0);
}

#[tokio::test]
async fn list_attaches_completions_to_their_habits() {
  let s = store().await;
  let mut a = habit("A");
  let mut b = habit("B");
  let mark = |h: &mut Habit, d: DayKey| {
    h.completions.insert(d, CompletionRecord::new(d, None, None).unwrap());
  };
  mark(&mut a, day(2024, 6, 1));
  mark(&mut b, day(2024, 6, 2));
  mark(&mut b, day(2024, 6, 3));
  s.insert_habit(a.clone()).await.unwrap();
  s.insert_habit(b.clone()).await.unwrap();

  let all = s.list_habits().await.unwrap();
  let find = |id: HabitId| all.iter().find(|h| h.habit_id == id).unwrap();
  assert_eq!(find(a.habit_id).completions.len(), 1);
  assert_eq!(find(b.habit_id).completions.len(), 2);
}

// ─── Through the tracker ─────────────────────────────────────────────────────

#[tokio::test]
async fn tracker_toggles_survive_reload() {
  let s = store().await;
  let now = Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap();
  let tracker = Tracker::with_clock(s.clone(), ReferenceZone::UTC, Arc::new(FixedClock(now)));

  let id = tracker.create_habit(HabitAttributes::named("Water")).await.unwrap().habit_id;
  for offset in 0..5 {
    let date = day(2024, 6, 1).date() + Duration::days(offset);
    tracker.toggle_completion(id, Some(Moment::Date(date)), None).await.unwrap();
  }
  tracker.toggle_completion(id, Some(Moment::from("2024-06-09")), Some("late".into())).await.unwrap();
  tracker.toggle_completion(id, None, None).await.unwrap();

  let reloaded = s.get_habit(id).await.unwrap().unwrap();
  assert_eq!(reloaded.completions.len(), 7);
  assert_eq!((reloaded.current_streak, reloaded.longest_streak), (2, 5));
  assert_eq!(reloaded.record(day(2024, 6, 9)).unwrap().note.as_deref(), Some("late"));

  // Un-marking the middle of the old run keeps the recorded maximum.
  tracker.toggle_completion(id, Some(Moment::from("2024-06-03")), None).await.unwrap();
  let reloaded = s.get_habit(id).await.unwrap().unwrap();
  assert_eq!((reloaded.current_streak, reloaded.longest_streak), (2, 5));
}

#[tokio::test]
async fn open_on_disk_reapplies_schema() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("tally.db");

  let h = habit("Persist");
  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert_habit(h.clone()).await.unwrap();
  }
  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.get_habit(h.habit_id).await.unwrap().unwrap(), h);
}
