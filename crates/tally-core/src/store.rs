//! The `HabitStore` trait: the storage boundary of the engine.
//!
//! The engine needs nothing more than a durable mapping from habit id to the
//! full habit snapshot (attributes, completion set, cached counters). Backends
//! implement this trait (e.g. `tally-store-sqlite`, or the in-process
//! [`crate::memory::MemoryStore`]); the [`crate::tracker::Tracker`] depends on
//! the abstraction only.

use std::future::Future;

use crate::habit::{Habit, HabitId};

/// Abstraction over a habit store backend.
///
/// Stores do no validation and no streak math; they persist exactly what they
/// are given. Serialising writes to the same habit is the caller's job.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a newly created habit. The id must not already exist.
  fn insert_habit(
    &self,
    habit: Habit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a habit by id. Returns `None` if not found.
  fn get_habit(
    &self,
    id: HabitId,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// All habits, newest first.
  fn list_habits(
    &self,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Replace the stored snapshot of an existing habit: attributes, the whole
  /// completion set, and both counters, atomically.
  ///
  /// Returns `false` if no habit with that id exists.
  fn put_habit(
    &self,
    habit: Habit,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a habit and all of its completion records.
  ///
  /// Returns `false` if no habit with that id existed.
  fn delete_habit(
    &self,
    id: HabitId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
