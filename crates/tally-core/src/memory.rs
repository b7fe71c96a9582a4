//! [`MemoryStore`]: an in-process [`HabitStore`] backed by a hash map.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use tokio::sync::RwLock;

use crate::{
  habit::{Habit, HabitId},
  store::HabitStore,
};

/// A non-durable store, useful for tests and embedding.
///
/// Cloning is cheap; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
  habits: Arc<RwLock<HashMap<HabitId, Habit>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl HabitStore for MemoryStore {
  type Error = Infallible;

  async fn insert_habit(&self, habit: Habit) -> Result<(), Infallible> {
    self.habits.write().await.insert(habit.habit_id, habit);
    Ok(())
  }

  async fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, Infallible> {
    Ok(self.habits.read().await.get(&id).cloned())
  }

  async fn list_habits(&self) -> Result<Vec<Habit>, Infallible> {
    let mut habits: Vec<Habit> = self.habits.read().await.values().cloned().collect();
    habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(habits)
  }

  async fn put_habit(&self, habit: Habit) -> Result<bool, Infallible> {
    let mut habits = self.habits.write().await;
    match habits.get_mut(&habit.habit_id) {
      Some(slot) => {
        *slot = habit;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete_habit(&self, id: HabitId) -> Result<bool, Infallible> {
    Ok(self.habits.write().await.remove(&id).is_some())
  }
}
