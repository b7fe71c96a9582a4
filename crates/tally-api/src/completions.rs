//! Handlers for completion and streak endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/habits/:id/toggle` | Optional body: [`ToggleBody`]; returns the updated habit |
//! | `GET`  | `/habits/:id/streak` | `{current, longest, last_completed}` |
//! | `GET`  | `/habits/:id/completions/:date` | 404 if the day is not marked |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, State},
};
use serde::Deserialize;
use tally_core::{
  day::Moment,
  habit::{CompletionRecord, Habit},
  store::HabitStore,
  tracker::{StreakView, Tracker},
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ToggleBody {
  /// Day to toggle: `YYYY-MM-DD` or an RFC 3339 timestamp. Defaults to today
  /// in the server's reference time zone.
  #[serde(default)]
  pub date: Option<String>,
  /// Attached when marking; ignored when un-marking.
  #[serde(default)]
  pub note: Option<String>,
}

/// `POST /habits/:id/toggle` — body: `{"date":"2024-06-01","note":"..."}`
///
/// An empty body toggles today.
pub async fn toggle<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
  body: Bytes,
) -> Result<Json<Habit>, ApiError> {
  let body: ToggleBody = if body.iter().all(u8::is_ascii_whitespace) {
    ToggleBody::default()
  } else {
    serde_json::from_slice(&body)
      .map_err(|e| ApiError::BadRequest(format!("invalid toggle body: {e}")))?
  };
  let habit = tracker
    .toggle_completion(id, body.date.map(Moment::Text), body.note)
    .await?;
  Ok(Json(habit))
}

/// `GET /habits/:id/streak`
pub async fn streak<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StreakView>, ApiError> {
  Ok(Json(tracker.get_streak(id).await?))
}

/// `GET /habits/:id/completions/:date`
pub async fn get_completion<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path((id, date)): Path<(Uuid, String)>,
) -> Result<Json<CompletionRecord>, ApiError> {
  tracker
    .get_completion(id, Moment::Text(date.clone()))
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("no completion on {date}")))
}
