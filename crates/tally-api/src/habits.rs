//! Handlers for `/habits` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/habits` | Newest first |
//! | `POST`   | `/habits` | Body: [`HabitAttributes`]; returns 201 + habit |
//! | `GET`    | `/habits/:id` | 404 if not found |
//! | `PATCH`  | `/habits/:id` | Body: [`HabitPatch`] |
//! | `DELETE` | `/habits/:id` | 204; completions are deleted with it |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use tally_core::{
  habit::{Habit, HabitAttributes, HabitPatch},
  store::HabitStore,
  tracker::Tracker,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /habits`
pub async fn list<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
) -> Result<Json<Vec<Habit>>, ApiError> {
  Ok(Json(tracker.list_habits().await?))
}

/// `POST /habits` — body: `{"name":"Read", "emoji":"📚", ...}`
pub async fn create<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Json(body): Json<HabitAttributes>,
) -> Result<impl IntoResponse, ApiError> {
  let habit = tracker.create_habit(body).await?;
  Ok((StatusCode::CREATED, Json(habit)))
}

/// `GET /habits/:id`
pub async fn get_one<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Habit>, ApiError> {
  Ok(Json(tracker.get_habit(id).await?))
}

/// `PATCH /habits/:id`
pub async fn update<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<HabitPatch>,
) -> Result<Json<Habit>, ApiError> {
  Ok(Json(tracker.update_habit(id, patch).await?))
}

/// `DELETE /habits/:id`
pub async fn delete_one<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  tracker.delete_habit(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
