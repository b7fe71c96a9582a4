//! `GET /stats`: dashboard statistics across all habits.

use std::sync::Arc;

use axum::{Json, extract::State};
use tally_core::{stats::Overview, store::HabitStore, tracker::Tracker};

use crate::error::ApiError;

/// `GET /stats`
pub async fn overview<S: HabitStore>(
  State(tracker): State<Arc<Tracker<S>>>,
) -> Result<Json<Overview>, ApiError> {
  Ok(Json(tracker.overview().await?))
}
