//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by a [`Tracker`] over any
//! [`tally_core::store::HabitStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(tracker.clone()))
//! ```

pub mod completions;
pub mod error;
pub mod habits;
pub mod stats;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::{store::HabitStore, tracker::Tracker};

pub use error::ApiError;

/// Build a fully-materialised API router for `tracker`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(tracker: Arc<Tracker<S>>) -> Router<()>
where
  S: HabitStore + 'static,
{
  Router::new()
    // Habits
    .route("/habits", get(habits::list::<S>).post(habits::create::<S>))
    .route(
      "/habits/{id}",
      get(habits::get_one::<S>)
        .patch(habits::update::<S>)
        .delete(habits::delete_one::<S>),
    )
    // Completions
    .route("/habits/{id}/toggle", post(completions::toggle::<S>))
    .route("/habits/{id}/streak", get(completions::streak::<S>))
    .route(
      "/habits/{id}/completions/{date}",
      get(completions::get_completion::<S>),
    )
    // Statistics
    .route("/stats", get(stats::overview::<S>))
    .with_state(tracker)
}
