//! Error types for `tally-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("unknown time zone: {0:?}")]
  UnknownTimeZone(String),

  #[error("invalid reminder time: {0:?}")]
  InvalidTime(String),

  #[error("habit name must not be empty")]
  EmptyName,

  #[error("habit name is longer than {max} characters")]
  NameTooLong { max: usize },

  #[error("note is longer than {max} characters")]
  NoteTooLong { max: usize },

  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::HabitNotFound(_)) }

  /// Malformed caller input, as opposed to a missing habit or a failing store.
  pub fn is_invalid_argument(&self) -> bool {
    matches!(
      self,
      Self::InvalidDate(_)
        | Self::UnknownTimeZone(_)
        | Self::InvalidTime(_)
        | Self::EmptyName
        | Self::NameTooLong { .. }
        | Self::NoteTooLong { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
