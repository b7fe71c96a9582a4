//! Core types and the completion & streak engine for Tally.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! streak math in [`streak`] and the [`toggle`] transition are pure functions
//! over owned values; all mutation goes through a [`store::HabitStore`], which
//! the [`tracker::Tracker`] serialises per habit.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod day;
pub mod error;
pub mod habit;
pub mod memory;
pub mod stats;
pub mod store;
pub mod streak;
pub mod toggle;
pub mod tracker;

pub use error::{Error, Result};
