//! Spaced-repetition flashcards with an Anki-style SM-2 scheduler.
//!
//! The core is two pure functions over [`ReviewRecord`]s:
//! [`Scheduler::advance`] applies one rating, [`summarize`] counts a
//! snapshot. [`Database`] persists records in SQLite for the CLI.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod stats;

pub use config::Config;
pub use db::Database;
pub use error::{Error, Result, Violation};
pub use models::{CardStatus, CollectionStats, Rating, ReviewRecord};
pub use scheduler::{format_interval, RatingPreview, Scheduler, SchedulerConfig};
pub use stats::summarize;
