//! Memory record model
//!
//! A "memory" is one flashcard: a front/back text pair plus the scheduling
//! state the spaced-repetition algorithm reads and writes. This module owns
//! the record shape and its field invariants; all scheduling behavior lives
//! in [`crate::scheduler`].

pub mod models;

pub use models::{
    clamp_ease, AggregateStats, MemoryError, MemoryRecord, MemoryStage, MemoryStatus, Rating,
    RatingBreakdown, StatsSnapshot, MAX_EASE_FACTOR, MIN_EASE_FACTOR,
};
