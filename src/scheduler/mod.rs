//! Review scheduling
//!
//! This module provides:
//! - The rating transition (SM-2-family interval and ease updates)
//! - Review session ordering (seeded shuffle over the due set)
//! - The scheduler service tying both to a persistent store

pub mod algorithm;
pub mod service;
pub mod session;

pub use algorithm::{apply_rating, format_interval, preview_intervals, MAX_INTERVAL_DAYS};
pub use service::{Scheduler, SchedulerError};
pub use session::ReviewSession;
