//! Data models for memories and review statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::{CaptureContext, CaptureRequest};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f32 = 1.3;

/// Maximum ease factor allowed (also the starting value)
pub const MAX_EASE_FACTOR: f32 = 2.5;

/// Pin an ease factor to the allowed range
pub fn clamp_ease(value: f32) -> f32 {
    value.clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
}

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Front text is empty")]
    EmptyFront,

    #[error("Invalid rating value: {0} (expected 1-4)")]
    InvalidRating(u8),
}

/// Recall-quality rating applied during review
///
/// Persisted as its integer value (1-4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating as u8
    }
}

impl TryFrom<u8> for Rating {
    type Error = MemoryError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Rating::Again),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(MemoryError::InvalidRating(other)),
        }
    }
}

/// Lifecycle status of a memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryStatus {
    /// Participates in due selection
    Active,
    /// Kept but excluded from review
    Archived,
}

impl Default for MemoryStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Learning stage of a memory, derived from its scheduling state.
///
/// Not stored; reproduced from `review_count` and `last_rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryStage {
    /// Never reviewed
    New,
    /// First or second successful review
    Learning,
    /// Third review or later
    Mature,
    /// Last rating was "Again"
    Relapsed,
}

/// One flashcard: captured text plus spaced-repetition scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Millisecond-timestamp string; stable and creation-ordered
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Capture provenance, stored for display only
    #[serde(default)]
    pub context: CaptureContext,
    pub created_at: DateTime<Utc>,
    /// The record is due iff `next_review <= now`
    pub next_review: DateTime<Utc>,
    /// Growth multiplier for review intervals, kept in [1.3, 2.5]
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    /// Days until the next review; always >= 1
    #[serde(default = "default_interval")]
    pub interval: i32,
    /// Total number of rating events applied
    #[serde(default)]
    pub review_count: i32,
    /// Last rating applied, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rating: Option<Rating>,
    #[serde(default)]
    pub status: MemoryStatus,
}

fn default_ease_factor() -> f32 {
    MAX_EASE_FACTOR
}

fn default_interval() -> i32 {
    1
}

impl MemoryRecord {
    /// Build a fresh record from a capture request.
    ///
    /// Validates before anything can be persisted: fails if `front` is empty
    /// after trimming. Back text falls back to the capture's surrounding
    /// text, then to the front text itself. New records are immediately due.
    pub fn new(id: String, request: CaptureRequest, now: DateTime<Utc>) -> Result<Self, MemoryError> {
        let front = request.front.trim().to_string();
        if front.is_empty() {
            return Err(MemoryError::EmptyFront);
        }

        let back = request
            .back
            .filter(|b| !b.trim().is_empty())
            .or_else(|| request.context.surrounding_text.clone())
            .unwrap_or_else(|| front.clone());

        Ok(Self {
            id,
            front,
            back,
            tags: request.tags,
            context: request.context,
            created_at: now,
            next_review: now,
            ease_factor: MAX_EASE_FACTOR,
            interval: 1,
            review_count: 0,
            last_rating: None,
            status: MemoryStatus::Active,
        })
    }

    /// Check whether the memory is due for review
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }

    /// Derive the learning stage from the scheduling state
    pub fn stage(&self) -> MemoryStage {
        if self.review_count == 0 {
            MemoryStage::New
        } else if self.last_rating == Some(Rating::Again) {
            MemoryStage::Relapsed
        } else if self.review_count <= 2 {
            MemoryStage::Learning
        } else {
            MemoryStage::Mature
        }
    }
}

/// Running totals maintained across capture and review events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    /// Memories captured (decremented on delete, floored at zero)
    #[serde(default)]
    pub created: u64,
    /// Total rating events applied
    #[serde(default)]
    pub reviewed: u64,
    /// Incremented once per rating event, as the original tool counted it
    #[serde(default)]
    pub streak: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<DateTime<Utc>>,
}

/// Distribution of last ratings across a collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBreakdown {
    pub again: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
}

impl RatingBreakdown {
    /// Count each record's most recent rating
    pub fn tally(records: &[MemoryRecord]) -> Self {
        let mut breakdown = Self::default();
        for record in records {
            match record.last_rating {
                Some(Rating::Again) => breakdown.again += 1,
                Some(Rating::Hard) => breakdown.hard += 1,
                Some(Rating::Good) => breakdown.good += 1,
                Some(Rating::Easy) => breakdown.easy += 1,
                None => {}
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.again + self.hard + self.good + self.easy
    }
}

/// Point-in-time view over the whole collection, for the stats screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_memories: usize,
    pub due_memories: usize,
    pub new_memories: usize,
    pub learning_memories: usize,
    pub mature_memories: usize,
    pub relapsed_memories: usize,
    pub ratings: RatingBreakdown,
    pub aggregate: AggregateStats,
}
