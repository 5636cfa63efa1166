//! Spaced-repetition rating transition
//!
//! SM-2-family algorithm over a four-value rating scale:
//! - 1 Again: failed recall — the memory relapses to a 1-day interval
//! - 2 Hard: recalled with difficulty — ease drops by 0.15
//! - 3 Good: recalled — ease unchanged
//! - 4 Easy: recalled effortlessly — ease grows by 0.15
//!
//! Interval growth bootstraps through 1 day, then 3 days, and only from the
//! third successful review onward multiplies by the ease factor. This keeps a
//! single multiplication from blowing up the interval of a young memory,
//! while "Again" resets growth entirely so one lucky recall can't buy a
//! long deferral.

use chrono::{DateTime, Duration, Utc};

use crate::memory::{clamp_ease, MemoryRecord, Rating};

/// Ease penalty applied on a failed recall
const EASE_PENALTY_AGAIN: f32 = 0.2;

/// Ease adjustment step for Hard (down) and Easy (up)
const EASE_STEP: f32 = 0.15;

/// Ceiling for interval growth (~100 years). Repeated successful reviews
/// multiply the interval without ever shrinking it, so an uncapped interval
/// eventually overflows date arithmetic.
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

/// Apply a rating to a record, producing its next scheduling state.
///
/// Pure: reads `record`, returns the updated copy; persistence is the
/// caller's concern. `review_count` grows by exactly one, the ease factor
/// is clamped to [1.3, 2.5] after every adjustment, and the interval is
/// capped at [`MAX_INTERVAL_DAYS`].
pub fn apply_rating(record: &MemoryRecord, rating: Rating, now: DateTime<Utc>) -> MemoryRecord {
    let mut updated = record.clone();
    updated.review_count = record.review_count + 1;
    updated.last_rating = Some(rating);

    if rating == Rating::Again {
        // Full relapse: back to a 1-day interval regardless of history
        updated.interval = 1;
        updated.ease_factor = clamp_ease(record.ease_factor - EASE_PENALTY_AGAIN);
    } else {
        updated.interval = match updated.review_count {
            1 => 1,
            2 => 3,
            // Rounds half away from zero (f32::round); intervals are always
            // whole days, so the rule matters for long-term drift only.
            _ => ((record.interval as f32 * record.ease_factor).round() as i32)
                .min(MAX_INTERVAL_DAYS),
        };

        updated.ease_factor = match rating {
            Rating::Hard => clamp_ease(record.ease_factor - EASE_STEP),
            Rating::Easy => clamp_ease(record.ease_factor + EASE_STEP),
            _ => record.ease_factor,
        };
    }

    updated.next_review = now + Duration::days(updated.interval as i64);
    updated
}

/// Interval each rating would produce, in rating order (Again, Hard, Good,
/// Easy). Used to label rating choices before the user commits.
pub fn preview_intervals(record: &MemoryRecord) -> [i32; 4] {
    let now = Utc::now();
    Rating::ALL.map(|rating| apply_rating(record, rating, now).interval)
}

/// Format a day count as a short human-readable interval
pub fn format_interval(days: i32) -> String {
    match days {
        0 => "now".to_string(),
        d if d < 7 => format!("{}d", d),
        d if d < 30 => format!("{}w", d / 7),
        d if d < 365 => format!("{}mo", d / 30),
        d => format!("{}y", d / 365),
    }
}
