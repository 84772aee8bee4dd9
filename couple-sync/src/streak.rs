//! Consecutive-day note streak.

use chrono::{DateTime, Duration, Utc};
use couple_types::Streak;

/// Recomputes the streak for a note saved at `now`.
///
/// Less than a day since the last note keeps the count, one to two days
/// extends it, anything longer starts over.
pub fn apply_note_update(existing: &Streak, now: DateTime<Utc>) -> Streak {
    let streak_count = match existing.last_note_at {
        None => 1,
        Some(last) => {
            let delta = now - last;
            if delta < Duration::hours(24) {
                existing.streak_count.max(1)
            } else if delta < Duration::hours(48) {
                existing.streak_count.saturating_add(1)
            } else {
                1
            }
        }
    };
    Streak {
        streak_count,
        longest_streak: existing.longest_streak.max(streak_count),
        last_note_at: Some(now),
    }
}
