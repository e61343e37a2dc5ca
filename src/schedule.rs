//! Scheduling engine: turns a review outcome into new scheduling fields.
//!
//! Everything here is pure. The store hands in the current fields and the
//! clock; nothing is read from or written to disk.

use crate::dates::add_days;
use crate::types::{ItemRecord, MAX_DIFFICULTY, MIN_DIFFICULTY, Outcome};
use chrono::{DateTime, Utc};

const HARD_FACTOR: f64 = 0.8;
const GOOD_FACTOR: f64 = 1.5;
const EASY_FACTOR: f64 = 2.0;

/// The scheduling-relevant fields of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub last_reviewed: DateTime<Utc>,
    pub next_review: DateTime<Utc>,
    pub interval: u32,
    pub difficulty: u8,
    pub review_count: u32,
    pub streak_count: u32,
}

impl From<&ItemRecord> for ScheduleState {
    fn from(record: &ItemRecord) -> Self {
        Self {
            last_reviewed: record.last_reviewed,
            next_review: record.next_review,
            interval: record.interval,
            difficulty: record.difficulty,
            review_count: record.review_count,
            streak_count: record.streak_count,
        }
    }
}

impl ScheduleState {
    /// Write these fields back into a stored record.
    pub fn write_to(&self, record: &mut ItemRecord) {
        record.last_reviewed = self.last_reviewed;
        record.next_review = self.next_review;
        record.interval = self.interval;
        record.difficulty = self.difficulty;
        record.review_count = self.review_count;
        record.streak_count = self.streak_count;
    }
}

/// Round half up, saturating into `u32`.
fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor() as u32
}

/// Interval after a successful review of the given quality.
///
/// `Again` always restarts at one day. `Postpone` leaves the interval alone.
pub fn next_interval(interval: u32, outcome: Outcome) -> u32 {
    let interval = interval.max(1);
    let scaled = |factor: f64| round_half_up(f64::from(interval) * factor);

    match outcome {
        Outcome::Postpone => interval,
        Outcome::Again => 1,
        Outcome::Hard => scaled(HARD_FACTOR).max(1),
        Outcome::Good => interval.saturating_add(1).max(scaled(GOOD_FACTOR)),
        Outcome::Easy => interval.saturating_add(2).max(scaled(EASY_FACTOR)),
    }
}

/// Difficulty after a review: harder on `Again`, easier on `Easy`.
pub fn next_difficulty(difficulty: u8, outcome: Outcome) -> u8 {
    let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    match outcome {
        Outcome::Again => (difficulty + 1).min(MAX_DIFFICULTY),
        Outcome::Easy => (difficulty - 1).max(MIN_DIFFICULTY),
        Outcome::Hard | Outcome::Good | Outcome::Postpone => difficulty,
    }
}

/// Apply `outcome` at `now` and return the updated fields.
pub fn apply(state: &ScheduleState, outcome: Outcome, now: DateTime<Utc>) -> ScheduleState {
    if outcome == Outcome::Postpone {
        return ScheduleState {
            next_review: add_days(now, 1),
            ..*state
        };
    }

    let interval = next_interval(state.interval, outcome);
    let streak_count = match outcome {
        Outcome::Again => 0,
        _ => state.streak_count.saturating_add(1),
    };

    ScheduleState {
        last_reviewed: now,
        next_review: add_days(now, interval),
        interval,
        difficulty: next_difficulty(state.difficulty, outcome),
        review_count: state.review_count.saturating_add(1),
        streak_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn added() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap()
    }

    fn state(interval: u32, difficulty: u8, streak: u32) -> ScheduleState {
        ScheduleState {
            last_reviewed: added(),
            next_review: add_days(added(), interval),
            interval,
            difficulty,
            review_count: 4,
            streak_count: streak,
        }
    }

    #[test]
    fn test_hard_shrinks_interval() {
        let next = apply(&state(4, 3, 2), Outcome::Hard, now());
        assert_eq!(next.interval, 3);
        assert_eq!(next.difficulty, 3);
        assert_eq!(next.streak_count, 3);
    }

    #[test]
    fn test_hard_never_below_one() {
        assert_eq!(next_interval(1, Outcome::Hard), 1);
        assert_eq!(next_interval(2, Outcome::Hard), 2);
    }

    #[test]
    fn test_good_grows_interval() {
        assert_eq!(next_interval(4, Outcome::Good), 6);
        assert_eq!(next_interval(1, Outcome::Good), 2);
        assert_eq!(next_interval(2, Outcome::Good), 3);
        assert_eq!(next_interval(3, Outcome::Good), 5);
    }

    #[test]
    fn test_easy_grows_interval_and_lowers_difficulty() {
        let next = apply(&state(1, 4, 0), Outcome::Easy, now());
        assert_eq!(next.interval, 3);
        assert_eq!(next.difficulty, 3);
        assert_eq!(next.streak_count, 1);

        assert_eq!(next_interval(10, Outcome::Easy), 20);
        assert_eq!(next_difficulty(1, Outcome::Easy), 1);
    }

    #[test]
    fn test_again_resets() {
        let next = apply(&state(30, 5, 9), Outcome::Again, now());
        assert_eq!(next.interval, 1);
        assert_eq!(next.difficulty, 5);
        assert_eq!(next.streak_count, 0);
        assert_eq!(next.next_review, add_days(now(), 1));

        assert_eq!(next_difficulty(3, Outcome::Again), 4);
    }

    #[test]
    fn test_review_updates_timestamps_and_count() {
        let next = apply(&state(4, 3, 0), Outcome::Good, now());
        assert_eq!(next.last_reviewed, now());
        assert_eq!(next.next_review, add_days(now(), 6));
        assert_eq!(next.review_count, 5);
    }

    #[test]
    fn test_postpone_only_moves_next_review() {
        let before = state(8, 2, 5);
        let next = apply(&before, Outcome::Postpone, now());
        assert_eq!(next.next_review, add_days(now(), 1));
        assert_eq!(next.last_reviewed, before.last_reviewed);
        assert_eq!(next.interval, before.interval);
        assert_eq!(next.difficulty, before.difficulty);
        assert_eq!(next.review_count, before.review_count);
        assert_eq!(next.streak_count, before.streak_count);
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 5 * 1.5 = 7.5 -> 8
        assert_eq!(next_interval(5, Outcome::Good), 8);
        // 3 * 0.8 = 2.4 -> 2
        assert_eq!(next_interval(3, Outcome::Hard), 2);
        // 13 * 0.8 = 10.4 -> 10
        assert_eq!(next_interval(13, Outcome::Hard), 10);
    }

    #[test]
    fn test_invariants_hold_for_all_outcomes() {
        for interval in [1, 2, 3, 7, 21, 365] {
            for difficulty in 1..=5 {
                for outcome in Outcome::ALL {
                    let next = apply(&state(interval, difficulty, 2), outcome, now());
                    assert!(next.interval >= 1);
                    assert!((1..=5).contains(&next.difficulty));
                    assert!(next.next_review >= next.last_reviewed);
                }
            }
        }
    }

    #[test]
    fn test_huge_interval_saturates() {
        assert_eq!(next_interval(u32::MAX, Outcome::Easy), u32::MAX);
        assert_eq!(next_interval(u32::MAX, Outcome::Good), u32::MAX);
    }

    #[test]
    fn test_write_to_record() {
        let mut record = ItemRecord::enroll("a.md", 4, added());
        let next = apply(&ScheduleState::from(&record), Outcome::Good, now());
        next.write_to(&mut record);
        assert_eq!(record.interval, 6);
        assert_eq!(record.review_count, 1);
        assert_eq!(record.date_added, added());
    }
}
