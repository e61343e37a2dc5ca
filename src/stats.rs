//! Read-only statistics over tracked items.
//!
//! Calendar days are taken in the time zone of the `now` argument, so the CLI
//! passes local time and tests can pin everything to UTC.

use crate::dates::day_in;
use crate::types::TrackedItem;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Streak length at which an item's streak stops improving its score.
const STREAK_TARGET: f64 = 5.0;

/// Look-back window for "recent" activity.
const RECENT_DAYS: i64 = 30;

/// Difficulty from which an item counts as at risk.
const AT_RISK_DIFFICULTY: u8 = 4;

/// Widest heatmap the grid will build, about ten years.
pub const MAX_HEATMAP_WEEKS: u32 = 520;

fn round_half_up(value: f64) -> u32 {
    (value + 0.5).floor() as u32
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    round_half_up(count as f64 / total as f64 * 100.0)
}

/// Headline numbers for a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStats {
    pub total: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub average_difficulty: f64,
}

/// Review activity across the whole collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityStats {
    /// Sum of every item's review count
    pub total_reviews: u64,
    /// Items last reviewed within the past 30 days
    pub recent_reviews: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Items due at or before `now`.
pub fn overdue<'a, Tz: TimeZone>(items: &'a [TrackedItem], now: &DateTime<Tz>) -> Vec<&'a TrackedItem> {
    let now = now.with_timezone(&Utc);
    items.iter().filter(|item| item.is_due(now)).collect()
}

/// Items whose due date falls on today's calendar day.
pub fn due_today<'a, Tz: TimeZone>(items: &'a [TrackedItem], now: &DateTime<Tz>) -> Vec<&'a TrackedItem> {
    let today = now.date_naive();
    let tz = now.timezone();
    items
        .iter()
        .filter(|item| day_in(item.next_review, &tz) == today)
        .collect()
}

/// Mean difficulty, 0 for an empty slice.
pub fn average_difficulty(items: &[TrackedItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let sum: u64 = items.iter().map(|item| u64::from(item.difficulty)).sum();
    sum as f64 / items.len() as f64
}

/// Summary counts used by list headers.
pub fn summary<Tz: TimeZone>(items: &[TrackedItem], now: &DateTime<Tz>) -> CollectionStats {
    CollectionStats {
        total: items.len(),
        overdue: overdue(items, now).len(),
        due_today: due_today(items, now).len(),
        average_difficulty: average_difficulty(items),
    }
}

/// Distinct calendar days on which some item was last reviewed.
pub fn activity_days<Tz: TimeZone>(items: &[TrackedItem], tz: &Tz) -> BTreeSet<NaiveDate> {
    items.iter().map(|item| day_in(item.last_reviewed, tz)).collect()
}

/// Consecutive active days ending today, or yesterday if today is still empty.
pub fn current_streak<Tz: TimeZone>(items: &[TrackedItem], now: &DateTime<Tz>) -> u32 {
    let days = activity_days(items, &now.timezone());
    let today = now.date_naive();

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive active days in the whole history.
pub fn longest_streak<Tz: TimeZone>(items: &[TrackedItem], tz: &Tz) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for day in activity_days(items, tz) {
        run = match prev {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }
    longest
}

/// Activity totals and streaks.
pub fn activity<Tz: TimeZone>(items: &[TrackedItem], now: &DateTime<Tz>) -> ActivityStats {
    let since = now.with_timezone(&Utc) - Duration::days(RECENT_DAYS);

    ActivityStats {
        total_reviews: items.iter().map(|item| u64::from(item.review_count)).sum(),
        recent_reviews: items.iter().filter(|item| item.last_reviewed >= since).count(),
        current_streak: current_streak(items, now),
        longest_streak: longest_streak(items, &now.timezone()),
    }
}

/// Display heuristic: longer streaks and lower difficulty score higher.
///
/// Returns a whole percentage, 0 for an empty slice.
pub fn success_rate(items: &[TrackedItem]) -> u32 {
    if items.is_empty() {
        return 0;
    }

    let total: f64 = items
        .iter()
        .map(|item| {
            let streak = (f64::from(item.streak_count) / STREAK_TARGET).min(1.0);
            let ease = (6.0 - f64::from(item.difficulty)) / 5.0;
            0.6 * streak + 0.4 * ease
        })
        .sum();

    round_half_up(100.0 * total / items.len() as f64)
}

/// Maturity class of an item, by interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaturityLevel {
    New,
    Learning,
    Mature,
}

impl MaturityLevel {
    pub fn of(interval: u32) -> Self {
        match interval {
            0..=3 => MaturityLevel::New,
            4..=14 => MaturityLevel::Learning,
            _ => MaturityLevel::Mature,
        }
    }
}

/// Count and share of one maturity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bucket {
    pub count: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Maturity {
    pub new: Bucket,
    pub learning: Bucket,
    pub mature: Bucket,
}

/// Partition items into new, learning and mature.
pub fn maturity(items: &[TrackedItem]) -> Maturity {
    let (mut new, mut learning, mut mature) = (0, 0, 0);
    for item in items {
        match MaturityLevel::of(item.interval) {
            MaturityLevel::New => new += 1,
            MaturityLevel::Learning => learning += 1,
            MaturityLevel::Mature => mature += 1,
        }
    }

    let total = items.len();
    let bucket = |count| Bucket {
        count,
        percent: percent(count, total),
    };

    Maturity {
        new: bucket(new),
        learning: bucket(learning),
        mature: bucket(mature),
    }
}

/// Number of items due on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub count: usize,
}

/// Items due on each of the next `days` calendar days, starting today.
pub fn forecast<Tz: TimeZone>(items: &[TrackedItem], now: &DateTime<Tz>, days: u32) -> Vec<ForecastDay> {
    let tz = now.timezone();
    let mut due: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for item in items {
        *due.entry(day_in(item.next_review, &tz)).or_default() += 1;
    }

    now.date_naive()
        .iter_days()
        .take(days as usize)
        .map(|date| ForecastDay {
            date,
            count: due.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Items whose due day is strictly before today's calendar day.
///
/// Unlike [`overdue`], an item due earlier today does not count.
pub fn overdue_before_today<'a, Tz: TimeZone>(items: &'a [TrackedItem], now: &DateTime<Tz>) -> Vec<&'a TrackedItem> {
    let today = now.date_naive();
    let tz = now.timezone();
    items
        .iter()
        .filter(|item| day_in(item.next_review, &tz) < today)
        .collect()
}

/// One day of the week calendar and the items due on it.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub items: Vec<&'a TrackedItem>,
}

/// Seven consecutive days starting `week_offset` weeks from today.
///
/// The week starts on today's weekday, not on a fixed weekday. Offsets that
/// run past chrono's date range stop at its first or last day.
pub fn week_calendar<'a, Tz: TimeZone>(
    items: &'a [TrackedItem],
    now: &DateTime<Tz>,
    week_offset: i32,
) -> Vec<CalendarDay<'a>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let shift = Duration::days(i64::from(week_offset) * 7);
    let start = today.checked_add_signed(shift).unwrap_or(if week_offset < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    });

    let mut due: BTreeMap<NaiveDate, Vec<&TrackedItem>> = BTreeMap::new();
    for item in items {
        due.entry(day_in(item.next_review, &tz)).or_default().push(item);
    }

    start
        .iter_days()
        .take(7)
        .map(|date| CalendarDay {
            date,
            items: due.remove(&date).unwrap_or_default(),
        })
        .collect()
}

/// Items that struggle: hard ratings or a streak broken after reviews.
///
/// Hardest first, at most `limit`.
pub fn at_risk(items: &[TrackedItem], limit: usize) -> Vec<&TrackedItem> {
    let mut risky: Vec<&TrackedItem> = items
        .iter()
        .filter(|item| {
            item.difficulty >= AT_RISK_DIFFICULTY || (item.streak_count == 0 && item.review_count > 0)
        })
        .collect();
    risky.sort_by(|a, b| b.difficulty.cmp(&a.difficulty));
    risky.truncate(limit);
    risky
}

/// One day of the activity heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatCell {
    pub date: NaiveDate,
    pub count: usize,
    /// Intensity 0..=4, in quarters of the busiest day
    pub level: u8,
}

fn heat_level(count: usize, max: usize) -> u8 {
    let max = max as f64;
    let count_f = count as f64;
    if count == 0 {
        0
    } else if count_f <= max * 0.25 {
        1
    } else if count_f <= max * 0.5 {
        2
    } else if count_f <= max * 0.75 {
        3
    } else {
        4
    }
}

/// Weeks of review activity, Sunday first, ending with the current week.
///
/// At most [`MAX_HEATMAP_WEEKS`] weeks are built.
pub fn heatmap<Tz: TimeZone>(items: &[TrackedItem], now: &DateTime<Tz>, weeks: u32) -> Vec<Vec<HeatCell>> {
    let tz = now.timezone();
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(day_in(item.last_reviewed, &tz)).or_default() += 1;
    }
    let max = counts.values().copied().max().unwrap_or(0).max(1);

    let weeks = weeks.min(MAX_HEATMAP_WEEKS);
    let today = now.date_naive();
    let this_sunday = today
        .checked_sub_signed(Duration::days(i64::from(today.weekday().num_days_from_sunday())))
        .unwrap_or(NaiveDate::MIN);
    let start = this_sunday
        .checked_sub_signed(Duration::weeks(i64::from(weeks.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);

    start
        .iter_days()
        .take(weeks as usize * 7)
        .collect::<Vec<_>>()
        .chunks(7)
        .map(|week| {
            week.iter()
                .map(|&date| {
                    let count = counts.get(&date).copied().unwrap_or(0);
                    HeatCell {
                        date,
                        count,
                        level: heat_level(count, max),
                    }
                })
                .collect()
        })
        .collect()
}
