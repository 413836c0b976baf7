//! Settlement period arithmetic.

use chrono::{DateTime, TimeDelta, TimeZone};

/// Duration of the given number of settlement periods.
#[must_use]
pub fn half_hours(n: i64) -> TimeDelta {
    TimeDelta::minutes(30 * n)
}

#[must_use]
pub fn is_aligned<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> bool {
    timestamp.timestamp().rem_euclid(1800) == 0 && timestamp.timestamp_subsec_nanos() == 0
}

/// Iterate `n` consecutive settlement period starts beginning at `start`.
pub fn range<Tz>(start: DateTime<Tz>, n: u32) -> impl Iterator<Item = DateTime<Tz>>
where
    Tz: TimeZone,
    DateTime<Tz>: Copy,
{
    (0..i64::from(n)).map(move |index| start + half_hours(index))
}

/// Iterate settlement period starts from `start` up to and including `end`.
pub fn range_inclusive<Tz>(start: DateTime<Tz>, end: DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>>
where
    Tz: TimeZone,
    DateTime<Tz>: Copy,
{
    (0..)
        .map(move |index| start + half_hours(index))
        .take_while(move |timestamp| *timestamp <= end)
}
