//! Selection of the days the baseline is computed from.

use std::collections::HashSet;

use bon::Builder;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

use crate::core::calendar::{DayKind, TIMEZONE};

/// How many days before the session the candidates may go.
pub const LOOKBACK_DAYS: u64 = 61;

#[must_use]
#[derive(Builder)]
pub struct BaselineDays<'a> {
    /// Session start, the candidates start at the same time of day.
    start_at: DateTime<Utc>,

    day_kind: DayKind,

    /// Days of known sessions.
    excluded: &'a HashSet<NaiveDate>,
}

impl BaselineDays<'_> {
    #[must_use]
    pub const fn required_days(&self) -> usize {
        self.day_kind.required_days()
    }

    /// Qualifying days, nearest first.
    ///
    /// Days are counted on the local calendar, so the candidates keep the local time of day
    /// across the daylight saving changes. A local time skipped by the clock change is no candidate.
    ///
    /// The caller may skip some of them, for example, because of missing readings,
    /// so the sequence is not limited by [`BaselineDays::required_days`].
    pub fn candidates(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        let local_start = self.start_at.with_timezone(&TIMEZONE).naive_local();
        (1..=LOOKBACK_DAYS)
            .filter_map(move |n_days| local_start.checked_sub_days(Days::new(n_days)))
            .filter(|candidate| DayKind::of(candidate.date()) == self.day_kind)
            .filter(|candidate| !self.excluded.contains(&candidate.date()))
            .filter_map(|candidate| TIMEZONE.from_local_datetime(&candidate).earliest())
            .map(|candidate| candidate.with_timezone(&Utc))
    }

    /// The first [`BaselineDays::required_days`] candidates.
    pub fn select(&self) -> Vec<DateTime<Utc>> {
        self.candidates().take(self.required_days()).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;
    use crate::core::calendar;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    #[test]
    fn test_weekday_selects_ten_nearest() {
        let start_at = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let excluded = HashSet::new();
        let days = BaselineDays::builder()
            .start_at(start_at)
            .day_kind(DayKind::Weekday)
            .excluded(&excluded)
            .build()
            .select();
        let dates: Vec<_> = days.iter().map(DateTime::date_naive).collect();
        assert_eq!(
            dates,
            vec![
                date(5, 30),
                date(5, 29),
                date(5, 28),
                date(5, 27),
                // 26th of May is the Spring bank holiday.
                date(5, 23),
                date(5, 22),
                date(5, 21),
                date(5, 20),
                date(5, 19),
                date(5, 16),
            ],
        );
        assert!(days.iter().all(|day| day.time() == start_at.time()));
    }

    #[test]
    fn test_weekend_includes_bank_holiday() {
        let excluded = HashSet::new();
        let days = BaselineDays::builder()
            .start_at(Utc.with_ymd_and_hms(2025, 6, 7, 12, 0, 0).unwrap())
            .day_kind(DayKind::Weekend)
            .excluded(&excluded)
            .build()
            .select();
        let dates: Vec<_> = days.iter().map(DateTime::date_naive).collect();
        assert_eq!(dates, vec![date(6, 1), date(5, 31), date(5, 26), date(5, 25)]);
    }

    #[test]
    fn test_excluded_days_are_skipped() {
        let excluded = HashSet::from([date(5, 30), date(5, 28)]);
        let days = BaselineDays::builder()
            .start_at(Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap())
            .day_kind(DayKind::Weekday)
            .excluded(&excluded)
            .build()
            .select();
        assert_eq!(days.len(), 10);
        assert!(days.iter().all(|day| !excluded.contains(&day.date_naive())));
        assert_eq!(days[0].date_naive(), date(5, 29));
    }

    #[test]
    fn test_fewer_candidates_than_required() {
        let start_at = Utc.with_ymd_and_hms(2025, 6, 7, 12, 0, 0).unwrap();
        let keep = [date(5, 31), date(5, 10), date(4, 13)];
        // Exclude every weekend day in the window but three:
        let excluded: HashSet<_> = (1..=LOOKBACK_DAYS)
            .map(|n_days| start_at.date_naive().checked_sub_days(Days::new(n_days)).unwrap())
            .filter(|day| DayKind::of(*day) == DayKind::Weekend && !keep.contains(day))
            .collect();
        let days = BaselineDays::builder()
            .start_at(start_at)
            .day_kind(DayKind::Weekend)
            .excluded(&excluded)
            .build()
            .select();
        let dates: Vec<_> = days.iter().map(DateTime::date_naive).collect();
        assert_eq!(dates, keep);
    }

    #[test]
    fn test_local_midnight_is_weekend() {
        // Saturday 00:30 in London is still Friday in UTC:
        let start_at = Utc.with_ymd_and_hms(2025, 6, 6, 23, 30, 0).unwrap();
        let excluded = HashSet::new();
        let days = BaselineDays::builder()
            .start_at(start_at)
            .day_kind(DayKind::of(calendar::local_date(start_at)))
            .excluded(&excluded)
            .build();
        assert_eq!(days.required_days(), 4);
        let dates: Vec<_> = days.select().into_iter().map(calendar::local_date).collect();
        assert_eq!(dates, vec![date(6, 1), date(5, 31), date(5, 26), date(5, 25)]);
    }

    #[test]
    fn test_candidates_keep_local_time_across_clock_change() {
        // 18:00 BST on the 2nd of April is 17:00 UTC, but 18:00 GMT in March:
        let excluded = HashSet::new();
        let days = BaselineDays::builder()
            .start_at(Utc.with_ymd_and_hms(2025, 4, 2, 17, 0, 0).unwrap())
            .day_kind(DayKind::Weekday)
            .excluded(&excluded)
            .build()
            .select();
        assert_eq!(days[0], Utc.with_ymd_and_hms(2025, 4, 1, 17, 0, 0).unwrap());
        assert_eq!(days[3], Utc.with_ymd_and_hms(2025, 3, 27, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_window_is_bounded() {
        let start_at = Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let excluded = HashSet::new();
        let days = BaselineDays::builder()
            .start_at(start_at)
            .day_kind(DayKind::Weekday)
            .excluded(&excluded)
            .build();
        let candidates: Vec<_> = days.candidates().collect();
        let oldest = candidates.last().unwrap().date_naive();
        assert!(oldest >= start_at.date_naive() - Days::new(LOOKBACK_DAYS));
        assert!(candidates.iter().all(|day| day.date_naive() < start_at.date_naive()));
        assert!(candidates.iter().all(|day| day.weekday().number_from_monday() <= 5));
    }
}
