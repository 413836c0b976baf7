//! Weekday and weekend classification for baseline day selection.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::{Europe::London, Tz};

/// The calendar the bank holidays and the weekdays are defined in.
pub const TIMEZONE: Tz = London;

/// England & Wales bank holidays, as `(year, month, day)`.
const BANK_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2024, 12, 25),
    (2024, 12, 26),
    (2025, 1, 1),
    (2025, 4, 18),
    (2025, 4, 21),
    (2025, 5, 5),
    (2025, 5, 26),
    (2025, 8, 25),
    (2025, 12, 25),
    (2025, 12, 26),
    (2026, 1, 1),
    (2026, 4, 3),
    (2026, 4, 6),
    (2026, 5, 4),
    (2026, 5, 25),
    (2026, 8, 31),
    (2026, 12, 25),
    (2026, 12, 28),
];

/// Calendar date of the timestamp in [`TIMEZONE`].
#[must_use]
pub fn local_date(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.with_timezone(&TIMEZONE).date_naive()
}

#[must_use]
pub fn is_bank_holiday(date: NaiveDate) -> bool {
    BANK_HOLIDAYS
        .iter()
        .any(|&(year, month, day)| (date.year(), date.month(), date.day()) == (year, month, day))
}

/// Monday to Friday, bank holidays excluded.
#[must_use]
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_bank_holiday(date)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DayKind {
    Weekday,
    Weekend,
}

impl DayKind {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        if is_weekday(date) { Self::Weekday } else { Self::Weekend }
    }

    /// Number of comparable days the baseline is built from.
    #[must_use]
    pub const fn required_days(self) -> usize {
        match self {
            Self::Weekday => 10,
            Self::Weekend => 4,
        }
    }
}
