use bon::Builder;
use chrono::{DateTime, Utc};

use crate::{core::meter::Reading, prelude::*};

/// Readings page request.
#[must_use]
#[derive(Builder)]
pub struct ReadingsQuery<'a> {
    pub mpan: &'a str,
    pub meter_id: &'a str,
    pub start_at: DateTime<Utc>,
    pub first: u32,
    pub before: Option<&'a str>,
}

/// External half-hourly readings provider.
pub trait ReadingsSource {
    /// Fetch up to `first` readings starting at `start_at` in chronological order.
    ///
    /// An empty vector means there are no readings in that range.
    fn half_hourly_readings(&self, query: &ReadingsQuery<'_>) -> Result<Vec<Reading>>;
}

#[cfg(test)]
pub mod fake {
    use std::{cell::RefCell, collections::BTreeMap};

    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::{core::half_hour, quantity::energy::KilowattHours};

    /// In-memory source that records the fetches made.
    #[derive(Default)]
    pub struct FakeSource {
        readings: BTreeMap<DateTime<Utc>, KilowattHours>,
        pub fetches: RefCell<Vec<DateTime<Utc>>>,
    }

    impl FakeSource {
        pub fn insert(&mut self, start_at: DateTime<Utc>, value: f64) {
            self.readings.insert(start_at, KilowattHours(value));
        }

        pub fn remove(&mut self, start_at: DateTime<Utc>) {
            self.readings.remove(&start_at);
        }

        /// Put the same value into every half-hour of the inclusive date range.
        pub fn fill(&mut self, from: NaiveDate, until: NaiveDate, value: f64) {
            let start = from.and_time(NaiveTime::MIN).and_utc();
            let end = until.and_hms_opt(23, 30, 0).unwrap().and_utc();
            for start_at in half_hour::range_inclusive(start, end) {
                self.insert(start_at, value);
            }
        }

        /// Put the values at consecutive half-hours starting at the time on the date.
        pub fn put(&mut self, on: NaiveDate, at: NaiveTime, values: &[f64]) {
            let start = on.and_time(at).and_utc();
            for (start_at, value) in half_hour::range(start, u32::try_from(values.len()).unwrap()).zip(values) {
                self.insert(start_at, *value);
            }
        }

        pub fn n_fetches(&self) -> usize {
            self.fetches.borrow().len()
        }
    }

    impl ReadingsSource for FakeSource {
        fn half_hourly_readings(&self, query: &ReadingsQuery<'_>) -> Result<Vec<Reading>> {
            self.fetches.borrow_mut().push(query.start_at);
            let end = query.start_at + half_hour::half_hours(i64::from(query.first));
            Ok(self
                .readings
                .range(query.start_at..end)
                .map(|(start_at, value)| Reading {
                    start_at: *start_at,
                    end_at: *start_at + half_hour::half_hours(1),
                    value: *value,
                })
                .collect())
        }
    }

    /// Fails every fetch starting before the cutoff and delegates the rest.
    pub struct FailingSource {
        pub inner: FakeSource,
        pub fails_before: DateTime<Utc>,
    }

    impl FailingSource {
        /// Source which fails every fetch.
        pub fn always() -> Self {
            Self { inner: FakeSource::default(), fails_before: DateTime::<Utc>::MAX_UTC }
        }
    }

    impl ReadingsSource for FailingSource {
        fn half_hourly_readings(&self, query: &ReadingsQuery<'_>) -> Result<Vec<Reading>> {
            if query.start_at < self.fails_before {
                bail!("connection reset");
            }
            self.inner.half_hourly_readings(query)
        }
    }
}
