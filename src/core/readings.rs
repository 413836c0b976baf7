//! Read-through cache of half-hourly readings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::{
    core::{
        half_hour,
        meter::MeterPoint,
        source::{ReadingsQuery, ReadingsSource},
    },
    prelude::*,
    quantity::energy::KilowattHours,
};

/// Number of readings requested on a cache miss.
pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ReadingsError {
    #[error("missing readings between {start_at} and {end_at}")]
    Missing { start_at: DateTime<Utc>, end_at: DateTime<Utc> },

    #[error("`{0}` is not aligned to a half-hour")]
    Misaligned(DateTime<Utc>),

    #[error(transparent)]
    Source(#[from] Error),
}

/// Convert [`ReadingsError::Missing`] into `None`, keeping the other errors.
pub fn missing_as_none<T>(result: Result<T, ReadingsError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ReadingsError::Missing { start_at, end_at }) => {
            debug!(%start_at, %end_at, "missing readings");
            Ok(None)
        }
        Err(error) => Err(error.into()),
    }
}

/// Cached readings of a single meter point in a single direction.
pub struct Readings<'a> {
    meter_point: &'a MeterPoint,

    /// Half-hours covered by completed fetches, including those without a reading.
    requested: BTreeSet<DateTime<Utc>>,

    values: BTreeMap<DateTime<Utc>, KilowattHours>,
}

impl<'a> Readings<'a> {
    #[must_use]
    pub const fn new(meter_point: &'a MeterPoint) -> Self {
        Self { meter_point, requested: BTreeSet::new(), values: BTreeMap::new() }
    }

    #[must_use]
    pub const fn meter_point(&self) -> &MeterPoint {
        self.meter_point
    }

    /// Get `duration` consecutive half-hourly readings starting at `start_at`.
    ///
    /// Fetches a whole page ending at the last requested half-hour when any of them
    /// has never been requested before.
    #[instrument(skip_all, fields(mpan = %self.meter_point.mpan, %start_at, duration))]
    pub fn get(
        &mut self,
        source: &impl ReadingsSource,
        start_at: DateTime<Utc>,
        duration: u32,
    ) -> Result<Vec<KilowattHours>, ReadingsError> {
        if !half_hour::is_aligned(&start_at) {
            return Err(ReadingsError::Misaligned(start_at));
        }
        if !half_hour::range(start_at, duration).all(|half_hour| self.requested.contains(&half_hour))
        {
            let offset = i64::from(PAGE_SIZE) - i64::from(duration);
            self.fetch(source, start_at - half_hour::half_hours(offset))?;
        }
        half_hour::range(start_at, duration)
            .map(|half_hour| self.values.get(&half_hour).copied())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ReadingsError::Missing {
                start_at,
                end_at: start_at + half_hour::half_hours(i64::from(duration)),
            })
    }

    fn fetch(&mut self, source: &impl ReadingsSource, start_at: DateTime<Utc>) -> Result {
        let meter_id = self
            .meter_point
            .meter_id()
            .with_context(|| format!("meter point `{}` has no meters", self.meter_point.mpan))?;
        debug!(%start_at, "fetching…");
        let query = ReadingsQuery::builder()
            .mpan(&self.meter_point.mpan)
            .meter_id(meter_id)
            .start_at(start_at)
            .first(PAGE_SIZE)
            .build();
        let readings = source
            .half_hourly_readings(&query)
            .with_context(|| format!("failed to fetch readings from {start_at}"))?;

        if let Some(last) = readings.last() {
            debug!(n_readings = readings.len(), first = %readings[0].start_at, last = %last.end_at, "received");
            self.requested.extend(half_hour::range_inclusive(start_at, last.start_at));
        } else {
            debug!("received no readings");
            self.requested.extend(half_hour::range(start_at, PAGE_SIZE));
        }
        self.values.extend(readings.into_iter().map(|reading| (reading.start_at, reading.value)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    use super::*;
    use crate::core::source::fake::{FailingSource, FakeSource};

    fn meter_point() -> MeterPoint {
        MeterPoint::new("1200000000000", "meter-1")
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_second_call_is_served_from_cache() -> Result {
        let mut source = FakeSource::default();
        source.fill(june(1), june(2), 0.25);
        source.put(june(2), NaiveTime::from_hms_opt(17, 0, 0).unwrap(), &[0.1, 0.2, 0.3]);
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        let values = readings.get(&source, at(2, 17, 0), 3)?;
        assert_eq!(values, vec![KilowattHours(0.1), KilowattHours(0.2), KilowattHours(0.3)]);
        assert_eq!(source.n_fetches(), 1);

        let subset = readings.get(&source, at(2, 17, 30), 2)?;
        assert_eq!(subset, values[1..]);
        let earlier = readings.get(&source, at(1, 12, 0), 1)?;
        assert_abs_diff_eq!(earlier[0].0, 0.25);
        assert_eq!(source.n_fetches(), 1);
        Ok(())
    }

    #[test]
    fn test_fetch_window_ends_at_last_requested_half_hour() -> Result {
        let mut source = FakeSource::default();
        source.fill(june(1), june(2), 0.25);
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        readings.get(&source, at(2, 17, 0), 2)?;
        // 98 half-hours before the start, so that 100 half-hours end at 17:30:
        assert_eq!(source.fetches.borrow()[0], at(2, 17, 0) - half_hour::half_hours(98));
        Ok(())
    }

    #[test]
    fn test_gap_is_confirmed_without_refetching() -> Result {
        let mut source = FakeSource::default();
        source.fill(june(1), june(2), 0.25);
        source.remove(at(2, 12, 0));
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        readings.get(&source, at(2, 17, 0), 1)?;
        assert_eq!(source.n_fetches(), 1);

        let result = readings.get(&source, at(2, 11, 30), 2);
        assert!(matches!(result, Err(ReadingsError::Missing { .. })));
        assert_eq!(source.n_fetches(), 1);
        Ok(())
    }

    #[test]
    fn test_empty_response_is_cached() {
        let source = FakeSource::default();
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        assert!(matches!(readings.get(&source, at(2, 17, 0), 2), Err(ReadingsError::Missing { .. })));
        assert!(matches!(readings.get(&source, at(1, 12, 0), 4), Err(ReadingsError::Missing { .. })));
        assert_eq!(source.n_fetches(), 1);
    }

    #[test]
    fn test_readings_beyond_last_returned_are_refetched() -> Result {
        let mut source = FakeSource::default();
        source.fill(june(1), june(1), 0.25);
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        // Nothing after the 1st of June yet, so the tail of the window is not confirmed:
        assert!(matches!(readings.get(&source, at(2, 8, 0), 1), Err(ReadingsError::Missing { .. })));
        source.fill(june(2), june(2), 0.5);
        assert_eq!(readings.get(&source, at(2, 8, 0), 1)?, vec![KilowattHours(0.5)]);
        assert_eq!(source.n_fetches(), 2);
        Ok(())
    }

    #[test]
    fn test_misaligned_start() {
        let source = FakeSource::default();
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);
        assert!(matches!(
            readings.get(&source, at(2, 17, 15), 1),
            Err(ReadingsError::Misaligned(_)),
        ));
        assert_eq!(source.n_fetches(), 0);
    }

    #[test]
    fn test_missing_as_none() -> Result {
        let missing: Result<(), ReadingsError> =
            Err(ReadingsError::Missing { start_at: at(2, 8, 0), end_at: at(2, 9, 0) });
        assert!(missing_as_none(missing)?.is_none());
        assert!(missing_as_none(Err::<(), _>(ReadingsError::Misaligned(at(2, 8, 0)))).is_err());
        Ok(())
    }

    #[test]
    fn test_source_error_is_not_missing() {
        let source = FailingSource::always();
        let meter_point = meter_point();
        let mut readings = Readings::new(&meter_point);

        let result = readings.get(&source, at(2, 8, 0), 2);
        assert!(matches!(result, Err(ReadingsError::Source(_))));

        // Nothing is marked as requested, so the failure is not cached as a gap:
        let result = missing_as_none(readings.get(&source, at(2, 8, 0), 2));
        assert!(format!("{:#}", result.err().unwrap()).contains("connection reset"));
    }
}
