use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::quantity::energy::KilowattHours;

/// Electricity supply point.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct MeterPoint {
    pub mpan: String,

    /// Physical meters, at least one.
    pub meters: Vec<Meter>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Meter {
    pub id: String,
}

impl MeterPoint {
    #[cfg(test)]
    pub fn new(mpan: impl Into<String>, meter_id: impl Into<String>) -> Self {
        Self { mpan: mpan.into(), meters: vec![Meter { id: meter_id.into() }] }
    }

    /// The meter whose readings are used.
    #[must_use]
    pub fn meter_id(&self) -> Option<&str> {
        self.meters.first().map(|meter| meter.id.as_str())
    }
}

/// Single settlement period reading.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reading {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub value: KilowattHours,
}
