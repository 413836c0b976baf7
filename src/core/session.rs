use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::calendar::{self, DayKind},
    quantity::points::PointsPerKilowattHour,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionKind {
    /// Reduce the usage to earn points.
    Saving { code: String, reward: PointsPerKilowattHour },

    /// Use as much as you like, the energy is free.
    FreeElectricity,
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub kind: SessionKind,
    pub start_at: DateTime<Utc>,

    /// Number of half-hours.
    pub duration: u32,
}

impl Session {
    pub fn saving(
        code: impl Into<String>,
        start_at: DateTime<Utc>,
        duration: u32,
        reward: PointsPerKilowattHour,
    ) -> Self {
        Self { kind: SessionKind::Saving { code: code.into(), reward }, start_at, duration }
    }

    pub const fn free_electricity(start_at: DateTime<Utc>, duration: u32) -> Self {
        Self { kind: SessionKind::FreeElectricity, start_at, duration }
    }

    #[must_use]
    pub const fn is_saving(&self) -> bool {
        matches!(self.kind, SessionKind::Saving { .. })
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match &self.kind {
            SessionKind::Saving { code, .. } => Some(code),
            SessionKind::FreeElectricity => None,
        }
    }

    /// Free electricity sessions never pay any points.
    #[must_use]
    pub const fn reward(&self) -> PointsPerKilowattHour {
        match self.kind {
            SessionKind::Saving { reward, .. } => reward,
            SessionKind::FreeElectricity => PointsPerKilowattHour(0),
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        calendar::local_date(self.start_at)
    }

    #[must_use]
    pub fn day_kind(&self) -> DayKind {
        DayKind::of(self.date())
    }
}

/// Dates of all the sessions, which make poor baseline days.
#[must_use]
pub fn session_days<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> HashSet<NaiveDate> {
    sessions.into_iter().map(Session::date).collect()
}

/// Catalog entry of a saving session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavingSessionRecord {
    pub code: String,
    pub start_at: DateTime<Utc>,
    pub duration: u32,
    pub reward_per_kwh: PointsPerKilowattHour,
}

impl From<&SavingSessionRecord> for Session {
    fn from(record: &SavingSessionRecord) -> Self {
        Self::saving(record.code.clone(), record.start_at, record.duration, record.reward_per_kwh)
    }
}

/// Catalog entry of a free electricity session.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct FreeSessionRecord {
    pub start_at: DateTime<Utc>,
    pub duration: u32,
}

impl From<&FreeSessionRecord> for Session {
    fn from(record: &FreeSessionRecord) -> Self {
        Self::free_electricity(record.start_at, record.duration)
    }
}
