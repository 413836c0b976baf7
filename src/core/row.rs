//! Flat records of the completed calculations.

use std::iter::Sum;

use chrono_tz::Tz;
use serde::Serialize;

use crate::{
    core::calculation::Calculation,
    quantity::{currency::Pounds, energy::KilowattHours, points::Points},
};

pub const SESSION_FORMAT: &str = "%Y/%m/%d %H:%M";

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct FreeRow {
    pub session: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub free: Option<KilowattHours>,
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct SavingRow {
    pub session: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Points>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings: Option<Pounds>,
}

#[must_use]
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Row {
    Saving(SavingRow),
    Free(FreeRow),
}

/// Per-session totals for storage.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_import: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_export: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_import: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_export: Option<KilowattHours>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Points>,
}

fn total<V: Copy + Sum>(values: Option<&Vec<V>>) -> Option<V> {
    values.map(|values| values.iter().copied().sum())
}

impl Calculation {
    /// Session start in the display timezone.
    #[must_use]
    pub fn session_label(&self, timezone: Tz) -> String {
        self.session.start_at.with_timezone(&timezone).format(SESSION_FORMAT).to_string()
    }

    pub fn row(&self, timezone: Tz) -> Row {
        if self.session.is_saving() {
            Row::Saving(self.saving_row(timezone))
        } else {
            Row::Free(self.free_row(timezone))
        }
    }

    pub fn free_row(&self, timezone: Tz) -> FreeRow {
        FreeRow {
            session: self.session_label(timezone),
            import: total(self.session_import.as_ref()),
            baseline: total(self.baseline.as_ref()),
            free: total(self.kwh.as_ref()),
        }
    }

    pub fn saving_row(&self, timezone: Tz) -> SavingRow {
        let reward = self.kwh.as_ref().and(total(self.points.as_ref()));
        SavingRow {
            session: self.session_label(timezone),
            import: total(self.session_import.as_ref()),
            export: total(self.session_export.as_ref()),
            baseline: total(self.baseline.as_ref()),
            saved: total(self.kwh.as_ref()),
            reward,
            earnings: reward.map(Pounds::from),
        }
    }

    /// Totals of a saving session, `None` for free electricity.
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        let statistic = self.statistic();
        Some(Summary {
            code: self.session.code()?.to_string(),
            session_import: total(self.session_import.as_ref()),
            session_export: total(self.session_export.as_ref()),
            baseline_import: total(statistic.reduce(&self.baseline_import).as_ref()),
            baseline_export: total(statistic.reduce(&self.baseline_export).as_ref()),
            points: total(self.points.as_ref()),
        })
    }
}
