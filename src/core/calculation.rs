//! Savings of a single session for a single household.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    core::{
        baseline::BaselineDays,
        calendar::DayKind,
        progress::{Progress, Step},
        readings::{Readings, missing_as_none},
        series::Statistic,
        session::{Session, session_days},
        source::ReadingsSource,
    },
    prelude::*,
    quantity::{energy::KilowattHours, points::Points},
};

/// Accumulated state of a session evaluation.
///
/// Every derived field stays `None` when the readings needed for it are missing.
#[must_use]
pub struct Calculation {
    pub session: Session,
    pub day_kind: DayKind,

    /// Days of the known sessions.
    pub excluded: HashSet<NaiveDate>,

    pub session_import: Option<Vec<KilowattHours>>,
    pub session_export: Option<Vec<KilowattHours>>,

    /// Collected baseline days, nearest first.
    pub baseline_days: Vec<DateTime<Utc>>,

    /// Import readings of every collected baseline day, in the same order.
    pub baseline_import: Vec<Vec<KilowattHours>>,

    /// Export readings of the collected days which have them.
    pub baseline_export: Vec<Vec<KilowattHours>>,

    /// Net baseline.
    pub baseline: Option<Vec<KilowattHours>>,

    /// Net session usage.
    pub net_session: Option<Vec<KilowattHours>>,

    /// Saved energy for saving sessions, energy above the baseline for free sessions.
    pub kwh: Option<Vec<KilowattHours>>,

    pub points: Option<Vec<Points>>,
}

impl Calculation {
    pub fn new(session: Session, excluded: HashSet<NaiveDate>) -> Self {
        Self {
            day_kind: session.day_kind(),
            session,
            excluded,
            session_import: None,
            session_export: None,
            baseline_days: Vec::new(),
            baseline_import: Vec::new(),
            baseline_export: Vec::new(),
            baseline: None,
            net_session: None,
            kwh: None,
            points: None,
        }
    }

    /// Calculation of the session, which excludes the days of all the `sessions`.
    pub fn with_sessions(session: &Session, sessions: &[Session]) -> Self {
        Self::new(session.clone(), session_days(sessions))
    }

    #[must_use]
    pub fn statistic(&self) -> Statistic {
        self.day_kind.into()
    }

    /// Fetch the readings and compute everything.
    ///
    /// Missing readings never fail the evaluation, only the source errors do.
    #[instrument(
        skip_all,
        fields(start_at = %self.session.start_at, duration = self.session.duration),
    )]
    pub fn evaluate(
        &mut self,
        source: &impl ReadingsSource,
        import: &mut Readings<'_>,
        mut export: Option<&mut Readings<'_>>,
        progress: &mut impl Progress,
    ) -> Result {
        let (start_at, duration) = (self.session.start_at, self.session.duration);

        self.session_import = missing_as_none(import.get(source, start_at, duration))?;
        if self.session_import.is_none() {
            debug!("session import is incomplete");
        }
        progress.tick(Step::SessionImport);

        if let Some(export) = export.as_deref_mut() {
            self.session_export = missing_as_none(export.get(source, start_at, duration))?;
            if self.session_export.is_none() {
                debug!("session export is incomplete");
            }
            progress.tick(Step::SessionExport);
        }

        self.collect_baseline(source, import, export, progress)?;
        self.aggregate();
        info!(
            n_baseline_days = self.baseline_days.len(),
            saved = ?self.kwh.as_ref().map(|kwh| kwh.iter().copied().sum::<KilowattHours>()),
            "evaluated",
        );
        Ok(())
    }

    fn collect_baseline(
        &mut self,
        source: &impl ReadingsSource,
        import: &mut Readings<'_>,
        mut export: Option<&mut Readings<'_>>,
        progress: &mut impl Progress,
    ) -> Result {
        let duration = self.session.duration;
        let baseline_days = BaselineDays::builder()
            .start_at(self.session.start_at)
            .day_kind(self.day_kind)
            .excluded(&self.excluded)
            .build();

        for day in baseline_days.candidates() {
            let Some(import_values) = missing_as_none(import.get(source, day, duration))? else {
                debug!(%day, "skipped the day with missing readings");
                continue;
            };
            debug!(n_day = self.baseline_days.len(), %day, import = ?import_values);
            self.baseline_import.push(import_values);
            progress.tick(Step::BaselineImport(day));

            if let Some(export) = export.as_deref_mut() {
                match missing_as_none(export.get(source, day, duration))? {
                    Some(export_values) => {
                        debug!(%day, export = ?export_values);
                        self.baseline_export.push(export_values);
                    }
                    None => {
                        debug!(%day, "missing export readings");
                    }
                }
                progress.tick(Step::BaselineExport(day));
            }

            self.baseline_days.push(day);
            if self.baseline_days.len() == baseline_days.required_days() {
                break;
            }
        }

        Ok(())
    }

    fn aggregate(&mut self) {
        let statistic = self.statistic();
        let Some(baseline_import) = statistic.reduce(&self.baseline_import) else {
            warn!(start_at = %self.session.start_at, "no baseline days");
            return;
        };
        let baseline = match statistic.reduce(&self.baseline_export) {
            Some(baseline_export) => subtract(&baseline_import, &baseline_export),
            None => baseline_import,
        };

        self.net_session = self.session_import.as_ref().map(|import| {
            self.session_export
                .as_ref()
                .map_or_else(|| import.clone(), |export| subtract(import, export))
        });

        if let Some(net_session) = &self.net_session {
            if self.session.is_saving() {
                // Only positive savings count, separately in every half-hour:
                let kwh = subtract(&baseline, net_session)
                    .into_iter()
                    .map(KilowattHours::clamp_to_zero)
                    .collect::<Vec<_>>();
                let reward = self.session.reward();
                self.points = Some(kwh.iter().map(|saved| reward.reward(*saved)).collect());
                self.kwh = Some(kwh);
            } else {
                let kwh = subtract(net_session, &baseline)
                    .into_iter()
                    .map(KilowattHours::clamp_to_zero)
                    .collect::<Vec<_>>();
                self.points = Some(vec![Points::zero(); kwh.len()]);
                self.kwh = Some(kwh);
            }
        }

        self.baseline = Some(baseline);
    }
}

fn subtract(lhs: &[KilowattHours], rhs: &[KilowattHours]) -> Vec<KilowattHours> {
    lhs.iter().zip(rhs).map(|(lhs, rhs)| *lhs - *rhs).collect()
}
