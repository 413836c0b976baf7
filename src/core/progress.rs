use chrono::{DateTime, Utc};

/// Unit of work finished by a calculation.
#[derive(Copy, Clone, Debug)]
pub enum Step {
    SessionImport,
    SessionExport,
    BaselineImport(DateTime<Utc>),
    BaselineExport(DateTime<Utc>),
}

/// Observer of the calculation progress.
///
/// It cannot affect the calculation.
pub trait Progress {
    fn tick(&mut self, _step: Step) {}
}

impl Progress for () {}
