use crate::{
    core::progress::{Progress, Step},
    prelude::*,
};

/// Logs the calculation steps of a single session among many.
pub struct SessionProgress {
    n_session: usize,
    n_sessions: usize,
    n_steps: usize,
}

impl SessionProgress {
    pub const fn new(index: usize, n_sessions: usize) -> Self {
        Self { n_session: index + 1, n_sessions, n_steps: 0 }
    }
}

impl Progress for SessionProgress {
    fn tick(&mut self, step: Step) {
        self.n_steps += 1;
        debug!(
            n_session = self.n_session,
            n_sessions = self.n_sessions,
            n_steps = self.n_steps,
            ?step,
            "progress",
        );
    }
}
