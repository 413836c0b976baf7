use std::{fmt::Debug, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    core::session::{FreeSessionRecord, SavingSessionRecord, Session},
    prelude::*,
};

/// Known sessions persisted as a TOML file.
#[derive(Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub saving: Vec<SavingSessionRecord>,

    #[serde(default)]
    pub free: Vec<FreeSessionRecord>,
}

impl Catalog {
    #[instrument(name = "Reading the catalog…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            let catalog: Self = toml::from_slice(&fs::read(path)?)
                .with_context(|| format!("failed to parse `{}`", path.display()))?;
            info!(n_saving = catalog.saving.len(), n_free = catalog.free.len(), "loaded");
            Ok(catalog)
        } else {
            warn!("the catalog does not exist yet");
            Ok(Self::default())
        }
    }

    #[instrument(skip(self), name = "Writing the catalog…")]
    pub fn write_to<P: AsRef<Path> + Debug>(&self, path: P) -> Result {
        fs::write(path, toml::to_string(self)?)?;
        Ok(())
    }

    /// Insert the free electricity session unless one with the same start is already known.
    ///
    /// Returns whether the session has been inserted.
    pub fn insert_free(&mut self, record: FreeSessionRecord) -> bool {
        if self.free.iter().any(|known| known.start_at == record.start_at) {
            return false;
        }
        self.free.push(record);
        self.free.sort_by_key(|known| known.start_at);
        true
    }

    /// Saving sessions in chronological order.
    pub fn saving_sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.saving.iter().map(Session::from).collect();
        sessions.sort_by_key(|session| session.start_at);
        sessions
    }

    /// Free electricity sessions in chronological order.
    pub fn free_sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self.free.iter().map(Session::from).collect();
        sessions.sort_by_key(|session| session.start_at);
        sessions
    }
}
