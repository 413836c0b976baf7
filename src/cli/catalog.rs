use std::path::PathBuf;

use clap::Parser;

use crate::{catalog::Catalog, prelude::*};

#[derive(Parser)]
pub struct CatalogArgs {
    /// Session catalog file.
    #[clap(long = "sessions", env = "SESSIONS_PATH", default_value = "sessions.toml")]
    pub path: PathBuf,
}

impl CatalogArgs {
    pub fn read(&self) -> Result<Catalog> {
        Catalog::read_from(&self.path)
    }
}
