use chrono::{NaiveDateTime, TimeZone, Utc};
use clap::Parser;

use crate::{
    cli::catalog::CatalogArgs,
    core::{half_hour, session::FreeSessionRecord},
    prelude::*,
};

#[derive(Parser)]
pub struct AddFreeArgs {
    #[clap(flatten)]
    catalog: CatalogArgs,

    /// Local session start, for example, `2025-06-07T12:00:00`.
    #[clap(long = "start-at")]
    start_at: NaiveDateTime,

    /// Number of half-hours.
    #[clap(long, default_value = "2", value_parser = clap::value_parser!(u32).range(1..))]
    duration: u32,

    /// Timezone of the start time.
    #[clap(long, env = "DISPLAY_TIMEZONE", default_value = "Europe/London")]
    timezone: chrono_tz::Tz,
}

impl AddFreeArgs {
    #[instrument(skip_all, fields(start_at = %self.start_at, duration = self.duration))]
    pub fn run(self) -> Result {
        let start_at = self
            .timezone
            .from_local_datetime(&self.start_at)
            .single()
            .context("the start time is ambiguous or non-existent in the timezone")?
            .with_timezone(&Utc);
        ensure!(half_hour::is_aligned(&start_at), "sessions start on the hour or half past");

        let mut catalog = self.catalog.read()?;
        if catalog.insert_free(FreeSessionRecord { start_at, duration: self.duration }) {
            catalog.write_to(&self.catalog.path)?;
            info!(%start_at, "added");
        } else {
            warn!(%start_at, "the session is already known");
        }
        Ok(())
    }
}
