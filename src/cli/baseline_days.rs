use clap::Parser;

use crate::{
    cli::{
        catalog::CatalogArgs,
        output::{Format, OutputArgs, print_json},
    },
    core::{baseline::BaselineDays, row::SESSION_FORMAT, session::session_days},
    prelude::*,
    tables::{BaselineDaysRow, build_baseline_days_table},
};

#[derive(Parser)]
pub struct BaselineDaysArgs {
    #[clap(flatten)]
    catalog: CatalogArgs,

    #[clap(flatten)]
    output: OutputArgs,
}

impl BaselineDaysArgs {
    /// Candidate days, ignoring any readings that may turn out to be missing.
    pub fn run(self) -> Result {
        let catalog = self.catalog.read()?;
        let timezone = self.output.timezone;
        let mut rows = Vec::new();

        for sessions in [catalog.saving_sessions(), catalog.free_sessions()] {
            let excluded = session_days(&sessions);
            for session in &sessions {
                let baseline_days = BaselineDays::builder()
                    .start_at(session.start_at)
                    .day_kind(session.day_kind())
                    .excluded(&excluded)
                    .build();
                rows.push(BaselineDaysRow {
                    session: session.code().map_or_else(
                        || session.start_at.with_timezone(&timezone).format(SESSION_FORMAT).to_string(),
                        str::to_string,
                    ),
                    required_days: baseline_days.required_days(),
                    days: baseline_days.select(),
                });
            }
        }

        match self.output.format {
            Format::Table => println!("{}", build_baseline_days_table(&rows, timezone)),
            Format::Json => print_json(&rows)?,
        }
        Ok(())
    }
}
