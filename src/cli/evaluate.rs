use clap::Parser;

use crate::{
    api::octopus::{Api, Household},
    cli::{
        catalog::CatalogArgs,
        octopus::OctopusArgs,
        output::{Format, OutputArgs, print_json},
        progress::SessionProgress,
    },
    core::{calculation::Calculation, readings::Readings, session::Session},
    prelude::*,
    tables::{build_free_table, build_saving_table},
};

#[derive(Parser)]
pub struct SavingArgs {
    #[clap(flatten)]
    octopus: OctopusArgs,

    #[clap(flatten)]
    catalog: CatalogArgs,

    #[clap(flatten)]
    output: OutputArgs,

    /// Print the per-session totals as JSON instead of the rows.
    #[clap(long)]
    summary: bool,
}

impl SavingArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let sessions = self.catalog.read()?.saving_sessions();
        ensure!(!sessions.is_empty(), "no saving sessions in the catalog");
        let (api, household) = self.octopus.connect()?;
        let calculations = evaluate_all(&api, &household, &sessions, true)?;

        if self.summary {
            let summaries: Vec<_> = calculations.iter().filter_map(Calculation::summary).collect();
            return print_json(&summaries);
        }
        let timezone = self.output.timezone;
        match self.output.format {
            Format::Table => {
                let rows: Vec<_> =
                    calculations.iter().map(|calculation| calculation.saving_row(timezone)).collect();
                println!("{}", build_saving_table(&rows));
            }
            Format::Json => {
                let rows: Vec<_> =
                    calculations.iter().map(|calculation| calculation.row(timezone)).collect();
                print_json(&rows)?;
            }
        }
        Ok(())
    }
}

#[derive(Parser)]
pub struct FreeArgs {
    #[clap(flatten)]
    octopus: OctopusArgs,

    #[clap(flatten)]
    catalog: CatalogArgs,

    #[clap(flatten)]
    output: OutputArgs,
}

impl FreeArgs {
    #[instrument(skip_all)]
    pub fn run(self) -> Result {
        let sessions = self.catalog.read()?.free_sessions();
        ensure!(!sessions.is_empty(), "no free electricity sessions in the catalog");
        let (api, household) = self.octopus.connect()?;

        // Exported energy is irrelevant when the import is free.
        let calculations = evaluate_all(&api, &household, &sessions, false)?;

        let timezone = self.output.timezone;
        match self.output.format {
            Format::Table => {
                let rows: Vec<_> =
                    calculations.iter().map(|calculation| calculation.free_row(timezone)).collect();
                println!("{}", build_free_table(&rows));
            }
            Format::Json => {
                let rows: Vec<_> =
                    calculations.iter().map(|calculation| calculation.row(timezone)).collect();
                print_json(&rows)?;
            }
        }
        Ok(())
    }
}

/// Evaluate the sessions one by one, sharing the readings caches between them.
fn evaluate_all(
    api: &Api,
    household: &Household,
    sessions: &[Session],
    with_export: bool,
) -> Result<Vec<Calculation>> {
    let mut import = Readings::new(&household.import);
    let mut export =
        household.export.as_ref().filter(|_| with_export).map(Readings::new);
    info!(
        n_sessions = sessions.len(),
        import = %import.meter_point().mpan,
        with_export = export.is_some(),
        "evaluating…",
    );

    sessions
        .iter()
        .enumerate()
        .map(|(index, session)| {
            let mut calculation = Calculation::with_sessions(session, sessions);
            calculation.evaluate(
                api,
                &mut import,
                export.as_mut(),
                &mut SessionProgress::new(index, sessions.len()),
            )?;
            Ok(calculation)
        })
        .collect()
}
