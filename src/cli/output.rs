use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::prelude::*;

#[derive(Parser)]
pub struct OutputArgs {
    /// Timezone to display the session starts in.
    #[clap(long, env = "DISPLAY_TIMEZONE", default_value = "Europe/London")]
    pub timezone: Tz,

    #[clap(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

#[derive(Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
