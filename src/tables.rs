use std::fmt::Display;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use serde::Serialize;

use crate::{
    core::row::{FreeRow, SavingRow},
    quantity::{energy::KilowattHours, points::Points},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

/// Right-aligned cell, dimmed dash for absent values.
fn quantity_cell<T: Display>(value: Option<T>) -> Cell {
    value.map_or_else(
        || Cell::new("–").add_attribute(Attribute::Dim),
        Cell::new,
    )
    .set_alignment(CellAlignment::Right)
}

fn energy_cell(value: Option<KilowattHours>) -> Cell {
    quantity_cell(value.map(|value| format!("{value:.3}")))
}

pub fn build_saving_table(rows: &[SavingRow]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Session", "Import", "Export", "Baseline", "Saved", "Reward", "Earnings"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.session),
            energy_cell(row.import),
            energy_cell(row.export).add_attribute(Attribute::Dim),
            energy_cell(row.baseline),
            energy_cell(row.saved),
            quantity_cell(row.reward).fg(match row.reward {
                Some(reward) if reward > Points::zero() => Color::Green,
                Some(_) => Color::Red,
                None => Color::Reset,
            }),
            quantity_cell(row.earnings.map(|earnings| format!("£{:.2}", earnings.0))),
        ]);
    }
    table
}

pub fn build_free_table(rows: &[FreeRow]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Session", "Import", "Baseline", "Free"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.session),
            energy_cell(row.import),
            energy_cell(row.baseline).add_attribute(Attribute::Dim),
            energy_cell(row.free).fg(match row.free {
                Some(free) if free > KilowattHours::zero() => Color::Green,
                _ => Color::Reset,
            }),
        ]);
    }
    table
}

#[must_use]
#[derive(Serialize)]
pub struct BaselineDaysRow {
    pub session: String,
    pub required_days: usize,
    pub days: Vec<DateTime<Utc>>,
}

pub fn build_baseline_days_table(rows: &[BaselineDaysRow], timezone: Tz) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Session", "Days", "Baseline days"]);
    for row in rows {
        let dates = row
            .days
            .iter()
            .map(|day| day.with_timezone(&timezone).format("%b %d").to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&row.session),
            Cell::new(row.days.len()).set_alignment(CellAlignment::Right).fg(
                if row.days.len() < row.required_days { Color::Red } else { Color::Green },
            ),
            Cell::new(dates).add_attribute(Attribute::Dim),
        ]);
    }
    table
}
