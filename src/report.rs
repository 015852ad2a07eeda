//! Result files and the console summary.

use std::{fs::File, path::Path};

use comfy_table::{Attribute, Cell, CellAlignment, Table, modifiers, presets};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{filter::Rejection, prelude::*, quantity::cost::Cost, tariff::TariffRecord};

/// The `csv` serializer cannot flatten nested structs, hence the repeated
/// identity columns in the two row types.
#[derive(Serialize)]
struct CostRow<'a> {
    label: &'a str,
    utility: &'a str,
    rate_name: &'a str,
    rate_description: Option<&'a str>,
    rate_end_date: Option<String>,
    source_url: Option<&'a str>,
    openei_url: &'a str,
    fixed_charge_first_meter: Option<Cost>,
    ev_annual_charging_cost: Cost,
}

#[derive(Serialize)]
struct RejectionRow<'a> {
    label: &'a str,
    utility: &'a str,
    rate_name: &'a str,
    rate_description: Option<&'a str>,
    rate_end_date: Option<String>,
    source_url: Option<&'a str>,
    openei_url: &'a str,
    reason: String,
}

/// Streams the per-record outcomes into the two CSV result files.
pub struct ReportWriter {
    costs: csv::Writer<File>,
    rejections: csv::Writer<File>,
}

impl ReportWriter {
    pub fn try_new(output_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_path)
            .with_context(|| format!("failed to create `{}`", output_path.display()))?;
        Ok(Self {
            costs: Self::open(&output_path.join("ev_charging_cost_by_utility_rate.csv"))?,
            rejections: Self::open(&output_path.join("filtered_records.csv"))?,
        })
    }

    fn open(path: &Path) -> Result<csv::Writer<File>> {
        csv::Writer::from_path(path)
            .with_context(|| format!("failed to create `{}`", path.display()))
    }

    pub fn write_cost(&mut self, record: &TariffRecord, annual_cost: Cost) -> Result {
        self.costs
            .serialize(CostRow {
                label: &record.label,
                utility: &record.utility,
                rate_name: &record.name,
                rate_description: record.description.as_deref(),
                rate_end_date: record.end_date.map(|end_date| end_date.to_rfc3339()),
                source_url: record.source.as_deref(),
                openei_url: &record.uri,
                fixed_charge_first_meter: record.fixed_monthly_charge,
                ev_annual_charging_cost: annual_cost.round_to_cents(),
            })
            .with_context(|| format!("failed to write the cost row for `{}`", record.label))
    }

    pub fn write_rejection(&mut self, record: &TariffRecord, rejection: &Rejection) -> Result {
        self.rejections
            .serialize(RejectionRow {
                label: &record.label,
                utility: &record.utility,
                rate_name: &record.name,
                rate_description: record.description.as_deref(),
                rate_end_date: record.end_date.map(|end_date| end_date.to_rfc3339()),
                source_url: record.source.as_deref(),
                openei_url: &record.uri,
                reason: rejection.to_string(),
            })
            .with_context(|| format!("failed to write the rejection row for `{}`", record.label))
    }

    pub fn finish(mut self) -> Result {
        self.costs.flush().context("failed to flush the cost results")?;
        self.rejections.flush().context("failed to flush the rejection results")?;
        Ok(())
    }
}

/// One page of records with their would-be admission outcomes.
#[must_use]
pub fn build_admissibility_table(rows: &[(String, String, Option<Rejection>)]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Utility", "Rate", "Outcome"]);
    for (utility, name, rejection) in rows {
        let outcome = match rejection {
            Some(rejection) => Cell::new(format!("rejected: {rejection}")),
            None => Cell::new("admitted").add_attribute(Attribute::Bold),
        };
        table.add_row(vec![
            Cell::new(utility),
            Cell::new(name).add_attribute(Attribute::Dim),
            outcome,
        ]);
    }
    table
}

/// The cheapest tariffs, for a quick look before opening the CSV.
#[must_use]
pub fn build_cheapest_table(results: &[(String, String, Cost)], n_cheapest: usize) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec!["Utility", "Rate", "Annual cost"]);
    for (utility, name, cost) in
        results.iter().sorted_by_key(|(_, _, cost)| OrderedFloat(cost.0)).take(n_cheapest)
    {
        table.add_row(vec![
            Cell::new(utility),
            Cell::new(name).add_attribute(Attribute::Dim),
            Cell::new(cost).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
