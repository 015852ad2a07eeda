//! Hourly consumption profiles.
//!
//! A profile is a 12 × 24 grid of average power draw, with separate weekday and
//! weekend variants, read from a CSV of `month,hour,weekday_kw,weekend_kw`
//! rows. The power is treated as constant for every day of that type within
//! the month.

use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;

use crate::{prelude::*, quantity::power::Kilowatts};

pub struct ConsumptionProfile {
    weekday: [[Kilowatts; 24]; 12],
    weekend: [[Kilowatts; 24]; 12],
}

impl ConsumptionProfile {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        Self::read(file).with_context(|| format!("failed to read `{}`", path.display()))
    }

    pub fn read(reader: impl Read) -> Result<Self> {
        let mut weekday = [[None::<Kilowatts>; 24]; 12];
        let mut weekend = [[None::<Kilowatts>; 24]; 12];

        for row in csv::Reader::from_reader(reader).deserialize() {
            let row: ProfileRow = row.context("malformed profile row")?;
            ensure!((1..=12).contains(&row.month), "month {} is out of range", row.month);
            ensure!(row.hour <= 23, "hour {} is out of range", row.hour);
            let (month, hour) = ((row.month - 1) as usize, row.hour as usize);
            ensure!(
                weekday[month][hour].is_none(),
                "duplicate profile cell for month {}, hour {}",
                row.month,
                row.hour,
            );
            weekday[month][hour] = Some(row.weekday_kw);
            weekend[month][hour] = Some(row.weekend_kw);
        }

        let mut this = Self {
            weekday: [[Kilowatts::ZERO; 24]; 12],
            weekend: [[Kilowatts::ZERO; 24]; 12],
        };
        for month in 0..12 {
            for hour in 0..24 {
                this.weekday[month][hour] = weekday[month][hour].with_context(|| {
                    format!("missing profile cell for month {}, hour {hour}", month + 1)
                })?;
                this.weekend[month][hour] = weekend[month][hour].with_context(|| {
                    format!("missing profile cell for month {}, hour {hour}", month + 1)
                })?;
            }
        }
        Ok(this)
    }

    /// `month` is 1-based, `hour` is 0-based.
    #[must_use]
    pub fn weekday_power(&self, month: u32, hour: usize) -> Kilowatts {
        self.weekday[(month - 1) as usize][hour]
    }

    /// `month` is 1-based, `hour` is 0-based.
    #[must_use]
    pub fn weekend_power(&self, month: u32, hour: usize) -> Kilowatts {
        self.weekend[(month - 1) as usize][hour]
    }
}

#[derive(Deserialize)]
struct ProfileRow {
    month: u32,
    hour: u32,
    weekday_kw: Kilowatts,
    weekend_kw: Kilowatts,
}
