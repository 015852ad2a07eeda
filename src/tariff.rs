//! USURDB tariff record model.
//!
//! Field notes from the API:
//!
//! - `energyweekdayschedule` and `energyweekendschedule`: 12 month arrays of 24
//!   hourly entries each; every entry is an index into `energyratestructure`.
//! - `energyratestructure`: one entry per rate period, each an ordered list of
//!   consumption tiers. Tier 0 is consumed first.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{TimestampSeconds, formats::Flexible, serde_as};

use crate::{
    calendar::DayType,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct TariffRecord {
    pub label: String,

    pub utility: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Negative epoch values occur in the wild; they deserialize to a pre-1970
    /// timestamp and get rejected as expired.
    #[serde_as(as = "Option<TimestampSeconds<f64, Flexible>>")]
    #[serde(default, rename = "enddate")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub source: Option<String>,

    pub uri: String,

    #[serde(default, rename = "fixedmonthlycharge")]
    pub fixed_monthly_charge: Option<Cost>,

    /// Empty when the record carries no energy rate structure at all.
    #[serde(default, rename = "energyratestructure")]
    pub rate_structure: Vec<Vec<RateTier>>,

    #[serde(rename = "energyweekdayschedule")]
    pub weekday_schedule: Schedule,

    #[serde(rename = "energyweekendschedule")]
    pub weekend_schedule: Schedule,
}

impl TariffRecord {
    /// An EV-only meter carries no household load, so no baseline consumption
    /// eats into the tier headroom.
    #[must_use]
    pub fn is_ev_specific(&self) -> bool {
        self.name.contains("EV") || self.name.to_lowercase().contains("electric vehicle")
    }

    #[must_use]
    pub fn tier(&self, period: usize, tier: usize) -> Option<&RateTier> {
        self.rate_structure.get(period).and_then(|tiers| tiers.get(tier))
    }

    /// Rate periods scheduled in the given month (1-based) and day type, in
    /// schedule order. `Total` chains the weekday hours before the weekend ones.
    pub fn scheduled_periods(
        &self,
        month: u32,
        day_type: DayType,
    ) -> impl Iterator<Item = usize> + '_ {
        let (weekday, weekend) = match day_type {
            DayType::Weekday => (self.weekday_schedule.month_row(month), &[][..]),
            DayType::Weekend => (self.weekend_schedule.month_row(month), &[][..]),
            DayType::Total => {
                (self.weekday_schedule.month_row(month), self.weekend_schedule.month_row(month))
            }
        };
        weekday.iter().chain(weekend).copied()
    }

    /// Distinct rate periods present in the given month and day type.
    #[must_use]
    pub fn periods_present(&self, month: u32, day_type: DayType) -> BTreeSet<usize> {
        self.scheduled_periods(month, day_type).collect()
    }
}

/// 12 months × 24 hours of rate period indices.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Schedule(pub Vec<Vec<usize>>);

impl Schedule {
    /// Hourly rate period indices for the given month (1-based). Empty when
    /// the record's schedule is malformed; admission checks the shape.
    #[must_use]
    pub fn month_row(&self, month: u32) -> &[usize] {
        self.0.get((month - 1) as usize).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == 12 && self.0.iter().all(|hours| hours.len() == 24)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RateTier {
    #[serde(default)]
    pub rate: Option<KilowattHourRate>,

    /// Consumption ceiling; monthly or daily kWh depending on [`RateTier::unit`].
    #[serde(default)]
    pub max: Option<KilowattHours>,

    #[serde(default)]
    pub unit: Option<String>,

    /// Flat charge applied when the tier is traversed, not scaled by kWh.
    #[serde(default, rename = "adj")]
    pub adjustment: Option<Cost>,
}
