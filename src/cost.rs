//! Tiered time-of-use cost allocation.
//!
//! The tier ladder is walked strictly in ascending index order: tier 0 is
//! consumed first. That order is the tariff contract («cheapest energy is
//! consumed first»), not an optimization.

use std::collections::BTreeMap;

use bon::Builder;

use crate::{
    aggregate::MonthlyAggregates,
    calendar::{DayType, daily_conversion_factor},
    prelude::*,
    profile::ConsumptionProfile,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    tariff::TariffRecord,
    validator::{MonthParams, TierUnit, tier_unit_convention},
};

/// Estimates the annual cost of the EV charging profile under one tariff.
///
/// All derived state is scoped to a single [`CostModel::annual_cost`] call;
/// records are independent of each other.
#[derive(Builder)]
pub struct CostModel<'a> {
    record: &'a TariffRecord,
    baseline: &'a ConsumptionProfile,
    charging: &'a ConsumptionProfile,
}

impl CostModel<'_> {
    /// Sum the monthly EV charging costs over the year.
    ///
    /// Tariffs with monthly tier ceilings are costed over the combined
    /// weekday + weekend totals (the ceiling cannot tell the day types apart);
    /// tariffs with daily ceilings are costed per day type.
    pub fn annual_cost(&self) -> Result<Cost> {
        let aggregates = MonthlyAggregates::build(self.record, self.baseline, self.charging);
        let day_types = tier_unit_convention(self.record)?.day_types();

        let mut annual = Cost::ZERO;
        for month in 1..=12 {
            let params = MonthParams::derive(self.record, month);
            let tier_maximums = params.tier_maximums(self.record);
            for day_type in day_types {
                annual += self
                    .monthly_cost(&aggregates, month, *day_type, &tier_maximums)
                    .with_context(|| format!("month {month}, {day_type} partition"))?;
            }
        }
        Ok(annual)
    }

    /// Cost of the EV-attributable energy in one month and day-type partition.
    ///
    /// Works in daily quantities: monthly consumption is scaled down by the
    /// average day count, allocated across the tier ladder, and the cost is
    /// scaled back up at the end.
    pub fn monthly_cost(
        &self,
        aggregates: &MonthlyAggregates,
        month: u32,
        day_type: DayType,
        tier_maximums: &[Option<KilowattHours>],
    ) -> Result<Cost> {
        let record = self.record;

        let monthly_ev_kwh = aggregates.ev_kwh(month, day_type);
        if monthly_ev_kwh <= KilowattHours::ZERO {
            // Nothing to allocate, and the rate period weights below would
            // divide by zero.
            return Ok(Cost::ZERO);
        }
        let monthly_baseline_kwh = if record.is_ev_specific() {
            KilowattHours::ZERO
        } else {
            aggregates.baseline_kwh(month, day_type)
        };

        let factor = daily_conversion_factor(month, day_type);
        let daily_baseline_kwh = monthly_baseline_kwh * factor;
        let daily_ev_kwh = monthly_ev_kwh * factor;

        let periods = record.periods_present(month, day_type);
        let first_period = record
            .scheduled_periods(month, day_type)
            .next()
            .context("the schedule has no hours for this month")?;

        // Each period's share of the month's EV charging; the shares sum to 1.
        let weights: BTreeMap<usize, f64> = periods
            .iter()
            .map(|period| {
                let in_period = aggregates.ev_kwh_in_period(month, *period, day_type);
                (*period, in_period.0 / monthly_ev_kwh.0)
            })
            .collect();

        let mut remaining_ev_kwh = daily_ev_kwh;
        let mut daily_cost = Cost::ZERO;

        for (tier, maximum) in tier_maximums.iter().enumerate() {
            match maximum {
                Some(maximum) => {
                    // The validator guarantees ceilings and units agree across
                    // the periods of a conforming month, so the first scheduled
                    // period's unit speaks for all of them.
                    let unit = record
                        .tier(first_period, tier)
                        .map(|tier| TierUnit::parse(tier.unit.as_deref()))
                        .unwrap_or(TierUnit::Unspecified);
                    let daily_maximum = match unit {
                        TierUnit::Monthly => *maximum * factor,
                        TierUnit::Daily => *maximum,
                        TierUnit::Unspecified | TierUnit::Other(_) => bail!(
                            "unusable ceiling unit {unit:?} on tier {tier} of record `{}`; \
                             the record should have been filtered out",
                            record.label,
                        ),
                    };

                    if daily_baseline_kwh > daily_maximum {
                        // The baseline load alone exhausts this tier.
                    } else if remaining_ev_kwh < daily_maximum - daily_baseline_kwh {
                        daily_cost += self.tier_charge(remaining_ev_kwh, tier, &weights)?;
                        remaining_ev_kwh = KilowattHours::ZERO;
                    } else {
                        let headroom = daily_maximum - daily_baseline_kwh;
                        daily_cost += self.tier_charge(headroom, tier, &weights)?;
                        remaining_ev_kwh -= headroom;
                    }
                }
                None => {
                    daily_cost += self.tier_charge(remaining_ev_kwh, tier, &weights)?;
                    remaining_ev_kwh = KilowattHours::ZERO;
                }
            }
        }

        Ok(daily_cost / factor)
    }

    /// Charge `energy` at this tier's rate, split across the periods by their
    /// EV consumption weights. A flat tier adjustment is applied once per
    /// period traversal, deliberately not scaled by the energy.
    fn tier_charge(
        &self,
        energy: KilowattHours,
        tier: usize,
        weights: &BTreeMap<usize, f64>,
    ) -> Result<Cost> {
        let mut cost = Cost::ZERO;
        for (period, weight) in weights {
            let tier_rates = self.record.tier(*period, tier).with_context(|| {
                format!("period {period} has no tier {tier} in record `{}`", self.record.label)
            })?;
            let rate: KilowattHourRate = tier_rates.rate.with_context(|| {
                format!("missing rate on period {period}, tier {tier} of `{}`", self.record.label)
            })?;
            cost += energy * *weight * rate;
            cost += tier_rates.adjustment.unwrap_or_default();
        }
        Ok(cost)
    }
}
