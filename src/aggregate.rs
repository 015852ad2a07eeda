//! Month × rate period consumption totals.
//!
//! This is the transient table the allocator reads from: for every month and
//! every rate period scheduled in it, the hours of occurrence and the baseline
//! and EV charging energy, split by weekday and weekend. Rebuilt from scratch
//! for every record.

use std::collections::BTreeMap;

use crate::{
    calendar::DayType,
    profile::ConsumptionProfile,
    quantity::{energy::KilowattHours, time::Hours},
    tariff::TariffRecord,
};

#[derive(Copy, Clone, Default)]
pub struct Slot {
    pub weekday_hours: f64,
    pub weekend_hours: f64,
    pub weekday_baseline: KilowattHours,
    pub weekend_baseline: KilowattHours,
    pub weekday_ev: KilowattHours,
    pub weekend_ev: KilowattHours,
}

impl Slot {
    #[must_use]
    pub fn hours(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::Weekday => self.weekday_hours,
            DayType::Weekend => self.weekend_hours,
            DayType::Total => self.weekday_hours + self.weekend_hours,
        }
    }

    #[must_use]
    pub fn baseline(&self, day_type: DayType) -> KilowattHours {
        match day_type {
            DayType::Weekday => self.weekday_baseline,
            DayType::Weekend => self.weekend_baseline,
            DayType::Total => self.weekday_baseline + self.weekend_baseline,
        }
    }

    #[must_use]
    pub fn ev(&self, day_type: DayType) -> KilowattHours {
        match day_type {
            DayType::Weekday => self.weekday_ev,
            DayType::Weekend => self.weekend_ev,
            DayType::Total => self.weekday_ev + self.weekend_ev,
        }
    }
}

pub struct MonthlyAggregates {
    /// Keyed by rate period; index with `month - 1`.
    months: [BTreeMap<usize, Slot>; 12],
}

impl MonthlyAggregates {
    /// Fold the hourly profiles into per-(month, rate period) totals. Each
    /// scheduled hour contributes `power × 1 h × day count` of energy.
    #[must_use]
    pub fn build(
        record: &TariffRecord,
        baseline: &ConsumptionProfile,
        charging: &ConsumptionProfile,
    ) -> Self {
        let mut months: [BTreeMap<usize, Slot>; 12] = Default::default();
        for month in 1..=12u32 {
            let slots = &mut months[(month - 1) as usize];
            let weekdays = DayType::Weekday.days_in_month(month);
            let weekends = DayType::Weekend.days_in_month(month);

            for (hour, period) in record.weekday_schedule.month_row(month).iter().enumerate() {
                let slot = slots.entry(*period).or_default();
                slot.weekday_hours += weekdays;
                slot.weekday_baseline += baseline.weekday_power(month, hour) * Hours::ONE * weekdays;
                slot.weekday_ev += charging.weekday_power(month, hour) * Hours::ONE * weekdays;
            }
            for (hour, period) in record.weekend_schedule.month_row(month).iter().enumerate() {
                let slot = slots.entry(*period).or_default();
                slot.weekend_hours += weekends;
                slot.weekend_baseline += baseline.weekend_power(month, hour) * Hours::ONE * weekends;
                slot.weekend_ev += charging.weekend_power(month, hour) * Hours::ONE * weekends;
            }
        }
        Self { months }
    }

    fn slots(&self, month: u32) -> &BTreeMap<usize, Slot> {
        &self.months[(month - 1) as usize]
    }

    /// Baseline energy over all rate periods of the month.
    #[must_use]
    pub fn baseline_kwh(&self, month: u32, day_type: DayType) -> KilowattHours {
        self.slots(month).values().map(|slot| slot.baseline(day_type)).sum()
    }

    /// EV charging energy over all rate periods of the month.
    #[must_use]
    pub fn ev_kwh(&self, month: u32, day_type: DayType) -> KilowattHours {
        self.slots(month).values().map(|slot| slot.ev(day_type)).sum()
    }

    /// EV charging energy in one rate period; zero when the period is not
    /// scheduled in that month or day type.
    #[must_use]
    pub fn ev_kwh_in_period(&self, month: u32, period: usize, day_type: DayType) -> KilowattHours {
        self.slots(month).get(&period).map(|slot| slot.ev(day_type)).unwrap_or_default()
    }

    /// Scheduled hours of occurrence, weighted by day counts.
    #[must_use]
    pub fn hours(&self, month: u32, period: usize, day_type: DayType) -> f64 {
        self.slots(month).get(&period).map(|slot| slot.hours(day_type)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        profile::tests::constant_profile,
        tariff::{Schedule, tests::minimal_record},
    };

    #[test]
    fn test_single_period_totals() {
        let record = minimal_record("Residential");
        let aggregates =
            MonthlyAggregates::build(&record, &constant_profile(0.5), &constant_profile(1.0));

        // January: 22.142857 weekdays and 8.857143 weekend days, 31 in total.
        let days = DayType::Total.days_in_month(1);
        assert_abs_diff_eq!(aggregates.hours(1, 0, DayType::Total), 24.0 * days, epsilon = 1e-6);
        assert_abs_diff_eq!(
            aggregates.baseline_kwh(1, DayType::Total).0,
            0.5 * 24.0 * days,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            aggregates.ev_kwh(1, DayType::Total).0,
            1.0 * 24.0 * days,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_period_split_follows_schedule() {
        let mut record = minimal_record("Residential");
        // Period 1 covers weekday hours 18..24, period 0 everything else.
        let mut weekday_hours = vec![0; 24];
        for hour in 18..24 {
            weekday_hours[hour] = 1;
        }
        record.weekday_schedule = Schedule(vec![weekday_hours; 12]);

        let profile = constant_profile(1.0);
        let aggregates = MonthlyAggregates::build(&record, &profile, &profile);

        let weekdays = DayType::Weekday.days_in_month(6);
        assert_abs_diff_eq!(
            aggregates.ev_kwh_in_period(6, 1, DayType::Weekday).0,
            6.0 * weekdays,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            aggregates.ev_kwh_in_period(6, 0, DayType::Weekday).0,
            18.0 * weekdays,
            epsilon = 1e-6
        );
        // Period 1 is never scheduled on weekends.
        assert_abs_diff_eq!(aggregates.ev_kwh_in_period(6, 1, DayType::Weekend).0, 0.0);
    }

    #[test]
    fn test_total_view_sums_weekday_and_weekend() {
        let mut record = minimal_record("Residential");
        record.weekend_schedule = Schedule(vec![vec![1; 24]; 12]);
        let profile = constant_profile(1.0);
        let aggregates = MonthlyAggregates::build(&record, &profile, &profile);

        for period in [0, 1] {
            let total = aggregates.ev_kwh_in_period(3, period, DayType::Total).0;
            let split = aggregates.ev_kwh_in_period(3, period, DayType::Weekday).0
                + aggregates.ev_kwh_in_period(3, period, DayType::Weekend).0;
            assert_abs_diff_eq!(total, split);
        }
    }
}
