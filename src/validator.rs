//! Tier structure validation.
//!
//! A tier's `max` is declared per rate period, but the only sane reading of the
//! data is that it caps consumption across all periods of the day. That reading
//! is safe only when every rate period present in a month declares the same
//! ceiling at every tier index, which is what [`is_conforming_month`] checks.
//! The cost allocator relies on this to read tier units and ceilings from a
//! single period.

use std::collections::{BTreeMap, BTreeSet};

use crate::{calendar::DayType, prelude::*, quantity::energy::KilowattHours, tariff::TariffRecord};

/// Unit of a tier's consumption ceiling.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TierUnit {
    /// `kWh`: the ceiling caps a whole month.
    Monthly,

    /// `kWh daily`: the ceiling caps a single day.
    Daily,

    /// A ceiling without a declared unit.
    Unspecified,

    Other(String),
}

impl TierUnit {
    #[must_use]
    pub fn parse(unit: Option<&str>) -> Self {
        match unit {
            Some("kWh") => Self::Monthly,
            Some("kWh daily") => Self::Daily,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Unspecified,
        }
    }
}

/// Whether the record's tier ceilings cap months or days.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnitConvention {
    Monthly,
    Daily,
}

impl UnitConvention {
    /// Day-type partition the record must be costed over.
    #[must_use]
    pub const fn day_types(self) -> &'static [DayType] {
        match self {
            Self::Monthly => &[DayType::Total],
            Self::Daily => &[DayType::Weekday, DayType::Weekend],
        }
    }
}

/// Units of every ceilinged tier across all rate periods.
#[must_use]
pub fn tier_units(record: &TariffRecord) -> Vec<TierUnit> {
    record
        .rate_structure
        .iter()
        .flatten()
        .filter(|tier| tier.max.is_some())
        .map(|tier| TierUnit::parse(tier.unit.as_deref()))
        .collect()
}

/// Fails on a mix of monthly and daily ceilings: the allocator must never
/// silently convert some ceilings and not others. Records like that are
/// supposed to be rejected upstream already.
pub fn tier_unit_convention(record: &TariffRecord) -> Result<UnitConvention> {
    let units = tier_units(record);
    if units.iter().all(|unit| *unit == TierUnit::Monthly) {
        Ok(UnitConvention::Monthly)
    } else if units.iter().all(|unit| *unit == TierUnit::Daily) {
        Ok(UnitConvention::Daily)
    } else {
        bail!("record `{}` mixes tier ceiling units: {units:?}", record.label);
    }
}

/// Per-month facts about the schedule and rate structure.
pub struct MonthParams {
    /// Rate periods appearing in the month's weekday or weekend schedule.
    pub periods: BTreeSet<usize>,

    pub lowest_period: usize,

    /// Highest tier count among the periods present.
    pub max_tier_count: usize,
}

impl MonthParams {
    /// `month` is 1-based.
    #[must_use]
    pub fn derive(record: &TariffRecord, month: u32) -> Self {
        let periods = record.periods_present(month, DayType::Total);
        let lowest_period = periods.iter().next().copied().unwrap_or_default();
        let max_tier_count = periods
            .iter()
            .filter_map(|period| record.rate_structure.get(*period))
            .map(Vec::len)
            .max()
            .unwrap_or_default();
        Self { periods, lowest_period, max_tier_count }
    }

    /// Declared ceiling of each tier of the lowest period, up to the maximum
    /// tier count. Valid as the ceiling for every period only when
    /// [`is_conforming_month`] holds.
    #[must_use]
    pub fn tier_maximums(&self, record: &TariffRecord) -> Vec<Option<KilowattHours>> {
        (0..self.max_tier_count)
            .map(|tier| record.tier(self.lowest_period, tier).and_then(|tier| tier.max))
            .collect()
    }
}

/// `month` is 1-based. `false` when the month's tier ceilings cannot be read
/// as one ladder shared by all rate periods.
#[must_use]
pub fn is_conforming_month(record: &TariffRecord, month: u32) -> bool {
    let params = MonthParams::derive(record, month);

    // Every period present must carry the full tier ladder. This also catches
    // schedules referencing a period that does not exist.
    for period in &params.periods {
        match record.rate_structure.get(*period) {
            Some(tiers) if tiers.len() == params.max_tier_count => {}
            _ => return false,
        }
    }

    for tier in 0..params.max_tier_count {
        // Single-tier periods never need a ceiling comparison, but there are
        // none here: all periods have `max_tier_count` tiers by now. The guard
        // matters for the `max_tier_count == 1` case only.
        if params.max_tier_count == 1 {
            break;
        }
        let ceilings: BTreeMap<usize, KilowattHours> = params
            .periods
            .iter()
            .filter_map(|period| {
                record.tier(*period, tier).and_then(|tier| tier.max).map(|max| (*period, max))
            })
            .collect();
        if ceilings.is_empty() {
            continue;
        }
        let Some(reference) = ceilings.get(&params.lowest_period) else {
            return false;
        };
        if ceilings.values().any(|ceiling| ceiling != reference) {
            return false;
        }
    }

    true
}

/// A record is admissible to the allocator only when every month conforms.
#[must_use]
pub fn is_conforming(record: &TariffRecord) -> bool {
    (1..=12).all(|month| is_conforming_month(record, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::{RateTier, Schedule, tests::minimal_record};

    fn tier(rate: f64, max: Option<f64>, unit: Option<&str>) -> RateTier {
        RateTier {
            rate: Some(rate.into()),
            max: max.map(Into::into),
            unit: unit.map(ToString::to_string),
            adjustment: None,
        }
    }

    #[test]
    fn test_unit_convention_monthly() -> Result {
        let mut record = minimal_record("Residential");
        record.rate_structure =
            vec![vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)]];
        assert_eq!(tier_unit_convention(&record)?, UnitConvention::Monthly);
        Ok(())
    }

    #[test]
    fn test_unit_convention_daily() -> Result {
        let mut record = minimal_record("Residential");
        record.rate_structure =
            vec![vec![tier(0.1, Some(10.0), Some("kWh daily")), tier(0.2, None, None)]];
        assert_eq!(tier_unit_convention(&record)?, UnitConvention::Daily);
        Ok(())
    }

    #[test]
    fn test_unit_convention_rejects_mix() {
        let mut record = minimal_record("Residential");
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)],
            vec![tier(0.1, Some(10.0), Some("kWh daily")), tier(0.2, None, None)],
        ];
        assert!(tier_unit_convention(&record).is_err());
    }

    #[test]
    fn test_unit_convention_rejects_unspecified() {
        let mut record = minimal_record("Residential");
        record.rate_structure = vec![vec![tier(0.1, Some(100.0), None), tier(0.2, None, None)]];
        assert!(tier_unit_convention(&record).is_err());
    }

    /// Two periods scheduled, weekday on period 0 and weekend on period 1.
    fn two_period_record() -> TariffRecord {
        let mut record = minimal_record("Residential");
        record.weekend_schedule = Schedule(vec![vec![1; 24]; 12]);
        record
    }

    #[test]
    fn test_conforming_when_ceilings_agree() {
        let mut record = two_period_record();
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)],
            vec![tier(0.15, Some(100.0), Some("kWh")), tier(0.25, None, None)],
        ];
        assert!(is_conforming(&record));
    }

    #[test]
    fn test_non_conforming_when_ceilings_differ() {
        let mut record = two_period_record();
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)],
            vec![tier(0.15, Some(200.0), Some("kWh")), tier(0.25, None, None)],
        ];
        assert!(!is_conforming_month(&record, 1));
        assert!(!is_conforming(&record));
    }

    #[test]
    fn test_non_conforming_when_tier_counts_differ() {
        let mut record = two_period_record();
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)],
            vec![tier(0.15, None, None)],
        ];
        assert!(!is_conforming_month(&record, 1));
    }

    #[test]
    fn test_single_tier_periods_always_conform() {
        let mut record = two_period_record();
        record.rate_structure = vec![vec![tier(0.1, None, None)], vec![tier(0.15, None, None)]];
        assert!(is_conforming(&record));
    }

    #[test]
    fn test_single_tier_ceiling_differences_conform() {
        // With one tier per period there is no ladder to walk, so declared
        // ceilings need not agree.
        let mut record = two_period_record();
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh"))],
            vec![tier(0.15, Some(200.0), Some("kWh"))],
        ];
        assert!(is_conforming(&record));
    }

    #[test]
    fn test_non_conforming_when_schedule_references_missing_period() {
        let mut record = two_period_record();
        record.rate_structure = vec![vec![tier(0.1, None, None)]];
        assert!(!is_conforming_month(&record, 1));
    }

    #[test]
    fn test_tier_maximums_come_from_lowest_period() {
        let mut record = two_period_record();
        record.rate_structure = vec![
            vec![tier(0.1, Some(100.0), Some("kWh")), tier(0.2, None, None)],
            vec![tier(0.15, Some(100.0), Some("kWh")), tier(0.25, None, None)],
        ];
        let params = MonthParams::derive(&record, 1);
        assert_eq!(params.lowest_period, 0);
        assert_eq!(
            params.tier_maximums(&record),
            vec![Some(KilowattHours::from(100.0)), None]
        );
    }
}
