//! Record admissibility: every reason a tariff record is excluded from the
//! cost calculation, in the order the checks run.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

use crate::{
    tariff::TariffRecord,
    validator::{TierUnit, is_conforming, tier_units},
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rejection {
    MissingRateStructure,
    MalformedSchedule,
    Expired,
    Keyword(String),
    UnsupportedUnits,
    MissingRate,
    NonConformingTierStructure,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRateStructure => write!(f, "missing energy structure"),
            Self::MalformedSchedule => write!(f, "malformed schedule"),
            Self::Expired => write!(f, "end date"),
            Self::Keyword(keyword) => write!(f, "keyword `{keyword}`"),
            Self::UnsupportedUnits => write!(f, "units"),
            Self::MissingRate => write!(f, "missing rate"),
            Self::NonConformingTierStructure => write!(f, "non-conforming tier structure"),
        }
    }
}

/// `None` means the record is admissible and its cost gets calculated.
#[must_use]
pub fn admit(
    record: &TariffRecord,
    exclusion_keywords: &[String],
    now: DateTime<Utc>,
) -> Option<Rejection> {
    if record.rate_structure.is_empty() {
        return Some(Rejection::MissingRateStructure);
    }
    if !record.weekday_schedule.is_well_formed() || !record.weekend_schedule.is_well_formed() {
        return Some(Rejection::MalformedSchedule);
    }
    if record.end_date.is_some_and(|end_date| end_date < now) {
        return Some(Rejection::Expired);
    }
    let name = record.name.to_lowercase();
    if let Some(keyword) =
        exclusion_keywords.iter().find(|keyword| name.contains(&keyword.to_lowercase()))
    {
        return Some(Rejection::Keyword(keyword.clone()));
    }
    if tier_units(record)
        .iter()
        .any(|unit| !matches!(unit, TierUnit::Monthly | TierUnit::Daily))
    {
        return Some(Rejection::UnsupportedUnits);
    }
    if record.rate_structure.iter().flatten().any(|tier| tier.rate.is_none()) {
        return Some(Rejection::MissingRate);
    }
    if !is_conforming(record) {
        return Some(Rejection::NonConformingTierStructure);
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::tariff::{RateTier, tests::minimal_record};

    fn flat_rate_record(name: &str) -> TariffRecord {
        let mut record = minimal_record(name);
        record.rate_structure = vec![vec![RateTier { rate: Some(0.1.into()), ..RateTier::default() }]];
        record
    }

    #[test]
    fn test_admits_flat_rate() {
        assert_eq!(admit(&flat_rate_record("Residential"), &[], Utc::now()), None);
    }

    #[test]
    fn test_rejects_missing_rate_structure() {
        assert_eq!(
            admit(&minimal_record("Residential"), &[], Utc::now()),
            Some(Rejection::MissingRateStructure)
        );
    }

    #[test]
    fn test_rejects_expired() {
        let mut record = flat_rate_record("Residential");
        record.end_date = Some(Utc::now() - TimeDelta::days(1));
        assert_eq!(admit(&record, &[], Utc::now()), Some(Rejection::Expired));

        record.end_date = Some(Utc::now() + TimeDelta::days(365));
        assert_eq!(admit(&record, &[], Utc::now()), None);
    }

    #[test]
    fn test_rejects_keyword_case_insensitively() {
        let record = flat_rate_record("Residential LIGHTING Service");
        let keywords = vec!["lighting".to_string()];
        assert_eq!(admit(&record, &keywords, Utc::now()), Some(Rejection::Keyword("lighting".to_string())));
    }

    #[test]
    fn test_rejects_unsupported_units() {
        let mut record = flat_rate_record("Residential");
        record.rate_structure[0][0].max = Some(100.0.into());
        record.rate_structure[0][0].unit = Some("kW".to_string());
        assert_eq!(admit(&record, &[], Utc::now()), Some(Rejection::UnsupportedUnits));
    }

    #[test]
    fn test_rejects_ceiling_without_unit() {
        let mut record = flat_rate_record("Residential");
        record.rate_structure[0][0].max = Some(100.0.into());
        assert_eq!(admit(&record, &[], Utc::now()), Some(Rejection::UnsupportedUnits));
    }

    #[test]
    fn test_rejects_missing_rate() {
        let mut record = flat_rate_record("Residential");
        record.rate_structure[0].push(RateTier::default());
        assert_eq!(admit(&record, &[], Utc::now()), Some(Rejection::MissingRate));
    }

    #[test]
    fn test_rejects_non_conforming_tiers() {
        let mut record = flat_rate_record("Residential");
        record.weekend_schedule.0 = vec![vec![1; 24]; 12];
        record.rate_structure = vec![
            vec![
                RateTier {
                    rate: Some(0.1.into()),
                    max: Some(100.0.into()),
                    unit: Some("kWh".to_string()),
                    adjustment: None,
                },
                RateTier { rate: Some(0.2.into()), ..RateTier::default() },
            ],
            vec![
                RateTier {
                    rate: Some(0.1.into()),
                    max: Some(200.0.into()),
                    unit: Some("kWh".to_string()),
                    adjustment: None,
                },
                RateTier { rate: Some(0.2.into()), ..RateTier::default() },
            ],
        ];
        assert_eq!(admit(&record, &[], Utc::now()), Some(Rejection::NonConformingTierStructure));
    }
}
