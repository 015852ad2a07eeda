//! Calendar constants: how many weekdays and weekend days an average month has.
//!
//! The counts are fractional: they average out leap years and weekday drift
//! (365.25 days / 7 ≈ 52.18 weeks a year), so a 31-day month gets 22.14 weekdays
//! and 8.86 weekend days.

use std::fmt::{Display, Formatter};

/// Index with `month - 1`.
pub const WEEKDAYS_PER_MONTH: [f64; 12] = [
    22.142_857_14,
    20.178_571_43,
    22.142_857_14,
    21.428_571_43,
    22.142_857_14,
    21.428_571_43,
    22.142_857_14,
    22.142_857_14,
    21.428_571_43,
    22.142_857_14,
    21.428_571_43,
    22.142_857_14,
];

/// Index with `month - 1`.
pub const WEEKEND_DAYS_PER_MONTH: [f64; 12] = [
    8.857_142_857,
    8.071_428_571,
    8.857_142_857,
    8.571_428_571,
    8.857_142_857,
    8.571_428_571,
    8.857_142_857,
    8.857_142_857,
    8.571_428_571,
    8.857_142_857,
    8.571_428_571,
    8.857_142_857,
];

/// Partition of a month used when converting between monthly and daily quantities.
///
/// Tariffs with monthly tier ceilings cannot distinguish weekdays from weekends,
/// so they are costed over [`DayType::Total`]; tariffs with daily ceilings are
/// costed over [`DayType::Weekday`] and [`DayType::Weekend`] separately.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DayType {
    Weekday,
    Weekend,
    Total,
}

impl DayType {
    /// Average number of days of this type in the given month (1-based).
    #[must_use]
    pub fn days_in_month(self, month: u32) -> f64 {
        let index = (month - 1) as usize;
        match self {
            Self::Weekday => WEEKDAYS_PER_MONTH[index],
            Self::Weekend => WEEKEND_DAYS_PER_MONTH[index],
            Self::Total => WEEKDAYS_PER_MONTH[index] + WEEKEND_DAYS_PER_MONTH[index],
        }
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weekday => write!(f, "weekday"),
            Self::Weekend => write!(f, "weekend"),
            Self::Total => write!(f, "total"),
        }
    }
}

/// Multiplier that turns a monthly quantity into a daily one for the given
/// month (1-based) and day type. Dividing by it converts back.
#[must_use]
pub fn daily_conversion_factor(month: u32, day_type: DayType) -> f64 {
    1.0 / day_type.days_in_month(month)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_day_counts_add_up_to_month_lengths() {
        let month_lengths =
            [31.0, 28.25, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0];
        for (index, length) in month_lengths.into_iter().enumerate() {
            let month = (index + 1) as u32;
            assert_abs_diff_eq!(DayType::Total.days_in_month(month), length, epsilon = 0.5);
        }
    }

    #[test]
    fn test_conversion_factor_round_trips() {
        for month in 1..=12 {
            for day_type in [DayType::Weekday, DayType::Weekend, DayType::Total] {
                let factor = daily_conversion_factor(month, day_type);
                assert_abs_diff_eq!(factor * day_type.days_in_month(month), 1.0, epsilon = 1e-12);
                let daily = 150.0 * factor;
                assert_abs_diff_eq!(daily / factor, 150.0, epsilon = 1e-9);
            }
        }
    }
}
