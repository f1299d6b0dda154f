//! Calendar date <-> continuous fractional-year coordinate.
//!
//! Every model in this crate is fit against `t = year + ordinal / days_in_year`.
//! The slope of `t` changes slightly at year boundaries (1/365 vs 1/366 per day);
//! fitted parameters depend on exactly this mapping, so it must not be "fixed".

use chrono::{Datelike, NaiveDate};

use crate::error::{AppError, Result};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Map a date to its fractional-year coordinate.
pub fn year_index(date: NaiveDate) -> f64 {
    let year = date.year();
    year as f64 + date.ordinal() as f64 / days_in_year(year) as f64
}

/// Inverse of [`year_index`], rounding to the nearest day of year.
///
/// The day of year is clamped into `[1, days_in_year]`, so `2024.0` maps to
/// 2024-01-01 rather than the last day of 2023.
pub fn date_from_year_index(t: f64) -> Result<NaiveDate> {
    if !t.is_finite() {
        return Err(AppError::invalid_input(format!("non-finite year index {t}")));
    }
    let floor = t.floor();
    if floor < i32::MIN as f64 || floor > i32::MAX as f64 {
        return Err(AppError::invalid_input(format!("year index {t} out of range")));
    }
    let year = floor as i32;
    let days = days_in_year(year);
    let ordinal = ((t - floor) * days as f64).round().clamp(1.0, days as f64) as u32;

    NaiveDate::from_yo_opt(year, ordinal)
        .ok_or_else(|| AppError::invalid_input(format!("year index {t} is not a representable date")))
}

/// Exact number of calendar days from `start` to `end` (negative if reversed).
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    end.signed_duration_since(start).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_year(2020), 366);
        assert_eq!(days_in_year(2021), 365);
    }

    #[test]
    fn year_index_uses_ordinal_over_year_length() {
        assert_abs_diff_eq!(year_index(date(2021, 1, 1)), 2021.0 + 1.0 / 365.0, epsilon = 1e-12);
        assert_abs_diff_eq!(year_index(date(2020, 1, 1)), 2020.0 + 1.0 / 366.0, epsilon = 1e-12);
        // Last day of a year lands exactly on the next integer.
        assert_abs_diff_eq!(year_index(date(2023, 12, 31)), 2024.0, epsilon = 1e-12);
        assert_abs_diff_eq!(year_index(date(2024, 12, 31)), 2025.0, epsilon = 1e-12);
    }

    #[test]
    fn year_index_is_monotonic_across_boundaries() {
        let mut prev = year_index(date(2019, 12, 25));
        let mut d = date(2019, 12, 26);
        while d <= date(2021, 1, 10) {
            let t = year_index(d);
            assert!(t > prev, "{d}: {t} <= {prev}");
            prev = t;
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn inverse_recovers_dates() {
        for d in [date(2020, 1, 1), date(2020, 2, 29), date(2021, 7, 15), date(1999, 6, 30)] {
            assert_eq!(date_from_year_index(year_index(d)).unwrap(), d);
        }
        assert_eq!(date_from_year_index(2024.0).unwrap(), date(2024, 1, 1));
        assert!(date_from_year_index(f64::NAN).is_err());
    }

    #[test]
    fn days_between_counts_leap_days() {
        assert_eq!(days_between(date(2020, 1, 1), date(2021, 1, 1)), 366);
        assert_eq!(days_between(date(2021, 1, 1), date(2022, 1, 1)), 365);
        assert_eq!(days_between(date(2022, 1, 1), date(2021, 1, 1)), -365);
    }
}
