//! Calendar-aware date arithmetic.
//!
//! Month and year stepping clamps the day of month to the target month's
//! length (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year) instead of
//! producing an invalid date or drifting by a fixed duration.

use chrono::{Datelike, Duration, NaiveDate};

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is always valid");
    (first_of_next - Duration::days(1)).day()
}

/// Shifts a date by a number of calendar months, clamping the day of month.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let zero_based = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = zero_based.div_euclid(12);
    let month = zero_based.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid")
}

/// Shifts a date by a number of calendar years, clamping Feb 29 to Feb 28
/// in non-leap target years.
pub fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    shift_months(date, years * 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn days_in_month_covers_lengths() {
        assert_eq!(days_in_month(2022, 1), 31);
        assert_eq!(days_in_month(2022, 4), 30);
        assert_eq!(days_in_month(2022, 2), 28);
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2022, 12), 31);
    }

    #[test]
    fn shift_months_plain() {
        assert_eq!(shift_months(date(2022, 1, 15), 1), date(2022, 2, 15));
        assert_eq!(shift_months(date(2022, 1, 15), 3), date(2022, 4, 15));
    }

    #[test]
    fn shift_months_clamps_end_of_month() {
        assert_eq!(shift_months(date(2022, 1, 31), 1), date(2022, 2, 28));
        assert_eq!(shift_months(date(2020, 1, 31), 1), date(2020, 2, 29));
        assert_eq!(shift_months(date(2022, 3, 31), 1), date(2022, 4, 30));
    }

    #[test]
    fn shift_months_rolls_over_years() {
        assert_eq!(shift_months(date(2022, 11, 20), 3), date(2023, 2, 20));
        assert_eq!(shift_months(date(2022, 12, 31), 14), date(2024, 2, 29));
    }

    #[test]
    fn shift_months_negative() {
        assert_eq!(shift_months(date(2022, 3, 31), -1), date(2022, 2, 28));
        assert_eq!(shift_months(date(2022, 1, 15), -2), date(2021, 11, 15));
    }

    #[test]
    fn shift_years_clamps_leap_day() {
        assert_eq!(shift_years(date(2020, 2, 29), 1), date(2021, 2, 28));
        assert_eq!(shift_years(date(2020, 2, 29), 4), date(2024, 2, 29));
    }
}
