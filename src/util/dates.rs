use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

/// First day of the month `date` falls in.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 is valid for every month")
}

/// Schedules are frozen once their month has passed: anything dated before
/// the first day of the current month is read-only, the first day itself is
/// still editable.
pub fn is_editable(schedule_date: NaiveDate, today: NaiveDate) -> bool {
    schedule_date >= start_of_month(today)
}

/// Parse a `YYYY-MM` month selector value into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let (year, month) = value.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Half-open date range covering one month: `[first day, first day of next)`.
pub fn month_range(first_day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let next = first_day + Months::new(1);
    (first_day, next)
}

pub fn month_value(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Month choices offered by the report selector: three months back through
/// twelve months ahead, anchored at `today`.
pub fn month_options(today: NaiveDate) -> Vec<MonthOption> {
    let anchor = start_of_month(today);
    let mut options = Vec::with_capacity(16);
    for offset in -3i32..=12 {
        let month = if offset < 0 {
            anchor - Months::new(offset.unsigned_abs())
        } else {
            anchor + Months::new(offset as u32)
        };
        options.push(MonthOption {
            value: month_value(month),
            label: month_label(month),
        });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn first_of_current_month_is_editable() {
        let today = d(2026, 8, 29);
        assert!(is_editable(d(2026, 8, 1), today));
    }

    #[test]
    fn last_day_of_previous_month_is_locked() {
        let today = d(2026, 8, 29);
        assert!(!is_editable(d(2026, 7, 31), today));
    }

    #[test]
    fn future_months_are_editable() {
        let today = d(2026, 8, 29);
        assert!(is_editable(d(2026, 9, 1), today));
        assert!(is_editable(d(2027, 1, 15), today));
    }

    #[test]
    fn parses_month_selector_value() {
        assert_eq!(parse_month("2026-08"), Some(d(2026, 8, 1)));
        assert_eq!(parse_month("2026-13"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn month_range_is_half_open() {
        let (start, end) = month_range(d(2026, 12, 1));
        assert_eq!(start, d(2026, 12, 1));
        assert_eq!(end, d(2027, 1, 1));
    }

    #[test]
    fn month_options_window() {
        let options = month_options(d(2026, 8, 29));
        assert_eq!(options.len(), 16);
        assert_eq!(options[0].value, "2026-05");
        assert_eq!(options[3].value, "2026-08");
        assert_eq!(options[3].label, "August 2026");
        assert_eq!(options[15].value, "2027-08");
    }

    #[test]
    fn month_options_cross_year_boundary() {
        let options = month_options(d(2026, 1, 10));
        assert_eq!(options[0].value, "2025-10");
        assert_eq!(options[0].label, "October 2025");
    }
}
