//! Reporting period calendar rules
//!
//! Each return line carries a single reference date. The period it covers
//! depends on the return frequency:
//!
//! - **day**: the reference date itself
//! - **week**: the regulatory week, Sunday to Saturday, containing the date
//! - **month**: the calendar month containing the date
//! - **year**: one year starting on the date

use crate::domain::ids::ISO_DATE_FORMAT;
use crate::domain::Frequency;
use chrono::{Datelike, Days, Months, NaiveDate};

/// First day of the period containing `date`
pub fn get_start_date(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day | Frequency::Year => date,
        Frequency::Week => date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
            .unwrap_or(NaiveDate::MIN),
        Frequency::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Last day of the period containing `date`
///
/// # Examples
///
/// ```
/// use rill::core::mapping::dates::get_end_date;
/// use rill::domain::Frequency;
/// use chrono::NaiveDate;
///
/// let d = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
/// assert_eq!(get_end_date(d, Frequency::Week), NaiveDate::from_ymd_opt(2019, 1, 5).unwrap());
/// ```
pub fn get_end_date(date: NaiveDate, frequency: Frequency) -> NaiveDate {
    match frequency {
        Frequency::Day => date,
        Frequency::Week => get_start_date(date, Frequency::Week)
            .checked_add_days(Days::new(6))
            .unwrap_or(NaiveDate::MAX),
        Frequency::Month => get_start_date(date, Frequency::Month)
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX),
        Frequency::Year => date
            .checked_add_months(Months::new(12))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX),
    }
}

/// `(start, end)` of the period containing `date`
pub fn line_period(date: NaiveDate, frequency: Frequency) -> (NaiveDate, NaiveDate) {
    (
        get_start_date(date, frequency),
        get_end_date(date, frequency),
    )
}

/// Parses a `YYYY-MM-DD` date read from element `element`
///
/// # Errors
///
/// Returns a description of the problem if the text is not an ISO calendar
/// date.
pub fn parse_iso_date(text: &str, element: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text.trim(), ISO_DATE_FORMAT)
        .map_err(|e| format!("Invalid date '{text}' in {element}: {e}"))
}
