//! Calendar helpers shared by every analyzer.
//!
//! Completion days travel as `yyyy-MM-dd` date-keys and months as `yyyy-MM`
//! month-keys. Everything here works on [`NaiveDate`], so a single notion of
//! "local day" holds for a whole derivation pass; the only clock read is
//! [`local_today`], used at the HTTP boundary.

use crate::errors::DateKeyError;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
pub const MONTH_KEY_FORMAT: &str = "%Y-%m";

const MONTH_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn to_date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a `yyyy-MM-dd` key. Only the canonical zero-padded form is
/// accepted, so `to_date_key(parse_date_key(k)?) == k` always holds.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, DateKeyError> {
    let trimmed = key.trim();
    match NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT) {
        Ok(date) if to_date_key(date) == trimmed => Ok(date),
        _ => Err(DateKeyError::new(key)),
    }
}

pub fn month_key(date: NaiveDate) -> String {
    date.format(MONTH_KEY_FORMAT).to_string()
}

/// Parses a `yyyy-MM` key into the first day of that month.
pub fn parse_month_key(key: &str) -> Result<NaiveDate, DateKeyError> {
    let trimmed = key.trim();
    let first = parse_date_key(&format!("{trimmed}-01")).map_err(|_| DateKeyError::new(key))?;
    Ok(first)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month `delta` whole months away from `date`'s month.
/// Saturates at the edges of chrono's representable range.
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(date);
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(first)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Gregorian day count; `month_index` is zero-based (0 = January).
/// Returns 0 for an index outside `0..12`.
pub fn days_in_month(year: i32, month_index: u32) -> u32 {
    match month_index {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => 0,
    }
}

/// Caps a selected month at the reference month; months never run ahead of today.
pub fn clamp_month(selected: NaiveDate, reference: NaiveDate) -> NaiveDate {
    let selected = first_of_month(selected);
    let reference = first_of_month(reference);
    selected.min(reference)
}

/// First day of an inclusive trailing window of `days` days ending at `reference`.
pub fn window_start(reference: NaiveDate, days: u32) -> NaiveDate {
    let span = i64::from(days.saturating_sub(1));
    reference
        .checked_sub_signed(Duration::days(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Day-of-week ordinal with 0 = Sunday through 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_sunday() as usize
}

pub fn month_short_label(date: NaiveDate) -> &'static str {
    MONTH_SHORT[date.month0() as usize]
}
