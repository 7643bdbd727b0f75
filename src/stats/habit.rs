use super::{count_in_month, count_in_range};
use crate::dates::{days_in_month, first_of_month, month_key, weekday_index};
use crate::models::{CalendarDay, HabitMetrics, MonthGrid};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Derives the card metrics for one habit as of `today`.
pub fn derive_metrics(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> HabitMetrics {
    let month_count = count_in_month(dates, today);

    HabitMetrics {
        streak: streak(dates, today),
        month_count,
        month_progress_pct: month_progress(month_count, today),
        due_today: !dates.contains(&today),
        last_date: dates.last().copied(),
    }
}

/// Length of the run of consecutive completed days ending at the anchor.
///
/// The anchor is `today` when it is completed, otherwise the latest completed
/// day on or before `today`. Completions dated after `today` never anchor a run.
pub fn streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&anchor) = dates.range(..=today).next_back() else {
        return 0;
    };

    let mut count = 0;
    let mut cursor = Some(anchor);
    while let Some(day) = cursor {
        if !dates.contains(&day) {
            break;
        }
        count += 1;
        cursor = day.pred_opt();
    }
    count
}

fn month_progress(month_count: u32, date: NaiveDate) -> f64 {
    let days = days_in_month(date.year(), date.month0()).max(1);
    (f64::from(month_count) / f64::from(days)).clamp(0.0, 1.0)
}

/// Calendar grid for the month containing `month`, Sunday-first.
pub fn month_grid(dates: &BTreeSet<NaiveDate>, month: NaiveDate) -> MonthGrid {
    let first = first_of_month(month);
    let total_days = days_in_month(first.year(), first.month0());

    let days: Vec<CalendarDay> = first
        .iter_days()
        .take(total_days as usize)
        .map(|date| CalendarDay {
            day: date.day(),
            date,
            done: dates.contains(&date),
        })
        .collect();

    let month_count = match days.last() {
        Some(last) => count_in_range(dates, first, last.date),
        None => 0,
    };

    MonthGrid {
        month: month_key(first),
        year: first.year(),
        month_index: first.month0(),
        leading_blanks: weekday_index(first) as u32,
        days,
        month_count,
        days_in_month: total_days,
        progress_pct: month_progress(month_count, first),
    }
}
