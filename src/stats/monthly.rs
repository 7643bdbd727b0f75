use super::count_in_month;
use crate::dates::{add_months, month_key, month_short_label};
use crate::models::{
    Habit, HabitMonthCount, MonthBar, MonthOverview, MonthTotal, MonthlyRow, TrendPoint,
    TrendSeries,
};
use chrono::{Datelike, NaiveDate};
use std::cmp::Ordering;

/// Trailing months of per-habit completion counts, oldest first.
#[derive(Debug, Clone)]
pub struct MonthlyWindow {
    pub rows: Vec<MonthlyRow>,
}

impl MonthlyWindow {
    /// Builds `window` rows ending at (and including) the reference month.
    pub fn build(habits: &[Habit], reference: NaiveDate, window: u32) -> Self {
        let rows = (0..window)
            .rev()
            .map(|back| {
                let month = add_months(reference, -(back as i32));
                MonthlyRow {
                    month_index: month.month0(),
                    year: month.year(),
                    label: month_short_label(month).to_string(),
                    per_habit: habits
                        .iter()
                        .map(|habit| (habit.id.clone(), count_in_month(&habit.completed_dates, month)))
                        .collect(),
                }
            })
            .collect();

        Self { rows }
    }

    /// Sum of one habit's completions across every month in the window.
    pub fn total_for(&self, habit_id: &str) -> u32 {
        self.rows
            .iter()
            .map(|row| row.per_habit.get(habit_id).copied().unwrap_or(0))
            .sum()
    }

    pub fn monthly_totals(&self) -> Vec<MonthTotal> {
        self.rows
            .iter()
            .map(|row| MonthTotal {
                label: row.label.clone(),
                year: row.year,
                month_index: row.month_index,
                total: row.per_habit.values().sum(),
            })
            .collect()
    }

    pub fn find(&self, month: NaiveDate) -> Option<&MonthlyRow> {
        self.rows
            .iter()
            .find(|row| row.year == month.year() && row.month_index == month.month0())
    }
}

/// Orders by count descending, then name ascending.
pub(crate) fn by_count_then_name(a_count: u32, a_name: &str, b_count: u32, b_name: &str) -> Ordering {
    b_count.cmp(&a_count).then_with(|| a_name.cmp(b_name))
}

pub fn trend_series(habits: &[Habit], window: &MonthlyWindow) -> Vec<TrendSeries> {
    let mut series: Vec<TrendSeries> = habits
        .iter()
        .map(|habit| {
            let points: Vec<TrendPoint> = window
                .rows
                .iter()
                .map(|row| TrendPoint {
                    label: row.label.clone(),
                    value: row.per_habit.get(&habit.id).copied().unwrap_or(0),
                })
                .collect();
            let max_value = points.iter().map(|p| p.value).max().unwrap_or(0).max(1);

            TrendSeries {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                total: window.total_for(&habit.id),
                max_value,
                points,
            }
        })
        .collect();

    series.sort_by(|a, b| by_count_then_name(a.total, &a.name, b.total, &b.name));
    series
}

fn ranked_month_counts(habits: &[Habit], month: NaiveDate) -> Vec<HabitMonthCount> {
    let mut rows: Vec<HabitMonthCount> = habits
        .iter()
        .map(|habit| HabitMonthCount {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            completions: count_in_month(&habit.completed_dates, month),
        })
        .collect();
    rows.sort_by(|a, b| by_count_then_name(a.completions, &a.name, b.completions, &b.name));
    rows
}

/// Top and bottom performers of the selected month. Falls back to the newest
/// month of the window when the selection lies outside it.
pub fn month_overview(habits: &[Habit], window: &MonthlyWindow, selected: NaiveDate) -> MonthOverview {
    let month = match window.find(selected) {
        Some(_) => selected,
        None => window
            .rows
            .last()
            .and_then(|row| NaiveDate::from_ymd_opt(row.year, row.month_index + 1, 1))
            .unwrap_or(selected),
    };

    let ranked = ranked_month_counts(habits, month);
    let top = ranked.iter().take(3).cloned().collect();
    let bottom = ranked.iter().rev().take(3).cloned().collect();
    let max_completions = ranked.first().map_or(0, |row| row.completions).max(1);

    MonthOverview {
        year: month.year(),
        month_index: month.month0(),
        ranked,
        top,
        bottom,
        max_completions,
    }
}

/// Per-habit counts for one month, optionally narrowed by a name query.
/// The bar scale is computed before filtering.
pub fn month_bar(habits: &[Habit], month: NaiveDate, query: Option<&str>) -> MonthBar {
    let ranked = ranked_month_counts(habits, month);
    let max_completions = ranked.first().map_or(0, |row| row.completions).max(1);

    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let rows = if needle.is_empty() {
        ranked
    } else {
        ranked
            .into_iter()
            .filter(|row| row.name.to_lowercase().contains(&needle))
            .collect()
    };

    MonthBar {
        month: month_key(month),
        rows,
        max_completions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Habit> {
        vec![
            Habit::new(
                "1",
                "Reading",
                [ymd(2025, 5, 3), ymd(2025, 9, 1), ymd(2025, 10, 1), ymd(2025, 10, 2)],
            ),
            Habit::new("2", "Gym", [ymd(2025, 4, 30), ymd(2025, 10, 5), ymd(2025, 11, 1)]),
            Habit::new("3", "Water", Vec::<NaiveDate>::new()),
        ]
    }

    #[test]
    fn window_is_oldest_first_and_includes_reference_month() {
        let window = MonthlyWindow::build(&sample(), ymd(2025, 10, 22), 6);
        let months: Vec<(i32, u32)> = window.rows.iter().map(|r| (r.year, r.month_index)).collect();
        assert_eq!(
            months,
            vec![(2025, 4), (2025, 5), (2025, 6), (2025, 7), (2025, 8), (2025, 9)]
        );
        assert_eq!(window.rows[0].label, "May");
        assert_eq!(window.rows[5].per_habit["1"], 2);
        assert_eq!(window.rows[5].per_habit["3"], 0);
    }

    #[test]
    fn totals_ignore_months_outside_window() {
        let window = MonthlyWindow::build(&sample(), ymd(2025, 10, 22), 6);
        assert_eq!(window.total_for("1"), 4);
        // April and November fall outside May..October.
        assert_eq!(window.total_for("2"), 1);
        assert_eq!(window.total_for("missing"), 0);

        let totals: Vec<u32> = window.monthly_totals().iter().map(|t| t.total).collect();
        assert_eq!(totals, vec![1, 0, 0, 0, 1, 3]);
    }

    #[test]
    fn window_spans_year_boundary() {
        let window = MonthlyWindow::build(&[], ymd(2026, 2, 14), 6);
        assert_eq!(window.rows[0].year, 2025);
        assert_eq!(window.rows[0].month_index, 8);
        assert_eq!(window.rows[5].year, 2026);
        assert_eq!(window.rows[5].month_index, 1);
    }

    #[test]
    fn trend_ties_break_by_name() {
        let habits = vec![
            Habit::new("a", "Zumba", [ymd(2025, 10, 1)]),
            Habit::new("b", "Art", [ymd(2025, 10, 2)]),
            Habit::new("c", "Code", [ymd(2025, 10, 3), ymd(2025, 10, 4)]),
        ];
        let window = MonthlyWindow::build(&habits, ymd(2025, 10, 22), 6);
        let names: Vec<_> = trend_series(&habits, &window).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Code", "Art", "Zumba"]);
    }

    #[test]
    fn overview_falls_back_to_newest_month() {
        let habits = sample();
        let window = MonthlyWindow::build(&habits, ymd(2025, 10, 22), 6);

        let overview = month_overview(&habits, &window, ymd(2024, 1, 1));
        assert_eq!((overview.year, overview.month_index), (2025, 9));
        assert_eq!(overview.top[0].name, "Reading");
        assert_eq!(overview.bottom[0].name, "Water");
        assert_eq!(overview.max_completions, 2);
    }

    #[test]
    fn month_bar_filters_after_scaling() {
        let bar = month_bar(&sample(), ymd(2025, 10, 1), Some("  gy "));
        assert_eq!(bar.month, "2025-10");
        assert_eq!(bar.rows.len(), 1);
        assert_eq!(bar.rows[0].name, "Gym");
        assert_eq!(bar.max_completions, 2);
    }

    #[test]
    fn empty_month_bar_scale_is_floored() {
        let bar = month_bar(&[], ymd(2025, 10, 1), None);
        assert!(bar.rows.is_empty());
        assert_eq!(bar.max_completions, 1);
    }
}
