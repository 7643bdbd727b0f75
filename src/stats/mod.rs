//! Habit analytics.
//!
//! Every function here is pure: it takes the habit snapshot plus an explicit
//! reference date and never reads the clock.

pub mod compare;
pub mod distribution;
pub mod habit;
pub mod monthly;
pub mod ranking;

use crate::dates::{first_of_month, last_of_month, window_start};
use crate::models::{Dashboard, Habit, HabitRow, OrderBy, Summary, Tab};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

pub use compare::{ComparisonFilter, compare_months, momentum, pct_change};
pub use distribution::{heatmap, weekday_distribution};
pub use habit::{derive_metrics, month_grid, streak};
pub use monthly::{MonthlyWindow, month_bar, month_overview, trend_series};
pub use ranking::{at_risk, consistency, pareto};

pub const DEFAULT_WINDOW_MONTHS: u32 = 6;

/// Per-request analyzer configuration.
#[derive(Debug, Clone)]
pub struct AnalyticsOptions {
    pub reference_date: NaiveDate,
    pub window_months: u32,
    /// Case-insensitive name substring; `None` analyzes every habit.
    pub habit_filter: Option<String>,
}

impl AnalyticsOptions {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            window_months: DEFAULT_WINDOW_MONTHS,
            habit_filter: None,
        }
    }

    pub fn select(&self, habits: &[Habit]) -> Vec<Habit> {
        match self.habit_filter.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => habits
                .iter()
                .filter(|habit| name_matches(&habit.name, needle))
                .cloned()
                .collect(),
            _ => habits.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub query: Option<String>,
    pub tab: Tab,
    pub order_by: OrderBy,
}

pub(crate) fn count_in_range(dates: &BTreeSet<NaiveDate>, start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    dates.range(start..=end).count() as u32
}

/// Completions falling in the calendar month that contains `month`.
pub(crate) fn count_in_month(dates: &BTreeSet<NaiveDate>, month: NaiveDate) -> u32 {
    count_in_range(dates, first_of_month(month), last_of_month(month))
}

fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.to_lowercase())
}

pub fn habit_row(habit: &Habit, today: NaiveDate) -> HabitRow {
    HabitRow {
        id: habit.id.clone(),
        name: habit.name.clone(),
        total: habit.total(),
        metrics: derive_metrics(&habit.completed_dates, today),
    }
}

/// Habit cards filtered by name and tab, then ordered. Sorting is stable.
pub fn list_habits(habits: &[Habit], today: NaiveDate, options: &ListOptions) -> Vec<HabitRow> {
    let needle = options.query.as_deref().map(str::trim).unwrap_or("");

    let mut rows: Vec<HabitRow> = habits
        .iter()
        .filter(|habit| needle.is_empty() || name_matches(&habit.name, needle))
        .map(|habit| habit_row(habit, today))
        .filter(|row| match options.tab {
            Tab::All => true,
            Tab::Today => row.metrics.due_today,
            Tab::Done => !row.metrics.due_today,
        })
        .collect();

    match options.order_by {
        OrderBy::Streak => rows.sort_by(|a, b| b.metrics.streak.cmp(&a.metrics.streak)),
        OrderBy::Name => rows.sort_by(|a, b| a.name.cmp(&b.name)),
        OrderBy::Month => rows.sort_by(|a, b| b.metrics.month_count.cmp(&a.metrics.month_count)),
    }
    rows
}

pub fn summary(habits: &[Habit], today: NaiveDate) -> Summary {
    let metrics: Vec<_> = habits
        .iter()
        .map(|habit| derive_metrics(&habit.completed_dates, today))
        .collect();
    let due_today = metrics.iter().filter(|m| m.due_today).count();

    let start = window_start(today, ranking::CONSISTENCY_DAYS);
    let done_30d: u32 = habits
        .iter()
        .map(|habit| count_in_range(&habit.completed_dates, start, today))
        .sum();
    let slots = habits.len() as f64 * f64::from(ranking::CONSISTENCY_DAYS);
    let rate_30d = if slots > 0.0 {
        (f64::from(done_30d) / slots).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Summary {
        active: habits.len(),
        due_today,
        done_today: habits.len() - due_today,
        month_total: metrics.iter().map(|m| m.month_count).sum(),
        rate_30d,
    }
}

/// Every analytics view for one snapshot.
pub fn build_dashboard_at(habits: &[Habit], options: &AnalyticsOptions) -> Dashboard {
    let today = options.reference_date;
    let window_months = options.window_months.max(1);
    let habits = options.select(habits);

    let window = MonthlyWindow::build(&habits, today, window_months);
    debug!(
        habits = habits.len(),
        window_months,
        reference = %today,
        "building dashboard"
    );

    Dashboard {
        reference_date: today,
        window_months,
        has_completions: habits.iter().any(|h| !h.completed_dates.is_empty()),
        summary: summary(&habits, today),
        habits: habits.iter().map(|habit| habit_row(habit, today)).collect(),
        monthly_totals: window.monthly_totals(),
        trend: trend_series(&habits, &window),
        weekdays: weekday_distribution(&habits, today, window_months),
        heatmap: heatmap(&habits, today),
        consistency: consistency(&habits, today),
        momentum: momentum(&habits, today),
        pareto: pareto(&habits, &window),
        at_risk: at_risk(&habits, today),
        monthly: window.rows,
    }
}
