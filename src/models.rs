use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ----- stored habits -----

/// A habit as the store keeps it: raw date-keys, validated on the way out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HabitRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed_dates: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HabitData {
    #[serde(default)]
    pub habits: Vec<HabitRecord>,
}

// ----- collaborator boundary -----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
}

/// Per-habit calendar fetch result.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HabitCalendar {
    #[serde(default)]
    pub completed_dates: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A habit with validated completion history, ready for analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub completed_dates: BTreeSet<NaiveDate>,
    pub created_at: Option<String>,
}

impl Habit {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        completed_dates: impl IntoIterator<Item = NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed_dates: completed_dates.into_iter().collect(),
            created_at: None,
        }
    }

    /// Fallback used when a habit's history could not be fetched.
    pub fn without_history(summary: HabitSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            completed_dates: BTreeSet::new(),
            created_at: None,
        }
    }

    pub fn summary(&self) -> HabitSummary {
        HabitSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn total(&self) -> u32 {
        self.completed_dates.len() as u32
    }
}

// ----- per-habit metrics -----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HabitMetrics {
    pub streak: u32,
    pub month_count: u32,
    /// Ratio in `[0, 1]`.
    pub month_progress_pct: f64,
    pub due_today: bool,
    /// `None` when the habit has never been completed.
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitRow {
    pub id: String,
    pub name: String,
    pub total: u32,
    #[serde(flatten)]
    pub metrics: HabitMetrics,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub active: usize,
    pub due_today: usize,
    pub done_today: usize,
    pub month_total: u32,
    /// Ratio in `[0, 1]`.
    pub rate_30d: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub month: String,
    pub year: i32,
    pub month_index: u32,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
    pub month_count: u32,
    pub days_in_month: u32,
    /// Ratio in `[0, 1]`.
    pub progress_pct: f64,
}

// ----- multi-month window -----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyRow {
    pub month_index: u32,
    pub year: i32,
    pub label: String,
    pub per_habit: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTotal {
    pub label: String,
    pub year: i32,
    pub month_index: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub value: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub habit_id: String,
    pub name: String,
    pub total: u32,
    pub max_value: u32,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HabitMonthCount {
    pub habit_id: String,
    pub name: String,
    pub completions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOverview {
    pub year: i32,
    pub month_index: u32,
    pub ranked: Vec<HabitMonthCount>,
    pub top: Vec<HabitMonthCount>,
    /// Lowest first.
    pub bottom: Vec<HabitMonthCount>,
    pub max_completions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthBar {
    pub month: String,
    pub rows: Vec<HabitMonthCount>,
    pub max_completions: u32,
}

// ----- distributions -----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekdayDistribution {
    /// Index 0 is Sunday.
    pub counts: [u32; 7],
    pub max_count: u32,
    pub best_index: usize,
    pub worst_index: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    pub cells: Vec<HeatmapCell>,
    pub max_count: u32,
}

// ----- comparisons -----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonRow {
    pub habit_id: String,
    pub name: String,
    pub count_month1: u32,
    pub count_month2: u32,
    pub diff: i64,
    pub pct_change: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthComparison {
    pub month1: String,
    pub month2: String,
    pub rows: Vec<ComparisonRow>,
    pub top_gains: Vec<ComparisonRow>,
    pub top_losses: Vec<ComparisonRow>,
    pub total_month1: u32,
    pub total_month2: u32,
    pub total_diff: i64,
    pub total_pct_change: i64,
    pub max_value: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MomentumRow {
    pub habit_id: String,
    pub name: String,
    pub previous: u32,
    pub current: u32,
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Momentum {
    pub previous_month: String,
    pub current_month: String,
    pub gainers: Vec<MomentumRow>,
    pub decliners: Vec<MomentumRow>,
}

// ----- rankings -----

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParetoRow {
    pub habit_id: String,
    pub name: String,
    pub total: u32,
    pub share_pct: f64,
    pub cumulative_pct: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParetoReport {
    pub rows: Vec<ParetoRow>,
    pub grand_total: u32,
    /// Zero-based index of the first row whose cumulative share reaches 80%.
    pub idx80: usize,
    pub habits_for_80: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConsistencyRow {
    pub habit_id: String,
    pub name: String,
    pub done: u32,
    pub pct: u32,
}

// ----- responses -----

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub reference_date: NaiveDate,
    pub window_months: u32,
    pub has_completions: bool,
    pub summary: Summary,
    pub habits: Vec<HabitRow>,
    pub monthly: Vec<MonthlyRow>,
    pub monthly_totals: Vec<MonthTotal>,
    pub trend: Vec<TrendSeries>,
    pub weekdays: WeekdayDistribution,
    pub heatmap: Heatmap,
    pub consistency: Vec<ConsistencyRow>,
    pub momentum: Momentum,
    pub pareto: ParetoReport,
    pub at_risk: Vec<HabitSummary>,
}

#[derive(Debug, Serialize)]
pub struct MonthViewResponse {
    pub bar: MonthBar,
    pub overview: MonthOverview,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub id: String,
    pub name: String,
    pub created_at: Option<String>,
    pub completed_dates: Vec<NaiveDate>,
    pub metrics: HabitMetrics,
    pub grid: MonthGrid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: String,
    pub date: NaiveDate,
    pub completed: bool,
}

// ----- requests -----

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameHabitRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ToggleRequest {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Today,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Streak,
    Name,
    Month,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Focus {
    #[default]
    All,
    Gains,
    Losses,
}
