use super::count_in_range;
use super::monthly::{MonthlyWindow, by_count_then_name};
use crate::dates::window_start;
use crate::models::{ConsistencyRow, Habit, HabitSummary, ParetoReport, ParetoRow};
use chrono::NaiveDate;

pub const PARETO_THRESHOLD_PCT: f64 = 80.0;
pub const CONSISTENCY_DAYS: u32 = 30;
pub const AT_RISK_DAYS: u32 = 14;

/// Ranks habits by their window total and accumulates their share of all
/// completions.
pub fn pareto(habits: &[Habit], window: &MonthlyWindow) -> ParetoReport {
    let mut totals: Vec<(&Habit, u32)> = habits
        .iter()
        .map(|habit| (habit, window.total_for(&habit.id)))
        .collect();
    totals.sort_by(|(a, a_total), (b, b_total)| by_count_then_name(*a_total, &a.name, *b_total, &b.name));

    let grand_total: u32 = totals.iter().map(|(_, total)| total).sum();
    let denominator = f64::from(grand_total.max(1));

    let mut running = 0u32;
    let rows: Vec<ParetoRow> = totals
        .into_iter()
        .enumerate()
        .map(|(index, (habit, total))| {
            running += total;
            ParetoRow {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                total,
                share_pct: f64::from(total) / denominator * 100.0,
                cumulative_pct: f64::from(running) / denominator * 100.0,
                rank: index + 1,
            }
        })
        .collect();

    let idx80 = rows
        .iter()
        .position(|row| row.cumulative_pct >= PARETO_THRESHOLD_PCT)
        .unwrap_or(rows.len());
    let habits_for_80 = (idx80 + 1).min(rows.len());

    ParetoReport {
        rows,
        grand_total,
        idx80,
        habits_for_80,
    }
}

/// Share of the trailing 30 days (reference included) on which each habit was done.
pub fn consistency(habits: &[Habit], reference: NaiveDate) -> Vec<ConsistencyRow> {
    let start = window_start(reference, CONSISTENCY_DAYS);

    let mut rows: Vec<ConsistencyRow> = habits
        .iter()
        .map(|habit| {
            let done = count_in_range(&habit.completed_dates, start, reference);
            ConsistencyRow {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                done,
                pct: (f64::from(done) / f64::from(CONSISTENCY_DAYS) * 100.0).round() as u32,
            }
        })
        .collect();

    rows.sort_by(|a, b| by_count_then_name(a.pct, &a.name, b.pct, &b.name));
    rows
}

/// Habits with no completion from `reference - 13` through `reference`,
/// in input order.
pub fn at_risk(habits: &[Habit], reference: NaiveDate) -> Vec<HabitSummary> {
    let start = window_start(reference, AT_RISK_DAYS);
    habits
        .iter()
        .filter(|habit| count_in_range(&habit.completed_dates, start, reference) == 0)
        .map(Habit::summary)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_total(id: &str, name: &str, start: NaiveDate, total: i64) -> Habit {
        Habit::new(id, name, (0..total).map(|i| start + Duration::days(i)))
    }

    #[test]
    fn pareto_eighty_twenty() {
        let reference = ymd(2025, 10, 22);
        let habits = vec![
            with_total("2", "Water", ymd(2025, 8, 1), 20),
            with_total("1", "Reading", ymd(2025, 6, 1), 80),
        ];
        let window = MonthlyWindow::build(&habits, reference, 6);
        let report = pareto(&habits, &window);

        assert_eq!(report.grand_total, 100);
        assert_eq!(report.rows[0].name, "Reading");
        assert_eq!(report.rows[0].rank, 1);
        assert_eq!(report.rows[0].total, 80);
        assert!((report.rows[0].share_pct - 80.0).abs() < 1e-9);
        assert!((report.rows[0].cumulative_pct - 80.0).abs() < 1e-9);
        assert_eq!(report.rows[1].rank, 2);
        assert!((report.rows[1].share_pct - 20.0).abs() < 1e-9);
        assert!((report.rows[1].cumulative_pct - 100.0).abs() < 1e-9);
        assert_eq!(report.idx80, 0);
        assert_eq!(report.habits_for_80, 1);
    }

    #[test]
    fn pareto_cumulative_is_monotonic_and_ends_at_100() {
        let reference = ymd(2025, 10, 22);
        let habits = vec![
            with_total("1", "A", ymd(2025, 10, 1), 3),
            with_total("2", "B", ymd(2025, 9, 1), 17),
            with_total("3", "C", ymd(2025, 7, 1), 9),
            with_total("4", "D", ymd(2025, 5, 1), 9),
            Habit::new("5", "E", Vec::<NaiveDate>::new()),
        ];
        let window = MonthlyWindow::build(&habits, reference, 6);
        let report = pareto(&habits, &window);

        let cumulative: Vec<f64> = report.rows.iter().map(|r| r.cumulative_pct).collect();
        assert!(cumulative.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!((cumulative.last().unwrap() - 100.0).abs() < 1e-9);

        let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "D", "A", "E"]);
        // 17 + 9 + 9 = 35 of 38 crosses 80% at the third row.
        assert_eq!(report.idx80, 2);
        assert_eq!(report.habits_for_80, 3);
    }

    #[test]
    fn pareto_without_history_reports_full_length() {
        let habits = vec![
            Habit::new("1", "Reading", Vec::<NaiveDate>::new()),
            Habit::new("2", "Gym", Vec::<NaiveDate>::new()),
        ];
        let window = MonthlyWindow::build(&habits, ymd(2025, 10, 22), 6);
        let report = pareto(&habits, &window);

        assert_eq!(report.grand_total, 0);
        assert!(report.rows.iter().all(|r| r.cumulative_pct == 0.0));
        assert_eq!(report.idx80, 2);
        assert_eq!(report.habits_for_80, 2);

        let empty = pareto(&[], &MonthlyWindow::build(&[], ymd(2025, 10, 22), 6));
        assert!(empty.rows.is_empty());
        assert_eq!(empty.habits_for_80, 0);
    }

    #[test]
    fn consistency_counts_thirty_inclusive_days() {
        let reference = ymd(2025, 10, 22);
        let habits = vec![
            with_total("1", "Reading", reference - Duration::days(29), 30),
            Habit::new("2", "Gym", [reference - Duration::days(30), reference]),
            Habit::new("3", "Art", [reference]),
        ];
        let rows = consistency(&habits, reference);

        assert_eq!(rows[0].name, "Reading");
        assert_eq!((rows[0].done, rows[0].pct), (30, 100));
        // Art and Gym both did one day inside the window.
        assert_eq!(rows[1].name, "Art");
        assert_eq!((rows[2].done, rows[2].pct), (1, 3));
    }

    #[test]
    fn at_risk_boundary_is_fourteen_inclusive_days() {
        let reference = ymd(2025, 10, 22);
        let habits = vec![
            Habit::new("1", "Outside", [reference - Duration::days(14)]),
            Habit::new("2", "Edge", [reference - Duration::days(13)]),
            Habit::new("3", "Never", Vec::<NaiveDate>::new()),
            Habit::new("4", "Future", [reference + Duration::days(1)]),
        ];
        let risky: Vec<_> = at_risk(&habits, reference).into_iter().map(|h| h.id).collect();
        assert_eq!(risky, vec!["1", "3", "4"]);
    }
}
