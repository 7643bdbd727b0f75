use super::count_in_month;
use crate::dates::{add_months, month_key};
use crate::models::{ComparisonRow, Focus, Habit, MonthComparison, Momentum, MomentumRow};
use chrono::NaiveDate;

const TOP_N: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonFilter {
    pub focus: Focus,
    pub changed_only: bool,
}

/// Whole-percent change from `old` to `new`, halves rounded up (-37.5 -> -37).
/// Growth from zero reports 100.
pub fn pct_change(old: u32, new: u32) -> i64 {
    match (old, new) {
        (0, 0) => 0,
        (0, _) => 100,
        _ => {
            let old = f64::from(old);
            ((f64::from(new) - old) / old * 100.0 + 0.5).floor() as i64
        }
    }
}

/// Rows ordered by impact: |diff| desc, then month-2 count desc, then name asc.
pub fn comparison_rows(habits: &[Habit], month1: NaiveDate, month2: NaiveDate) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = habits
        .iter()
        .map(|habit| {
            let count_month1 = count_in_month(&habit.completed_dates, month1);
            let count_month2 = count_in_month(&habit.completed_dates, month2);
            ComparisonRow {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                count_month1,
                count_month2,
                diff: i64::from(count_month2) - i64::from(count_month1),
                pct_change: pct_change(count_month1, count_month2),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.diff
            .abs()
            .cmp(&a.diff.abs())
            .then_with(|| b.count_month2.cmp(&a.count_month2))
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

pub fn compare_months(
    habits: &[Habit],
    month1: NaiveDate,
    month2: NaiveDate,
    filter: ComparisonFilter,
) -> MonthComparison {
    let base = comparison_rows(habits, month1, month2);

    let top_gains: Vec<ComparisonRow> = base.iter().filter(|r| r.diff > 0).take(TOP_N).cloned().collect();
    let top_losses: Vec<ComparisonRow> = base.iter().filter(|r| r.diff < 0).take(TOP_N).cloned().collect();

    let rows: Vec<ComparisonRow> = base
        .into_iter()
        .filter(|row| match filter.focus {
            Focus::All => true,
            Focus::Gains => row.diff > 0,
            Focus::Losses => row.diff < 0,
        })
        .filter(|row| !filter.changed_only || row.diff != 0)
        .collect();

    let total_month1: u32 = rows.iter().map(|r| r.count_month1).sum();
    let total_month2: u32 = rows.iter().map(|r| r.count_month2).sum();
    let max_value = rows
        .iter()
        .map(|r| r.count_month1.max(r.count_month2))
        .max()
        .unwrap_or(0)
        .max(1);

    MonthComparison {
        month1: month_key(month1),
        month2: month_key(month2),
        top_gains,
        top_losses,
        total_month1,
        total_month2,
        total_diff: i64::from(total_month2) - i64::from(total_month1),
        total_pct_change: pct_change(total_month1, total_month2),
        max_value,
        rows,
    }
}

/// Current month against the one before it.
///
/// Both lists are the full delta-sorted list cut to three entries, so
/// unchanged habits show up when fewer than three habits moved. Equal deltas
/// keep input order.
pub fn momentum(habits: &[Habit], reference: NaiveDate) -> Momentum {
    let previous = add_months(reference, -1);

    let list: Vec<MomentumRow> = habits
        .iter()
        .map(|habit| {
            let current = count_in_month(&habit.completed_dates, reference);
            let prev = count_in_month(&habit.completed_dates, previous);
            MomentumRow {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                previous: prev,
                current,
                delta: i64::from(current) - i64::from(prev),
            }
        })
        .collect();

    let mut gainers = list.clone();
    gainers.sort_by(|a, b| b.delta.cmp(&a.delta));
    gainers.truncate(TOP_N);

    let mut decliners = list;
    decliners.sort_by(|a, b| a.delta.cmp(&b.delta));
    decliners.truncate(TOP_N);

    Momentum {
        previous_month: month_key(previous),
        current_month: month_key(reference),
        gainers,
        decliners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// `n` completions starting on the first of the month.
    fn days(month: NaiveDate, n: i64) -> Vec<NaiveDate> {
        (0..n).map(|i| month + Duration::days(i)).collect()
    }

    fn habit(id: &str, name: &str, sep: i64, oct: i64) -> Habit {
        let mut dates = days(ymd(2025, 9, 1), sep);
        dates.extend(days(ymd(2025, 10, 1), oct));
        Habit::new(id, name, dates)
    }

    #[test]
    fn pct_change_guards_zero_baseline() {
        assert_eq!(pct_change(0, 0), 0);
        assert_eq!(pct_change(0, 7), 100);
        assert_eq!(pct_change(4, 6), 50);
        assert_eq!(pct_change(3, 2), -33);
        assert_eq!(pct_change(3, 0), -100);
    }

    #[test]
    fn pct_change_rounds_halves_up() {
        assert_eq!(pct_change(8, 5), -37);
        assert_eq!(pct_change(8, 11), 38);
        assert_eq!(pct_change(2, 1), -50);
        assert_eq!(pct_change(8, 13), 63);
    }

    #[test]
    fn rows_sorted_by_impact() {
        let habits = vec![
            habit("1", "Reading", 2, 5),
            habit("2", "Gym", 8, 5),
            habit("3", "Water", 1, 1),
            habit("4", "Art", 0, 3),
        ];
        let rows = comparison_rows(&habits, ymd(2025, 9, 1), ymd(2025, 10, 1));
        let order: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();

        // Reading, Gym and Art all move by 3; Reading and Gym tie on October too.
        assert_eq!(order, vec!["Gym", "Reading", "Art", "Water"]);
        assert_eq!(rows[0].diff, -3);
        assert_eq!(rows[0].pct_change, -37);
        assert_eq!(rows[2].pct_change, 100);
    }

    #[test]
    fn focus_and_changed_only_narrow_rows_and_totals() {
        let habits = vec![
            habit("1", "Reading", 2, 5),
            habit("2", "Gym", 8, 5),
            habit("3", "Water", 1, 1),
        ];
        let (sep, oct) = (ymd(2025, 9, 1), ymd(2025, 10, 1));

        let all = compare_months(&habits, sep, oct, ComparisonFilter::default());
        assert_eq!(all.rows.len(), 3);
        assert_eq!((all.total_month1, all.total_month2), (11, 11));
        assert_eq!(all.total_pct_change, 0);
        assert_eq!(all.top_gains.len(), 1);
        assert_eq!(all.top_losses.len(), 1);
        assert_eq!(all.max_value, 8);

        let gains = compare_months(
            &habits,
            sep,
            oct,
            ComparisonFilter { focus: Focus::Gains, changed_only: false },
        );
        assert_eq!(gains.rows.len(), 1);
        assert_eq!(gains.total_diff, 3);
        assert_eq!(gains.total_pct_change, 150);
        assert_eq!(gains.top_losses.len(), 1);

        let changed = compare_months(
            &habits,
            sep,
            oct,
            ComparisonFilter { focus: Focus::All, changed_only: true },
        );
        assert!(changed.rows.iter().all(|r| r.diff != 0));
        assert_eq!(changed.rows.len(), 2);
    }

    #[test]
    fn momentum_keeps_unchanged_habits_when_few_move() {
        let habits = vec![
            habit("1", "Reading", 2, 5),
            habit("2", "Gym", 1, 1),
            habit("3", "Water", 0, 0),
            habit("4", "Art", 4, 1),
        ];
        let m = momentum(&habits, ymd(2025, 10, 22));

        assert_eq!(m.previous_month, "2025-09");
        assert_eq!(m.current_month, "2025-10");
        let gainers: Vec<_> = m.gainers.iter().map(|r| (r.name.as_str(), r.delta)).collect();
        assert_eq!(gainers, vec![("Reading", 3), ("Gym", 0), ("Water", 0)]);
        let decliners: Vec<_> = m.decliners.iter().map(|r| (r.name.as_str(), r.delta)).collect();
        assert_eq!(decliners, vec![("Art", -3), ("Gym", 0), ("Water", 0)]);
    }

    #[test]
    fn momentum_crosses_year_boundary() {
        let habits = vec![Habit::new("1", "Reading", [ymd(2025, 12, 31), ymd(2026, 1, 1)])];
        let m = momentum(&habits, ymd(2026, 1, 15));
        assert_eq!(m.previous_month, "2025-12");
        assert_eq!(m.gainers[0].delta, 0);
        assert_eq!((m.gainers[0].previous, m.gainers[0].current), (1, 1));
    }

    #[test]
    fn empty_input_yields_empty_lists() {
        let m = momentum(&[], ymd(2025, 10, 22));
        assert!(m.gainers.is_empty());
        assert!(m.decliners.is_empty());

        let c = compare_months(&[], ymd(2025, 9, 1), ymd(2025, 10, 1), ComparisonFilter::default());
        assert!(c.rows.is_empty());
        assert_eq!(c.max_value, 1);
        assert_eq!(c.total_pct_change, 0);
    }
}
