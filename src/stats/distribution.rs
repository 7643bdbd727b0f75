use crate::dates::{add_months, last_of_month, weekday_index, window_start};
use crate::models::{Habit, Heatmap, HeatmapCell, WeekdayDistribution};
use chrono::NaiveDate;

pub const HEATMAP_DAYS: u32 = 28;

/// Completions bucketed by day of week (0 = Sunday) over the trailing
/// `window_months` calendar months, reference month included in full.
pub fn weekday_distribution(habits: &[Habit], reference: NaiveDate, window_months: u32) -> WeekdayDistribution {
    let start = add_months(reference, 1 - window_months.max(1) as i32);
    let end = last_of_month(reference);

    let mut counts = [0u32; 7];
    for habit in habits {
        for &date in habit.completed_dates.range(start..=end) {
            counts[weekday_index(date)] += 1;
        }
    }

    WeekdayDistribution {
        counts,
        max_count: counts.iter().copied().max().unwrap_or(0).max(1),
        best_index: first_index_by(&counts, |candidate, current| candidate > current),
        worst_index: first_index_by(&counts, |candidate, current| candidate < current),
    }
}

/// Index of the first element that no later element beats; ties keep the lowest index.
fn first_index_by(counts: &[u32; 7], beats: impl Fn(u32, u32) -> bool) -> usize {
    let mut best = 0;
    for (index, &count) in counts.iter().enumerate().skip(1) {
        if beats(count, counts[best]) {
            best = index;
        }
    }
    best
}

/// How many habits were completed on each of the last 28 days, oldest first.
pub fn heatmap(habits: &[Habit], reference: NaiveDate) -> Heatmap {
    let start = window_start(reference, HEATMAP_DAYS);
    let cells: Vec<HeatmapCell> = start
        .iter_days()
        .take(HEATMAP_DAYS as usize)
        .map(|date| HeatmapCell {
            date,
            count: habits
                .iter()
                .filter(|habit| habit.completed_dates.contains(&date))
                .count() as u32,
        })
        .collect();

    let max_count = cells.iter().map(|cell| cell.count).max().unwrap_or(0).max(1);
    Heatmap { cells, max_count }
}
