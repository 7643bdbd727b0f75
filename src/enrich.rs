//! Fetches every habit's completion history before analytics run.
//!
//! A fixed number of workers pull habit indices from a shared cursor and write
//! into their own output slots. A failed fetch degrades that one habit to an
//! empty history; the batch always completes.

use crate::dates::parse_date_key;
use crate::errors::AppError;
use crate::models::{Habit, HabitCalendar, HabitSummary};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinSet;
use tracing::{error, warn};

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Per-habit calendar lookup, one round-trip per habit.
pub trait CalendarSource: Clone + Send + Sync + 'static {
    fn fetch_calendar(&self, habit_id: &str) -> impl Future<Output = Result<HabitCalendar, AppError>> + Send;
}

/// Validates raw date-keys, dropping (and logging) anything malformed.
pub fn ingest_date_keys<'a>(habit_id: &str, keys: impl IntoIterator<Item = &'a String>) -> BTreeSet<NaiveDate> {
    keys.into_iter()
        .filter_map(|key| match parse_date_key(key) {
            Ok(date) => Some(date),
            Err(err) => {
                warn!(habit_id, "dropping completion: {err}");
                None
            }
        })
        .collect()
}

pub fn habit_from_calendar(summary: HabitSummary, calendar: HabitCalendar) -> Habit {
    let completed_dates = ingest_date_keys(&summary.id, &calendar.completed_dates);
    Habit {
        id: summary.id,
        name: summary.name,
        completed_dates,
        created_at: calendar.created_at,
    }
}

/// Enriches `base` with calendars using at most `concurrency` concurrent fetches.
/// Output order matches input order.
pub async fn enrich_with_calendars<S: CalendarSource>(
    base: Vec<HabitSummary>,
    source: S,
    concurrency: usize,
) -> Vec<Habit> {
    if base.is_empty() {
        return Vec::new();
    }

    let base = Arc::new(base);
    let cursor = Arc::new(AtomicUsize::new(0));
    let workers = concurrency.clamp(1, base.len());

    let mut tasks = JoinSet::new();
    for worker in 0..workers {
        let base = Arc::clone(&base);
        let cursor = Arc::clone(&cursor);
        let source = source.clone();

        tasks.spawn(async move {
            let mut filled = Vec::new();
            loop {
                let index = cursor.fetch_add(1, Ordering::SeqCst);
                let Some(summary) = base.get(index) else {
                    break;
                };
                let habit = match source.fetch_calendar(&summary.id).await {
                    Ok(calendar) => habit_from_calendar(summary.clone(), calendar),
                    Err(err) => {
                        warn!(habit_id = %summary.id, worker, "calendar fetch failed, using empty history: {err}");
                        Habit::without_history(summary.clone())
                    }
                };
                filled.push((index, habit));
            }
            filled
        });
    }

    let mut slots: Vec<Option<Habit>> = base.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(filled) => {
                for (index, habit) in filled {
                    slots[index] = Some(habit);
                }
            }
            Err(err) => error!("enrichment worker failed: {err}"),
        }
    }

    slots
        .into_iter()
        .zip(base.iter())
        .map(|(slot, summary)| slot.unwrap_or_else(|| Habit::without_history(summary.clone())))
        .collect()
}
