use crate::config::Config;
use crate::enrich::{CalendarSource, ingest_date_keys};
use crate::errors::AppError;
use crate::models::{Habit, HabitCalendar, HabitData};
use crate::repository::HabitRepository;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data_path: PathBuf,
    pub data: Arc<Mutex<HabitData>>,
}

impl AppState {
    pub fn new(config: Config, data: HabitData) -> Self {
        Self {
            data_path: config.data_path.clone(),
            config: Arc::new(config),
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Validated copy of every stored habit, read under a single lock.
    pub async fn snapshot(&self) -> Vec<Habit> {
        let data = self.data.lock().await;
        data.habits
            .iter()
            .map(|record| Habit {
                id: record.id.clone(),
                name: record.name.clone(),
                completed_dates: ingest_date_keys(&record.id, &record.completed_dates),
                created_at: record.created_at.clone(),
            })
            .collect()
    }
}

impl CalendarSource for AppState {
    async fn fetch_calendar(&self, habit_id: &str) -> Result<HabitCalendar, AppError> {
        let data = self.data.lock().await;
        let record = data
            .get(habit_id)
            .ok_or_else(|| AppError::not_found(format!("habit {habit_id} not found")))?;

        Ok(HabitCalendar {
            completed_dates: record.completed_dates.iter().cloned().collect(),
            created_at: record.created_at.clone(),
        })
    }
}
