use crate::errors::AppError;
use crate::models::HabitData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> HabitData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<HabitData>(&bytes) {
            Ok(data) => {
                info!(habits = data.habits.len(), "loaded habit store");
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                HabitData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HabitData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            HabitData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &HabitData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}
