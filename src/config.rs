use crate::enrich::DEFAULT_CONCURRENCY;
use crate::stats::DEFAULT_WINDOW_MONTHS;
use std::{env, path::PathBuf};

pub const MAX_WINDOW_MONTHS: u32 = 24;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub fetch_concurrency: usize,
    pub window_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/habits.json"),
            fetch_concurrency: DEFAULT_CONCURRENCY,
            window_months: DEFAULT_WINDOW_MONTHS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let fetch_concurrency = lookup("HABITS_FETCH_CONCURRENCY")
            .and_then(|value| value.parse::<usize>().ok())
            .map(|value| value.max(1))
            .unwrap_or(defaults.fetch_concurrency);
        let window_months = lookup("HABITS_WINDOW_MONTHS")
            .and_then(|value| value.parse::<u32>().ok())
            .map(|value| value.clamp(1, MAX_WINDOW_MONTHS))
            .unwrap_or(defaults.window_months);

        Self {
            port,
            data_path,
            fetch_concurrency,
            window_months,
        }
    }
}
