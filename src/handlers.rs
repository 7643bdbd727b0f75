use crate::config::MAX_WINDOW_MONTHS;
use crate::dates::{add_months, clamp_month, local_today, parse_date_key, parse_month_key};
use crate::enrich::enrich_with_calendars;
use crate::errors::AppError;
use crate::models::{
    CalendarResponse, CreateHabitRequest, Dashboard, Focus, Habit, HabitRecord, HabitRow,
    MonthComparison, MonthViewResponse, OrderBy, RenameHabitRequest, Summary, Tab, ToggleRequest,
    ToggleResponse,
};
use crate::repository::HabitRepository;
use crate::state::AppState;
use crate::stats::{
    self, AnalyticsOptions, ComparisonFilter, ListOptions, MonthlyWindow, build_dashboard_at,
    compare_months, derive_metrics, month_bar, month_grid, month_overview,
};
use crate::storage::persist_data;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub query: Option<String>,
    pub tab: Option<Tab>,
    pub order_by: Option<OrderBy>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub month: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalyticsQuery {
    pub date: Option<String>,
    pub window_months: Option<u32>,
    pub habit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct MonthQuery {
    pub month: Option<String>,
    pub query: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompareQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub focus: Option<Focus>,
    pub changed_only: Option<bool>,
    pub date: Option<String>,
}

/// The request's reference date; the server's local today when absent.
fn reference_date(date: Option<&str>) -> Result<NaiveDate, AppError> {
    match date.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(parse_date_key(value)?),
        None => Ok(local_today()),
    }
}

/// Completions may be recorded for today or any earlier day.
fn toggle_date(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    let date = match date.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date_key(value)?,
        None => today,
    };
    if date > today {
        return Err(AppError::bad_request(format!("{date} is in the future")));
    }
    Ok(date)
}

fn selected_month(month: Option<&str>, fallback: NaiveDate) -> Result<NaiveDate, AppError> {
    match month.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Ok(parse_month_key(value)?),
        None => Ok(fallback),
    }
}

fn valid_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name)
}

async fn enriched_habits(state: &AppState) -> Vec<Habit> {
    let base = state.data.lock().await.list();
    enrich_with_calendars(base, state.clone(), state.config.fetch_concurrency).await
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HabitRow>>, AppError> {
    let today = reference_date(query.date.as_deref())?;
    let options = ListOptions {
        query: query.query,
        tab: query.tab.unwrap_or_default(),
        order_by: query.order_by.unwrap_or_default(),
    };
    let habits = state.snapshot().await;
    Ok(Json(stats::list_habits(&habits, today, &options)))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitRecord>), AppError> {
    let name = valid_name(&payload.name)?;

    let mut data = state.data.lock().await;
    let record = data.create(name);
    persist_data(&state.data_path, &data).await?;

    info!(habit_id = %record.id, "created habit");
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn rename_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<RenameHabitRequest>,
) -> Result<Json<HabitRecord>, AppError> {
    let name = valid_name(&payload.name)?;

    let mut data = state.data.lock().await;
    let record = data
        .rename(&id, name)
        .ok_or_else(|| AppError::not_found(format!("habit {id} not found")))?;
    persist_data(&state.data_path, &data).await?;

    Ok(Json(record))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    if !data.delete(&id) {
        return Err(AppError::not_found(format!("habit {id} not found")));
    }
    persist_data(&state.data_path, &data).await?;

    info!(habit_id = %id, "deleted habit");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<ToggleRequest>>,
) -> Result<Json<ToggleResponse>, AppError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    let date = toggle_date(payload.date.as_deref(), local_today())?;

    let mut data = state.data.lock().await;
    let completed = data
        .toggle(&id, date)
        .ok_or_else(|| AppError::not_found(format!("habit {id} not found")))?;
    persist_data(&state.data_path, &data).await?;

    Ok(Json(ToggleResponse { id, date, completed }))
}

pub async fn habit_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let today = reference_date(query.date.as_deref())?;
    let month = clamp_month(selected_month(query.month.as_deref(), today)?, today);

    let habit = state
        .snapshot()
        .await
        .into_iter()
        .find(|habit| habit.id == id)
        .ok_or_else(|| AppError::not_found(format!("habit {id} not found")))?;

    Ok(Json(CalendarResponse {
        metrics: derive_metrics(&habit.completed_dates, today),
        grid: month_grid(&habit.completed_dates, month),
        completed_dates: habit.completed_dates.into_iter().collect(),
        id: habit.id,
        name: habit.name,
        created_at: habit.created_at,
    }))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Summary>, AppError> {
    let today = reference_date(query.date.as_deref())?;
    let habits = state.snapshot().await;
    Ok(Json(stats::summary(&habits, today)))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let options = AnalyticsOptions {
        reference_date: reference_date(query.date.as_deref())?,
        window_months: query
            .window_months
            .unwrap_or(state.config.window_months)
            .clamp(1, MAX_WINDOW_MONTHS),
        habit_filter: query.habit,
    };

    let habits = enriched_habits(&state).await;
    Ok(Json(build_dashboard_at(&habits, &options)))
}

pub async fn get_month_view(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthViewResponse>, AppError> {
    let today = reference_date(query.date.as_deref())?;
    let month = clamp_month(selected_month(query.month.as_deref(), today)?, today);

    let habits = enriched_habits(&state).await;
    let window = MonthlyWindow::build(&habits, today, state.config.window_months);

    Ok(Json(MonthViewResponse {
        bar: month_bar(&habits, month, query.query.as_deref()),
        overview: month_overview(&habits, &window, month),
    }))
}

pub async fn get_comparison(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<MonthComparison>, AppError> {
    let today = reference_date(query.date.as_deref())?;
    let month1 = selected_month(query.from.as_deref(), add_months(today, -1))?;
    let month2 = selected_month(query.to.as_deref(), today)?;
    let filter = ComparisonFilter {
        focus: query.focus.unwrap_or_default(),
        changed_only: query.changed_only.unwrap_or(false),
    };

    let habits = enriched_habits(&state).await;
    Ok(Json(compare_months(&habits, month1, month2, filter)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_date_parses_or_defaults() {
        assert_eq!(
            reference_date(Some("2025-10-22")).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 22).unwrap()
        );
        assert_eq!(reference_date(Some("  ")).unwrap(), local_today());
        let err = reference_date(Some("2025-13-01")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn toggle_date_defaults_to_today_and_rejects_future_days() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 22).unwrap();
        assert_eq!(toggle_date(None, today).unwrap(), today);
        assert_eq!(
            toggle_date(Some("2025-10-21"), today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 21).unwrap()
        );
        assert_eq!(
            toggle_date(Some("2025-10-23"), today).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
        assert!(toggle_date(Some("22/10/2025"), today).is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(valid_name("  Reading ").unwrap(), "Reading");
        assert_eq!(valid_name("   ").unwrap_err().status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn month_selection_falls_back() {
        let fallback = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert_eq!(selected_month(None, fallback).unwrap(), fallback);
        assert_eq!(
            selected_month(Some("2025-03"), fallback).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert!(selected_month(Some("March"), fallback).is_err());
    }
}
