use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            patch(handlers::rename_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/habits/:id/calendar", get(handlers::habit_calendar))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/analytics/month", get(handlers::get_month_view))
        .route("/api/analytics/compare", get(handlers::get_comparison))
        .with_state(state)
}
