use std::sync::Arc;

use axum::{Json, extract::State};

use crate::error::AppResult;
use crate::http_server::{schema::DashboardResponse, state::AppState};

pub async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<DashboardResponse>> {
    let stats = state.dashboard().stats().await?;
    Ok(Json(stats.into()))
}
