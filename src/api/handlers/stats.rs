//! Stats API handler

use axum::{extract::State, Json};

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::storage::stats::{self, Stats};

/// GET /stats
/// Task counts: total, completed, pending, plus list count and done-today
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    let stats = state.query(|tx| stats::get_stats(tx)).await?;
    Ok(Json(stats))
}
