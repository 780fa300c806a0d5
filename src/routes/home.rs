use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::error::AppResult;
use crate::links::RankedSubmission;
use crate::state::AppState;

/// GET / — every submission, highest score first
pub async fn index(State(state): State<AppState>) -> AppResult<Json<Vec<RankedSubmission>>> {
    let listing = state.board.ranked_listing(Utc::now()).await?;
    Ok(Json(listing))
}
