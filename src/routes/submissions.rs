use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::links::{Submission, SubmissionDetail, SubmissionId};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewSubmissionRequest {
    pub title: String,
    pub url: String,
}

/// POST /submissions
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<NewSubmissionRequest>,
) -> AppResult<(StatusCode, Json<Submission>)> {
    let submission = state
        .board
        .submit_link(&req.title, &req.url, user.id, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /submissions/{id} — the submission and its top-level comments
async fn detail(
    State(state): State<AppState>,
    Path(id): Path<SubmissionId>,
) -> AppResult<Json<SubmissionDetail>> {
    Ok(Json(state.board.submission_detail(id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/submissions", post(create))
        .route("/submissions/{id}", get(detail))
}
