use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::links::{Comment, CommentId, SubmissionId};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewCommentRequest {
    pub submission_id: SubmissionId,
    /// Set when replying to another comment
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    pub body: String,
}

/// POST /comments — top-level comment or reply
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<NewCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .board
        .create_comment(
            &req.body,
            user.id,
            req.submission_id,
            req.parent_id,
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /comments/{id}/replies
async fn replies(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.board.replies_to(id).await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create))
        .route("/comments/{id}/replies", get(replies))
}
