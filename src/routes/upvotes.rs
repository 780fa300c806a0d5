use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::links::SubmissionId;
use crate::state::AppState;

async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<SubmissionId>,
) -> AppResult<StatusCode> {
    state.board.add_upvote(id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<SubmissionId>,
) -> AppResult<StatusCode> {
    state.board.remove_upvote(id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upvote/{id}", post(add))
        .route("/upvote/{id}/remove", post(remove))
}
