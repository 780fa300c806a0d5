pub mod comments;
pub mod home;
pub mod submissions;
pub mod upvotes;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(submissions::router())
        .merge(comments::router())
        .merge(upvotes::router())
}
