use axum::{
    routing::{get, post},
    Router,
};

use crate::controllers::poll_controller::{
    cast_vote, create_poll, delete_poll, edit_poll, health, poll_info, update_poll, user_polls,
};

pub fn poll_router() -> Router {
    Router::new()
        .route("/create", post(create_poll))
        .route("/info", post(poll_info))
        .route("/edit", post(edit_poll))
        .route("/update", post(update_poll))
        .route("/delete", post(delete_poll))
        .route("/vote", post(cast_vote))
        .route("/user-polls", get(user_polls))
        .route("/health", get(health))
}
