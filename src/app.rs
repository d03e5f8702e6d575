use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    config::{cors::init_cors, startup::AppState},
    routes::poll_route::poll_router,
};

pub fn create_app(app_state: AppState) -> Router {
    let cors = init_cors(app_state.config.cors_origin.clone());

    Router::new()
        .nest("/api/quick-poll", poll_router())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state))
        .layer(cors)
}
