use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/water", post(handlers::add_water))
        .route("/api/water/step", put(handlers::set_step))
        .route("/api/meals/:meal/toggle", post(handlers::toggle_meal))
        .route("/api/mood", get(handlers::get_mood))
        .route("/api/profile", put(handlers::update_profile))
        .route("/api/tab", put(handlers::set_tab))
        .route("/api/knowledge", get(handlers::knowledge))
        .route("/api/report", post(handlers::send_report))
        .with_state(state)
}
