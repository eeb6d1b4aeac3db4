use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::show_login).post(handlers::login))
        .route("/register", post(handlers::register))
        .route("/logout", post(handlers::logout))
        .route("/portfolio", get(handlers::show_portfolio))
        .route("/projects", get(handlers::show_projects))
        .route("/projects/complete", post(handlers::complete_project))
        .route("/projects/:index", get(handlers::open_project))
        .route("/projects/:index/research", get(handlers::open_research))
        .route("/projects/:index/tasks/:task", post(handlers::toggle_task))
        .route("/research/close", post(handlers::close_research))
        .route("/progress/reset", post(handlers::reset_progress))
        .route("/carousel/next", post(handlers::carousel_next))
        .route("/carousel/prev", post(handlers::carousel_prev))
        .route("/api/state", get(handlers::get_state))
        .with_state(state)
}
