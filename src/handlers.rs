use crate::errors::AppError;
use crate::session::AppModel;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub admission: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub checked: bool,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.session.render(state.carousel.current()).await)
}

pub async fn show_login(State(state): State<AppState>) -> Redirect {
    state.session.show_login().await;
    Redirect::to("/")
}

pub async fn show_portfolio(State(state): State<AppState>) -> Redirect {
    state.session.show_portfolio().await;
    Redirect::to("/")
}

pub async fn show_projects(State(state): State<AppState>) -> Redirect {
    state.session.go_to_projects().await;
    Redirect::to("/")
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Redirect {
    state.session.login(&form.username, &form.password).await;
    Redirect::to("/")
}

pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Redirect {
    state
        .session
        .register(&form.username, &form.admission, &form.email, &form.password)
        .await;
    Redirect::to("/")
}

pub async fn logout(State(state): State<AppState>) -> Redirect {
    state.session.logout().await;
    Redirect::to("/")
}

pub async fn open_project(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    state.session.select_project(index).await?;
    Ok(Redirect::to("/"))
}

pub async fn open_research(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    state.session.open_research(index).await?;
    Ok(Redirect::to("/"))
}

pub async fn close_research(State(state): State<AppState>) -> Redirect {
    state.session.close_research().await;
    Redirect::to("/")
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path((project, task)): Path<(usize, usize)>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    state.session.toggle_task(project, task, form.checked).await?;
    Ok(Redirect::to("/"))
}

pub async fn complete_project(State(state): State<AppState>) -> Redirect {
    state.session.complete_project().await;
    Redirect::to("/")
}

pub async fn reset_progress(State(state): State<AppState>) -> Redirect {
    state.session.reset_progress().await;
    Redirect::to("/")
}

pub async fn carousel_next(State(state): State<AppState>) -> Redirect {
    state.carousel.next();
    Redirect::to("/")
}

pub async fn carousel_prev(State(state): State<AppState>) -> Redirect {
    state.carousel.prev();
    Redirect::to("/")
}

pub async fn get_state(State(state): State<AppState>) -> Json<AppModel> {
    Json(state.session.snapshot().await)
}
