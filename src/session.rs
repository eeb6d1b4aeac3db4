use crate::api::ApiClient;
use crate::errors::SessionError;
use crate::models::{Catalog, CurrentUser};
use crate::progress::{
    read_progress, Completion, LocalProvider, ProgressSnapshot, ProgressState, RemoteProvider,
    Source, POINTS_PER_PROJECT,
};
use crate::storage::LocalCache;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
    LoggingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Login,
    Portfolio,
    Projects,
    Dashboard,
}

impl View {
    pub fn id(self) -> &'static str {
        match self {
            View::Login => "login-page",
            View::Portfolio => "portfolio-page",
            View::Projects => "projects-page",
            View::Dashboard => "dashboard-page",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeKind {
    Blocking,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn blocking(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Blocking,
            text: text.into(),
        }
    }

    pub fn soft(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Soft,
            text: text.into(),
        }
    }
}

// Never holds the password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationDraft {
    pub username: String,
    pub admission: String,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub project: usize,
    pub completion: Vec<bool>,
    pub source: Option<Source>,
}

/// Hands out tickets for reads tied to one view; only the newest ticket counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSequence {
    current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn begin(&mut self) -> Ticket {
        self.current += 1;
        Ticket(self.current)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppModel {
    pub auth: AuthState,
    pub view: View,
    pub username: Option<String>,
    pub catalog: Option<Catalog>,
    pub progress: ProgressState,
    pub current_project: Option<usize>,
    pub dashboard: Option<Dashboard>,
    pub research: Vec<u32>,
    pub research_modal: Option<usize>,
    pub registration: RegistrationDraft,
    pub notice: Option<Notice>,
    pub last_synced: Option<DateTime<Local>>,
    #[serde(skip)]
    dashboard_requests: RequestSequence,
}

impl AppModel {
    pub fn new(progress: ProgressState) -> Self {
        Self {
            auth: AuthState::LoggedOut,
            view: View::Login,
            username: None,
            catalog: None,
            progress,
            current_project: None,
            dashboard: None,
            research: Vec::new(),
            research_modal: None,
            registration: RegistrationDraft::default(),
            notice: None,
            last_synced: None,
            dashboard_requests: RequestSequence::default(),
        }
    }

    pub fn project_count(&self) -> usize {
        self.catalog.as_ref().map_or(0, Catalog::len)
    }

    fn task_count(&self, project: usize) -> usize {
        self.catalog
            .as_ref()
            .map_or(0, |catalog| catalog.tasks(project).len())
    }

    fn apply_user(&mut self, user: &CurrentUser) {
        let snapshot = ProgressSnapshot::from_user(user);
        self.progress = snapshot.progress.clone();
        self.username = user.username.clone();
        self.apply_research(&snapshot);
        self.last_synced = Some(Local::now());
    }

    fn apply_research(&mut self, snapshot: &ProgressSnapshot) {
        if let Some(catalog) = &self.catalog {
            self.research = snapshot.research_percents(catalog);
        }
    }

    fn clear_selection(&mut self) {
        self.current_project = None;
        self.dashboard = None;
        self.dashboard_requests.begin();
        if self.view == View::Dashboard {
            self.view = View::Projects;
        }
    }

    fn check_unlocked(&self, project: usize) -> Result<(), SessionError> {
        if project >= self.project_count() {
            return Err(SessionError::UnknownProject(project));
        }
        if !self.progress.is_unlocked(project) {
            return Err(SessionError::Locked(project));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct SessionController {
    api: ApiClient,
    cache: Arc<Mutex<LocalCache>>,
    model: Arc<Mutex<AppModel>>,
}

impl SessionController {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        let model = AppModel::new(cache.progress());
        Self {
            api,
            cache: Arc::new(Mutex::new(cache)),
            model: Arc::new(Mutex::new(model)),
        }
    }

    pub fn model(&self) -> Arc<Mutex<AppModel>> {
        Arc::clone(&self.model)
    }

    pub async fn snapshot(&self) -> AppModel {
        self.model.lock().await.clone()
    }

    pub async fn cache_snapshot(&self) -> LocalCache {
        self.cache.lock().await.clone()
    }

    pub async fn initialize(&self) {
        self.load_catalog().await;

        match self.api.fetch_current_user().await {
            Ok(user) if user.logged_in => {
                let mut model = self.model.lock().await;
                model.apply_user(&user);
                model.auth = AuthState::LoggedIn;
                model.view = View::Portfolio;
                info!("resumed session for {:?}", model.username);
                return;
            }
            Ok(_) => {}
            Err(err) => warn!("could not fetch user, using local state: {err}"),
        }

        let mut model = self.model.lock().await;
        model.view = View::Login;
    }

    async fn load_catalog(&self) {
        if self.model.lock().await.catalog.is_some() {
            return;
        }
        match self.api.fetch_projects().await {
            Ok(catalog) => {
                info!("loaded {} projects", catalog.len());
                self.model.lock().await.catalog = Some(catalog);
            }
            Err(err) => warn!("could not load projects from server: {err}"),
        }
    }

    pub async fn load_user_state(&self) {
        match self.api.fetch_current_user().await {
            Ok(user) if user.logged_in => self.model.lock().await.apply_user(&user),
            Ok(_) => debug!("no signed-in user to load"),
            Err(err) => warn!("loading user state failed: {err}"),
        }
    }

    pub async fn register(&self, username: &str, admission: &str, email: &str, password: &str) {
        let draft = RegistrationDraft {
            username: username.trim().to_string(),
            admission: admission.trim().to_string(),
            email: email.trim().to_string(),
            error: None,
        };
        let password = password.trim();

        if draft.username.is_empty()
            || draft.admission.is_empty()
            || draft.email.is_empty()
            || password.is_empty()
        {
            let mut model = self.model.lock().await;
            model.registration = draft;
            model.notice = Some(Notice::blocking("Please fill all fields."));
            return;
        }

        let result = self
            .api
            .register(&draft.username, &draft.admission, &draft.email, password)
            .await;

        let mut model = self.model.lock().await;
        model.view = View::Login;
        match result {
            Ok(ack) => {
                info!("registered {}", draft.username);
                model.registration = RegistrationDraft::default();
                let text = ack
                    .message
                    .unwrap_or_else(|| "Account created successfully. Please log in.".to_string());
                model.notice = Some(Notice::blocking(text));
            }
            Err(err) => {
                warn!("registration failed: {err}");
                let text = err
                    .server_message()
                    .unwrap_or("Could not register (server error)")
                    .to_string();
                model.registration = RegistrationDraft {
                    error: Some(text),
                    ..draft
                };
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) {
        let auth = self.model.lock().await.auth;
        if auth != AuthState::LoggedOut {
            info!("ending current session before signing in again");
            self.logout().await;
        }
        self.model.lock().await.auth = AuthState::LoggingIn;

        let result = self.api.login(username.trim(), password).await;
        let failure = match result {
            Ok(response) if response.success => None,
            Ok(_) => Some("Login failed".to_string()),
            Err(err) => {
                warn!("login failed: {err}");
                Some(err.server_message().unwrap_or("Login failed").to_string())
            }
        };

        if let Some(text) = failure {
            let mut model = self.model.lock().await;
            model.auth = AuthState::LoggedOut;
            model.notice = Some(Notice::blocking(text));
            return;
        }

        self.model.lock().await.auth = AuthState::LoggedIn;
        self.load_catalog().await;
        self.load_user_state().await;

        let mut model = self.model.lock().await;
        model.view = View::Portfolio;
        info!("signed in as {:?}", model.username);
    }

    pub async fn logout(&self) {
        self.model.lock().await.auth = AuthState::LoggingOut;

        if let Err(err) = self.api.logout().await {
            warn!("logout request failed: {err}");
        }

        let mut model = self.model.lock().await;
        model.progress = ProgressState::default();
        model.username = None;
        model.current_project = None;
        model.dashboard = None;
        model.research.clear();
        model.research_modal = None;
        model.dashboard_requests.begin();
        model.view = View::Login;
        model.auth = AuthState::LoggedOut;
    }

    pub async fn show_login(&self) {
        self.navigate(View::Login).await;
    }

    pub async fn show_portfolio(&self) {
        self.navigate(View::Portfolio).await;
    }

    pub async fn go_to_projects(&self) {
        self.navigate(View::Projects).await;
    }

    async fn navigate(&self, view: View) {
        let mut model = self.model.lock().await;
        model.view = view;
        model.research_modal = None;
    }

    pub async fn open_research(&self, project: usize) -> Result<(), SessionError> {
        let mut model = self.model.lock().await;
        if project >= model.project_count() {
            return Err(SessionError::UnknownProject(project));
        }
        model.research_modal = Some(project);
        Ok(())
    }

    pub async fn close_research(&self) {
        self.model.lock().await.research_modal = None;
    }

    pub async fn select_project(&self, project: usize) -> Result<(), SessionError> {
        let (ticket, task_count) = {
            let mut model = self.model.lock().await;
            model.check_unlocked(project)?;
            let task_count = model.task_count(project);
            model.view = View::Dashboard;
            model.research_modal = None;
            model.current_project = Some(project);
            model.dashboard = Some(Dashboard {
                project,
                completion: vec![false; task_count],
                source: None,
            });
            (model.dashboard_requests.begin(), task_count)
        };

        {
            let mut cache = self.cache.lock().await;
            cache.set_current_project(project);
            if let Err(err) = cache.persist().await {
                error!("failed to persist current project: {err}");
            }
        }

        let snapshot = self.read_progress().await;
        self.apply_dashboard_read(ticket, project, task_count, &snapshot)
            .await;
        Ok(())
    }

    pub async fn toggle_task(
        &self,
        project: usize,
        task: usize,
        checked: bool,
    ) -> Result<(), SessionError> {
        let (ticket, task_count) = {
            let mut model = self.model.lock().await;
            model.check_unlocked(project)?;
            let task_count = model.task_count(project);
            if task >= task_count {
                return Err(SessionError::UnknownTask { project, task });
            }
            (model.dashboard_requests.begin(), task_count)
        };

        match self.api.set_task_completion(project, task, checked).await {
            Ok(_) => {
                let snapshot = self.read_progress().await;
                self.apply_dashboard_read(ticket, project, task_count, &snapshot)
                    .await;
            }
            Err(err) => {
                warn!("task update failed, saving locally: {err}");
                let snapshot = {
                    let mut cache = self.cache.lock().await;
                    let mut completion = cache.task_completion();
                    completion.set(project, task, checked);
                    if let Err(err) = cache.set_task_completion(&completion) {
                        error!("failed to encode task completion: {err}");
                    }
                    if let Err(err) = cache.persist().await {
                        error!("failed to persist task completion: {err}");
                    }
                    ProgressSnapshot::from_cache(&cache)
                };
                self.apply_dashboard_read(ticket, project, task_count, &snapshot)
                    .await;
                self.model.lock().await.notice = Some(Notice::soft(
                    "Task saved locally (server unavailable).",
                ));
            }
        }
        Ok(())
    }

    pub async fn complete_project(&self) {
        let selected = self.model.lock().await.current_project;
        let index = match selected {
            Some(index) => Some(index),
            None => self.cache.lock().await.current_project(),
        };
        let Some(index) = index else {
            self.model.lock().await.notice = Some(Notice::blocking("No project selected"));
            return;
        };

        {
            let mut model = self.model.lock().await;
            if let Err(err) = model.check_unlocked(index) {
                warn!("refusing to complete project {index}: {err}");
                model.notice = Some(Notice::blocking(format!("Cannot complete: {err}.")));
                return;
            }
        }

        match self.api.complete_project(index).await {
            Ok(response) if response.success => {
                let mut model = self.model.lock().await;
                model.progress = response.progress();
                model.last_synced = Some(Local::now());
                model.notice = Some(Notice::blocking(
                    "Project completed! You earned 50 points and the next project unlocked.",
                ));
                info!("completed project {index} on server");
            }
            Ok(_) => warn!("server declined completion of project {index}"),
            Err(err) => {
                warn!("completion failed, recording locally: {err}");
                self.complete_locally(index).await;
            }
        }

        let mut model = self.model.lock().await;
        model.view = View::Projects;
        model.research_modal = None;
    }

    async fn complete_locally(&self, index: usize) {
        let mut model = self.model.lock().await;
        let project_count = model.project_count();
        let Completion::Awarded { advanced } = model.progress.complete(index, project_count) else {
            debug!("project {index} already completed, nothing to record");
            return;
        };

        let mut cache = self.cache.lock().await;
        let mut completed = cache.completed_projects();
        if completed.insert(index) {
            cache.set_completed_projects(&completed);
            let points = cache.points().saturating_add(POINTS_PER_PROJECT);
            cache.set_points(points);
        }
        if advanced {
            cache.set_unlocked_index(model.progress.unlocked_index);
        }

        if let Err(err) = cache.persist().await {
            error!("failed to persist local completion: {err}");
        }
        model.notice = Some(Notice::soft(
            "Project completed locally (server unavailable). Next project unlocked when server is available.",
        ));
    }

    pub async fn reset_progress(&self) {
        match self.api.reset_progress().await {
            Ok(_) => {
                self.load_user_state().await;
                let mut model = self.model.lock().await;
                model.clear_selection();
                let mut cache = self.cache.lock().await;
                cache.clear_current_project();
                if let Err(err) = cache.persist().await {
                    error!("failed to persist cleared selection: {err}");
                }
                model.notice = Some(Notice::blocking("Progress reset on server."));
            }
            Err(err) => {
                warn!("reset failed, resetting locally: {err}");
                let mut model = self.model.lock().await;
                let mut cache = self.cache.lock().await;
                cache.reset_progress();
                if let Err(err) = cache.persist().await {
                    error!("failed to persist local reset: {err}");
                }
                model.progress = ProgressState::default();
                model.clear_selection();
                let snapshot = ProgressSnapshot::from_cache(&cache);
                model.apply_research(&snapshot);
                model.notice = Some(Notice::soft("Progress reset locally (server unavailable)."));
            }
        }
    }

    async fn read_progress(&self) -> ProgressSnapshot {
        let remote = RemoteProvider::new(self.api.clone());
        let local = LocalProvider::new(Arc::clone(&self.cache));
        read_progress(&remote, &local).await
    }

    async fn apply_dashboard_read(
        &self,
        ticket: Ticket,
        project: usize,
        task_count: usize,
        snapshot: &ProgressSnapshot,
    ) {
        let mut model = self.model.lock().await;
        if !model.dashboard_requests.is_current(ticket) {
            debug!("discarding stale read for project {project}");
            return;
        }
        if model.current_project == Some(project) {
            model.dashboard = Some(Dashboard {
                project,
                completion: snapshot.completion_for(project, task_count),
                source: Some(snapshot.source),
            });
        }
        model.apply_research(snapshot);
        if snapshot.source == Source::Remote {
            model.last_synced = Some(Local::now());
        }
    }

    pub async fn render(&self, carousel_slide: usize) -> String {
        let mut model = self.model.lock().await;
        let page = crate::ui::render_page(&model, carousel_slide, self.api.base_url());
        model.notice = None;
        page
    }
}
