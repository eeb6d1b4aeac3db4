#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PROJECT_NAMES: [&str; 4] = [
    "Organizational Support",
    "Student Information",
    "Energy Monitoring",
    "Library Management",
];

#[derive(Debug, Clone, Default)]
pub struct FakeUser {
    pub password: String,
    pub email: String,
    pub admission: String,
    pub unlocked_index: usize,
    pub completed_projects: Vec<usize>,
    pub task_completion: BTreeMap<String, Vec<bool>>,
    pub points: u32,
}

#[derive(Debug, Default)]
pub struct FakeDb {
    pub users: HashMap<String, FakeUser>,
    /// Answer every call with a non-JSON 503.
    pub offline: bool,
    /// Per-call delays for `GET /api/user`, applied after the reply is built.
    pub user_read_delays: VecDeque<Duration>,
}

pub type SharedDb = Arc<Mutex<FakeDb>>;

pub struct FakeApi {
    pub base_url: String,
    pub db: SharedDb,
}

impl FakeApi {
    pub fn set_offline(&self, offline: bool) {
        self.db.lock().unwrap().offline = offline;
    }

    pub fn delay_next_user_read(&self, delay: Duration) {
        self.db.lock().unwrap().user_read_delays.push_back(delay);
    }

    pub fn set_task_completion(&self, username: &str, project: usize, checked: Vec<bool>) {
        let mut db = self.db.lock().unwrap();
        let user = db.users.get_mut(username).unwrap();
        user.task_completion.insert(project.to_string(), checked);
    }

    pub fn user(&self, username: &str) -> FakeUser {
        self.db.lock().unwrap().users[username].clone()
    }

    pub fn seed_progress(&self, username: &str, unlocked_index: usize, completed: &[usize], points: u32) {
        let mut db = self.db.lock().unwrap();
        let user = db.users.get_mut(username).unwrap();
        user.unlocked_index = unlocked_index;
        user.completed_projects = completed.to_vec();
        user.points = points;
    }
}

pub async fn spawn_fake_api() -> FakeApi {
    let mut db = FakeDb::default();
    db.users.insert(
        "demo".to_string(),
        FakeUser {
            password: "demo123".to_string(),
            email: "demo@example.com".to_string(),
            admission: "123".to_string(),
            ..FakeUser::default()
        },
    );
    let db: SharedDb = Arc::new(Mutex::new(db));

    let app = Router::new()
        .route("/api/projects", get(projects))
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .route("/api/user/progress/task", post(toggle_task))
        .route("/api/user/progress/complete", post(complete_project))
        .route("/api/user/progress/reset", post(reset_progress))
        .with_state(Arc::clone(&db));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeApi {
        base_url: format!("http://{addr}"),
        db,
    }
}

fn unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "service unavailable").into_response()
}

fn rejected(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

fn body_json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
}

fn session_user(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().strip_prefix("session="))
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

fn index(body: &Value, key: &str) -> usize {
    body.get(key).and_then(Value::as_u64).unwrap_or(0) as usize
}

async fn projects(State(db): State<SharedDb>) -> Response {
    if db.lock().unwrap().offline {
        return unavailable();
    }
    let projects: Vec<Value> = PROJECT_NAMES
        .iter()
        .enumerate()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "description": format!("{name} project"),
                "image": format!("images/project{id}.jpeg"),
                "resources": [{ "label": format!("{name} guide"), "url": format!("https://example.com/{id}") }],
            })
        })
        .collect();
    Json(json!({
        "projects": projects,
        "project_tasks": [
            ["Requirement Gathering", "Design", "Development", "Testing", "Deployment"],
            ["Student Data Entry", "Grades Input", "Attendance Tracking", "Reporting"],
            ["Meter Installation", "Data Monitoring", "Visualization", "Alerts Setup"],
            ["Book Cataloging", "Borrowing Management", "Return Tracking", "User Accounts"],
        ],
    }))
    .into_response()
}

async fn register(State(db): State<SharedDb>, body: Bytes) -> Response {
    let body = body_json(&body);
    let mut db = db.lock().unwrap();
    if db.offline {
        return unavailable();
    }
    let (username, email, password) = (field(&body, "username"), field(&body, "email"), field(&body, "password"));
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return rejected(StatusCode::BAD_REQUEST, "Missing fields");
    }
    if db.users.contains_key(username) || db.users.values().any(|user| user.email == email) {
        return rejected(StatusCode::BAD_REQUEST, "Username or email already exists");
    }
    db.users.insert(
        username.to_string(),
        FakeUser {
            password: password.to_string(),
            email: email.to_string(),
            admission: field(&body, "admission").to_string(),
            ..FakeUser::default()
        },
    );
    Json(json!({ "success": true, "message": "Account created" })).into_response()
}

async fn login(State(db): State<SharedDb>, body: Bytes) -> Response {
    let body = body_json(&body);
    let db = db.lock().unwrap();
    if db.offline {
        return unavailable();
    }
    let username = field(&body, "username");
    let password = body.get("password").and_then(Value::as_str).unwrap_or("");
    match db.users.get(username) {
        Some(user) if user.password == password => (
            [(header::SET_COOKIE, format!("session={username}; Path=/; HttpOnly"))],
            Json(json!({ "success": true, "username": username })),
        )
            .into_response(),
        _ => rejected(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

async fn logout(State(db): State<SharedDb>) -> Response {
    if db.lock().unwrap().offline {
        return unavailable();
    }
    (
        [(header::SET_COOKIE, "session=; Path=/; Max-Age=0".to_string())],
        Json(json!({ "success": true })),
    )
        .into_response()
}

async fn current_user(State(db): State<SharedDb>, headers: HeaderMap) -> Response {
    let (reply, delay) = {
        let mut db = db.lock().unwrap();
        if db.offline {
            return unavailable();
        }
        let reply = match session_user(&headers)
            .and_then(|name| db.users.get(&name).map(|user| (name, user)))
        {
            Some((username, user)) => json!({
                "logged_in": true,
                "username": username,
                "admission": user.admission,
                "email": user.email,
                "unlocked_index": user.unlocked_index,
                "completed_projects": user.completed_projects,
                "task_completion": user.task_completion,
                "points": user.points,
            }),
            None => json!({ "logged_in": false }),
        };
        (reply, db.user_read_delays.pop_front())
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(reply).into_response()
}

async fn toggle_task(State(db): State<SharedDb>, headers: HeaderMap, body: Bytes) -> Response {
    let body = body_json(&body);
    let mut db = db.lock().unwrap();
    if db.offline {
        return unavailable();
    }
    let Some(user) = session_user(&headers).and_then(|name| db.users.get_mut(&name)) else {
        return rejected(StatusCode::UNAUTHORIZED, "Not logged in");
    };
    let (project, task) = (index(&body, "project_index"), index(&body, "task_index"));
    let checked = body.get("checked").and_then(Value::as_bool).unwrap_or(false);
    let entry = user.task_completion.entry(project.to_string()).or_default();
    if entry.len() <= task {
        entry.resize(task + 1, false);
    }
    entry[task] = checked;
    Json(json!({ "success": true, "task_completion": user.task_completion })).into_response()
}

async fn complete_project(State(db): State<SharedDb>, headers: HeaderMap, body: Bytes) -> Response {
    let body = body_json(&body);
    let mut db = db.lock().unwrap();
    if db.offline {
        return unavailable();
    }
    let Some(user) = session_user(&headers).and_then(|name| db.users.get_mut(&name)) else {
        return rejected(StatusCode::UNAUTHORIZED, "Not logged in");
    };
    let project = index(&body, "project_index");
    if !user.completed_projects.contains(&project) {
        user.completed_projects.push(project);
        user.points += 50;
        if project == user.unlocked_index && user.unlocked_index < PROJECT_NAMES.len() - 1 {
            user.unlocked_index += 1;
        }
    }
    Json(json!({
        "success": true,
        "completed_projects": user.completed_projects,
        "unlocked_index": user.unlocked_index,
        "points": user.points,
    }))
    .into_response()
}

async fn reset_progress(State(db): State<SharedDb>, headers: HeaderMap) -> Response {
    let mut db = db.lock().unwrap();
    if db.offline {
        return unavailable();
    }
    let Some(user) = session_user(&headers).and_then(|name| db.users.get_mut(&name)) else {
        return rejected(StatusCode::UNAUTHORIZED, "Not logged in");
    };
    user.unlocked_index = 0;
    user.completed_projects.clear();
    user.task_completion.clear();
    user.points = 0;
    Json(json!({ "success": true })).into_response()
}
