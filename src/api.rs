use crate::errors::ApiError;
use crate::models::{
    Ack, Catalog, CompleteRequest, CompleteResponse, CurrentUser, LoginRequest, LoginResponse,
    RegisterRequest, TaskToggleRequest,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

// One attempt per call: no retries and no timeout of its own.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn register(
        &self,
        username: &str,
        admission: &str,
        email: &str,
        password: &str,
    ) -> Result<Ack, ApiError> {
        let body = RegisterRequest {
            username,
            admission,
            email,
            password,
        };
        self.call(Method::POST, "/api/register", Some(to_body(&body)))
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { username, password };
        self.call(Method::POST, "/api/login", Some(to_body(&body)))
            .await
    }

    pub async fn logout(&self) -> Result<Ack, ApiError> {
        self.call(Method::POST, "/api/logout", None).await
    }

    pub async fn fetch_projects(&self) -> Result<Catalog, ApiError> {
        self.call(Method::GET, "/api/projects", None).await
    }

    pub async fn fetch_current_user(&self) -> Result<CurrentUser, ApiError> {
        self.call(Method::GET, "/api/user", None).await
    }

    pub async fn set_task_completion(
        &self,
        project_index: usize,
        task_index: usize,
        checked: bool,
    ) -> Result<Ack, ApiError> {
        let body = TaskToggleRequest {
            project_index,
            task_index,
            checked,
        };
        self.call(Method::POST, "/api/user/progress/task", Some(to_body(&body)))
            .await
    }

    pub async fn complete_project(&self, project_index: usize) -> Result<CompleteResponse, ApiError> {
        let body = CompleteRequest { project_index };
        self.call(Method::POST, "/api/user/progress/complete", Some(to_body(&body)))
            .await
    }

    pub async fn reset_progress(&self) -> Result<Ack, ApiError> {
        self.call(Method::POST, "/api/user/progress/reset", None)
            .await
    }

    /// The body is parsed before the status is checked, so a non-JSON error
    /// page surfaces as `MalformedResponse` rather than `ServerRejected`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!("{method} {url}");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let unreachable = |source| ApiError::NetworkUnreachable {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = request.send().await.map_err(unreachable)?;
        let status = response.status();
        let raw = response.text().await.map_err(unreachable)?;

        let malformed = |raw: String| ApiError::MalformedResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            raw,
        };
        let payload: Value = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(_) => return Err(malformed(raw)),
        };

        if !status.is_success() {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned);
            return Err(ApiError::ServerRejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
                raw,
            });
        }

        serde_json::from_value(payload).map_err(|_| malformed(raw))
    }
}

fn to_body(body: &impl serde::Serialize) -> Value {
    // Request structs only hold strings, numbers and bools.
    serde_json::to_value(body).unwrap_or(Value::Null)
}
