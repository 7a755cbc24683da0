//! REST API client for the to-do service.
//!
//! `TodoApi` is the seam the stores depend on; `HttpApi` is the reqwest
//! implementation. Every endpoint goes through `HttpApi::send_text`, so
//! transport failures, non-2xx statuses, and malformed bodies all surface as
//! one [`ApiError`] shape.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::types::{
    ApiEnvelope, ApiError, AuthHeaders, Credentials, HistoryDay, LoginResponse, NewTask, PublicAccess, Task,
    TaskPatch, User, UserSettings,
};
use crate::config::ClientConfig;

// =============================================================================
// ENDPOINTS
// =============================================================================

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";
const PUBLIC_ACCESS_PATH: &str = "/public-access";
const USER_SETTINGS_PATH: &str = "/user/settings";
const TODOS_PATH: &str = "/todos";
const HISTORY_PATH: &str = "/history";

fn todo_endpoint(id: i64) -> String {
    format!("{TODOS_PATH}/{id}")
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

// =============================================================================
// TRAIT
// =============================================================================

/// One method per REST endpoint consumed by the client.
///
/// Unauthenticated endpoints take no headers; the rest take the headers the
/// caller obtained from its session at call time.
#[async_trait::async_trait]
pub trait TodoApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError>;

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError>;

    async fn public_access(&self) -> Result<PublicAccess, ApiError>;

    async fn update_settings(&self, headers: &AuthHeaders, settings: UserSettings) -> Result<UserSettings, ApiError>;

    async fn list_todos(&self, headers: &AuthHeaders) -> Result<Vec<Task>, ApiError>;

    async fn create_todo(&self, headers: &AuthHeaders, task: &NewTask) -> Result<Task, ApiError>;

    async fn update_todo(&self, headers: &AuthHeaders, id: i64, patch: &TaskPatch) -> Result<Task, ApiError>;

    async fn delete_todo(&self, headers: &AuthHeaders, id: i64) -> Result<(), ApiError>;

    async fn history(&self, headers: &AuthHeaders) -> Result<Vec<HistoryDay>, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client for `config.base_url` with the configured timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the reqwest client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, headers: &AuthHeaders) -> RequestBuilder {
        headers
            .iter()
            .fold(self.http.request(method, join_url(&self.base_url, path)), |req, (name, value)| {
                req.header(name.as_str(), value.as_str())
            })
    }

    async fn send_text(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body: text });
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let text = Self::send_text(request).await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl TodoApi for HttpApi {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let request = self
            .request(Method::POST, LOGIN_PATH, &AuthHeaders::new())
            .json(credentials);
        Self::send_json(request).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        let request = self
            .request(Method::POST, REGISTER_PATH, &AuthHeaders::new())
            .json(credentials);
        Self::send_json::<ApiEnvelope<User>>(request).await?.into_data()
    }

    async fn public_access(&self) -> Result<PublicAccess, ApiError> {
        Self::send_json(self.request(Method::GET, PUBLIC_ACCESS_PATH, &AuthHeaders::new())).await
    }

    async fn update_settings(&self, headers: &AuthHeaders, settings: UserSettings) -> Result<UserSettings, ApiError> {
        let request = self
            .request(Method::PUT, USER_SETTINGS_PATH, headers)
            .json(&settings);
        Self::send_json::<ApiEnvelope<UserSettings>>(request)
            .await?
            .into_data()
    }

    async fn list_todos(&self, headers: &AuthHeaders) -> Result<Vec<Task>, ApiError> {
        Self::send_json(self.request(Method::GET, TODOS_PATH, headers)).await
    }

    async fn create_todo(&self, headers: &AuthHeaders, task: &NewTask) -> Result<Task, ApiError> {
        Self::send_json(self.request(Method::POST, TODOS_PATH, headers).json(task)).await
    }

    async fn update_todo(&self, headers: &AuthHeaders, id: i64, patch: &TaskPatch) -> Result<Task, ApiError> {
        let request = self
            .request(Method::PUT, &todo_endpoint(id), headers)
            .json(patch);
        Self::send_json(request).await
    }

    async fn delete_todo(&self, headers: &AuthHeaders, id: i64) -> Result<(), ApiError> {
        Self::send_text(self.request(Method::DELETE, &todo_endpoint(id), headers)).await?;
        Ok(())
    }

    async fn history(&self, headers: &AuthHeaders) -> Result<Vec<HistoryDay>, ApiError> {
        Self::send_json(self.request(Method::GET, HISTORY_PATH, headers)).await
    }
}
