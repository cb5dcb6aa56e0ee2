//! Client for the remote tracker API

use std::time::Duration;

use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};
use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::auth::{ApiUser, AuthSession, UserData};
use crate::{
    habits::{calendar::first_of_month, BackendHabit, BackendHabitMetrics, Habit, HabitMetrics},
    state::SessionRecord,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("{0}")]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body of the tracker API; either field may carry the message
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Body of `POST /focus-time`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FocusTimeRequest {
    time_from: String,
    time_to: String,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CreateHabitRequest<'a> {
    name: &'a str,
}

/// HTTP client with the session injected; authenticated calls carry its
/// bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: AuthSession,
}

impl ApiClient {
    pub fn new(base_url: &str, session: AuthSession, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange an OAuth code for a user and sign in.
    ///
    /// The previous session is cleared first and stays cleared on failure.
    pub async fn exchange_code(&self, code: &str) -> Result<UserData, ClientError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::InvalidInput("Invalid authentication code".to_string()));
        }

        self.session
            .sign_out()
            .await
            .map_err(ClientError::InvalidResponse)?;

        let response = self
            .http
            .get(self.url("/auth/callback"))
            .query(&[("code", code)])
            .send()
            .await?;
        let payload: Option<ApiUser> = check(response).await?.json().await?;
        let payload = payload
            .ok_or_else(|| ClientError::InvalidResponse("empty authentication response".to_string()))?;

        self.adopt(payload).await
    }

    /// Sign in with a callback payload received directly
    pub async fn adopt(&self, payload: ApiUser) -> Result<UserData, ClientError> {
        let user = payload.into_user().map_err(ClientError::InvalidResponse)?;
        self.session
            .sign_in(user.clone())
            .await
            .map_err(ClientError::InvalidResponse)?;
        Ok(user)
    }

    pub async fn list_habits(&self) -> Result<Vec<Habit>, ClientError> {
        let response = self.authed(Method::GET, self.url("/habits"))?.send().await?;
        let habits: Vec<BackendHabit> = check(response).await?.json().await?;
        debug!("Loaded {} habits", habits.len());
        Ok(habits.into_iter().map(Habit::from).collect())
    }

    pub async fn create_habit(&self, name: &str) -> Result<(), ClientError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidInput("Habit name is required".to_string()));
        }

        let response = self
            .authed(Method::POST, self.url("/habits"))?
            .json(&CreateHabitRequest { name })
            .send()
            .await?;
        check(response).await?;
        info!("Created habit '{}'", name);
        Ok(())
    }

    /// Toggle today's completion of a habit
    pub async fn toggle_habit(&self, id: &str) -> Result<(), ClientError> {
        let url = self.habit_url(id, Some("toggle"))?;
        let response = self.authed(Method::PATCH, url)?.send().await?;
        check(response).await?;
        Ok(())
    }

    pub async fn delete_habit(&self, id: &str) -> Result<(), ClientError> {
        let url = self.habit_url(id, None)?;
        let response = self.authed(Method::DELETE, url)?.send().await?;
        check(response).await?;
        info!("Deleted habit {}", id);
        Ok(())
    }

    /// Completions of a habit for the month containing `month`
    pub async fn habit_metrics(&self, id: &str, month: NaiveDate) -> Result<HabitMetrics, ClientError> {
        let url = self.habit_url(id, Some("metrics"))?;
        let response = self
            .authed(Method::GET, url)?
            .query(&[("date", month_start_timestamp(month))])
            .send()
            .await?;
        let metrics: BackendHabitMetrics = check(response).await?.json().await?;
        Ok(metrics.into())
    }

    pub async fn save_focus_session(&self, record: &SessionRecord) -> Result<(), ClientError> {
        let body = FocusTimeRequest {
            time_from: record.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            time_to: record.ended_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            kind: record.kind.as_str(),
        };
        let response = self
            .authed(Method::POST, self.url("/focus-time"))?
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/habits/{id}[/{action}]` with `id` escaped as a single segment
    fn habit_url(&self, id: &str, action: Option<&str>) -> Result<Url, ClientError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidInput(format!("invalid API URL '{}': {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidInput(format!("invalid API URL '{}'", self.base_url)))?;
            segments.pop_if_empty().push("habits").push(id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }

    fn authed<U: IntoUrl>(&self, method: Method, url: U) -> Result<RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::Unauthenticated)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }
}

/// Turn a non-success response into `ClientError::Api`
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: ErrorBody = response.json().await.unwrap_or_default();
    let message = body
        .message
        .or(body.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ClientError::Api { status, message })
}

fn month_start_timestamp(month: NaiveDate) -> String {
    let first = first_of_month(month);
    Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN))
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
