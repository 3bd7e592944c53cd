//! One-way sync of a finished session to the CMS backend. Credentials are a
//! site URL plus a username and application password; the preflight and the
//! upload are the only two calls, and nothing outside this module knows the
//! protocol.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::models::{Session, UserAccount};

/// Bound on every sync request; one outcome is recorded per attempt.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_PROBE_PATH: &str = "/wp-json/wp/v2/users/me";
const SESSIONS_PATH: &str = "/wp-json/skylark/v1/sessions";

// ===== ENUMS =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SyncResponseStatus {
    Success,
    NotAuthorized,
    InvalidSession,
    Failure,
}

// ===== RESPONSE TYPES =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse<T> {
    pub status: SyncResponseStatus,
    pub data: Option<T>,
}

impl<T> SyncResponse<T> {
    pub fn new(status: SyncResponseStatus, data: Option<T>) -> Self {
        Self { status, data }
    }
}

/// The backend's record of an uploaded session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSession {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

// ===== CONFIG =====

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub website_url: String,
    pub username: String,
    pub app_password: String,
}

impl SyncConfig {
    /// Builds a config from a stored account, normalizing the site URL.
    pub fn from_account(account: &UserAccount) -> Result<Self> {
        let parsed = Url::parse(&account.website_url)
            .map_err(|e| anyhow!("Invalid website URL '{}': {}", account.website_url, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(anyhow!(
                "Website URL must be http or https, got '{}'",
                parsed.scheme()
            ));
        }
        if account.username.is_empty() || account.app_password.is_empty() {
            return Err(anyhow!("Username and application password are required"));
        }

        let website_url = account.website_url.trim_end_matches('/').to_string();
        Ok(Self {
            website_url,
            username: account.username.clone(),
            app_password: account.app_password.clone(),
        })
    }

    /// Reads credentials from environment variables, used by scripted runs
    /// and integration tests.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let account = UserAccount {
            website_url: std::env::var("SKYLARK_SITE_URL")
                .map_err(|_| anyhow!("SKYLARK_SITE_URL environment variable is required"))?,
            username: std::env::var("SKYLARK_USERNAME")
                .map_err(|_| anyhow!("SKYLARK_USERNAME environment variable is required"))?,
            app_password: std::env::var("SKYLARK_APP_PASSWORD")
                .map_err(|_| anyhow!("SKYLARK_APP_PASSWORD environment variable is required"))?,
        };
        Self::from_account(&account)
    }

    /// Stored account when present, environment otherwise.
    pub fn from_account_or_env(account: Option<&UserAccount>) -> Result<Self> {
        match account {
            Some(account) => Self::from_account(account),
            None => Self::from_env(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.website_url, path)
    }

    fn authorization_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.app_password);
        format!("Basic {}", base64::encode(credentials))
    }
}

// ===== CLIENT IMPLEMENTATION =====

pub struct CmsClient {
    config: SyncConfig,
    http_client: reqwest::Client,
}

impl CmsClient {
    pub fn new(config: SyncConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&config.authorization_header())
                .map_err(|e| anyhow!("Invalid auth header: {}", e))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(SYNC_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Credential preflight: a boolean answer, no session data involved.
    pub async fn authenticate(&self) -> Result<bool> {
        let url = self.config.endpoint(AUTH_PROBE_PATH);
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!("Credential check accepted for {}", self.config.username);
            return Ok(true);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(false);
        }
        Err(anyhow!(
            "Credential check failed: HTTP {} from {}",
            status,
            url
        ))
    }

    /// Uploads one session document. Succeeds with the remote id or fails
    /// outright; there is no partial success and no retry here.
    pub async fn upload_session(&self, session: &Session) -> Result<SyncResponse<RemoteSession>> {
        let url = self.config.endpoint(SESSIONS_PATH);
        let response = self.http_client.post(&url).json(session).send().await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let remote: RemoteSession = serde_json::from_str(&body).map_err(|e| {
                anyhow!("Failed to parse upload response: {} - Response: {}", e, body)
            })?;
            return Ok(SyncResponse::new(SyncResponseStatus::Success, Some(remote)));
        }

        warn!(
            "Upload of session {} rejected: HTTP {} - {}",
            session.id,
            status,
            error_message(&body)
        );
        let mapped = match status.as_u16() {
            401 | 403 => SyncResponseStatus::NotAuthorized,
            400 | 422 => SyncResponseStatus::InvalidSession,
            _ => SyncResponseStatus::Failure,
        };
        Ok(SyncResponse::new(mapped, None))
    }
}

/// Pulls a human-readable message out of a backend error body, falling back
/// to the raw body.
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(error) = value.get("error").and_then(|m| m.as_str()) {
            return error.to_string();
        }
    }
    body.to_string()
}
