//! Client-Initiated Backchannel Authentication against the identity provider.
//!
//! `POST /bc-authorize` starts a request that the user approves on another
//! device; `POST /oauth/token` is then polled with the returned
//! `auth_req_id` until a token is issued, the user refuses, or time runs out.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::CibaConfig;

pub const CIBA_GRANT_TYPE: &str = "urn:openid:params:grant-type:ciba";
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);
const BINDING_MESSAGE_MAX: usize = 64;

#[derive(Debug, Error)]
pub enum CibaError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("The user has denied the request")]
    AccessDenied,

    #[error("The authorization request expired before the user responded")]
    Expired,

    #[error("Timed out waiting for the user to approve the request")]
    Timeout,

    #[error("{code}: {description}")]
    Provider { code: String, description: String },

    #[error("invalid response from identity provider: {0}")]
    InvalidResponse(String),
}

/// Tokens issued once the user approved.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Credentials {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default)]
    pub expires_in: Option<u64>,

    #[serde(default)]
    pub scope: Option<String>,
}

/// What is being asked of the user.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub user_id: String,
    pub binding_message: String,
    pub scopes: Vec<String>,
}

/// Response of `/bc-authorize`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackchannelAuthorization {
    pub auth_req_id: String,

    #[serde(default)]
    pub expires_in: Option<u64>,

    /// Minimum seconds between polls requested by the provider.
    #[serde(default)]
    pub interval: Option<u64>,
}

/// One answer from the token endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Pending,
    SlowDown,
    Granted(Credentials),
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,

    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CibaClient {
    http: reqwest::Client,
    config: CibaConfig,
}

impl CibaClient {
    pub fn new(http: reqwest::Client, config: CibaConfig) -> Self {
        Self { http, config }
    }

    /// Starts a backchannel authorization request for the user.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<BackchannelAuthorization, CibaError> {
        let login_hint = json!({
            "format": "iss_sub",
            "iss": format!("{}/", self.config.domain),
            "sub": request.user_id,
        })
        .to_string();
        let scope = request.scopes.join(" ");

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("login_hint", login_hint.as_str()),
            ("scope", scope.as_str()),
            ("audience", self.config.audience.as_str()),
            ("binding_message", request.binding_message.as_str()),
        ];

        let response = self
            .http
            .post(format!("{}/bc-authorize", self.config.domain))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(oauth_error(response).await);
        }

        response
            .json::<BackchannelAuthorization>()
            .await
            .map_err(|e| CibaError::InvalidResponse(e.to_string()))
    }

    /// Asks the token endpoint once whether the request was approved.
    pub async fn poll_token(&self, auth_req_id: &str) -> Result<PollOutcome, CibaError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.config.domain))
            .form(&[
                ("grant_type", CIBA_GRANT_TYPE),
                ("auth_req_id", auth_req_id),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            return response
                .json::<Credentials>()
                .await
                .map(PollOutcome::Granted)
                .map_err(|e| CibaError::InvalidResponse(e.to_string()));
        }

        match oauth_error(response).await {
            CibaError::Provider { code, .. } if code == "authorization_pending" => {
                Ok(PollOutcome::Pending)
            }
            CibaError::Provider { code, .. } if code == "slow_down" => Ok(PollOutcome::SlowDown),
            other => Err(other),
        }
    }

    /// Runs the whole flow: start the request, then poll until the user
    /// answers. `on_pending` fires each time the provider reports that the
    /// user has not answered yet.
    pub async fn request_and_wait<F>(
        &self,
        request: &AuthorizationRequest,
        on_pending: F,
    ) -> Result<Credentials, CibaError>
    where
        F: Fn(),
    {
        let started = self.authorize(request).await?;
        tracing::info!(
            auth_req_id = %started.auth_req_id,
            user_id = %request.user_id,
            "backchannel authorization requested"
        );

        let deadline = poll_deadline(Instant::now(), self.config.timeout, started.expires_in);

        let mut interval = self
            .config
            .poll_interval
            .max(Duration::from_secs(started.interval.unwrap_or(0)));

        loop {
            let next_poll = Instant::now().checked_add(interval);
            let in_time = match (next_poll, deadline) {
                (Some(next_poll), Some(deadline)) => next_poll <= deadline,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !in_time {
                return Err(CibaError::Timeout);
            }
            tokio::time::sleep(interval).await;

            match self.poll_token(&started.auth_req_id).await? {
                PollOutcome::Granted(credentials) => {
                    tracing::info!(
                        auth_req_id = %started.auth_req_id,
                        "backchannel authorization granted"
                    );
                    return Ok(credentials);
                }
                PollOutcome::Pending => {
                    tracing::debug!(auth_req_id = %started.auth_req_id, "authorization pending");
                    on_pending();
                }
                PollOutcome::SlowDown => {
                    interval = interval.saturating_add(SLOW_DOWN_STEP);
                    tracing::debug!(?interval, "identity provider asked to slow down");
                }
            }
        }
    }
}

/// The earlier of the configured timeout and the request's own expiry.
/// `None` when neither fits in an `Instant`, meaning polling is unbounded.
fn poll_deadline(now: Instant, timeout: Duration, expires_in: Option<u64>) -> Option<Instant> {
    let configured = now.checked_add(timeout);
    let expiry = expires_in.and_then(|secs| now.checked_add(Duration::from_secs(secs)));
    match (configured, expiry) {
        (Some(configured), Some(expiry)) => Some(configured.min(expiry)),
        (configured, expiry) => configured.or(expiry),
    }
}

/// Reads an OAuth error body and maps the well-known codes.
async fn oauth_error(response: reqwest::Response) -> CibaError {
    let status = response.status();
    match response.json::<OAuthErrorBody>().await {
        Ok(body) => match body.error.as_str() {
            "access_denied" => CibaError::AccessDenied,
            "expired_token" => CibaError::Expired,
            _ => CibaError::Provider {
                description: body.error_description.unwrap_or_else(|| body.error.clone()),
                code: body.error,
            },
        },
        Err(_) => CibaError::InvalidResponse(format!("unexpected status {}", status)),
    }
}

/// Restricts a binding message to the characters providers accept and to
/// at most 64 of them.
pub fn sanitize_binding_message(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || "+-_.,:#".contains(*c))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(BINDING_MESSAGE_MAX).collect::<String>().trim_end().to_string()
}
