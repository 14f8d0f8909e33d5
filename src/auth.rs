//! OAuth2 authentication against the Microsoft identity platform
//!
//! Supports device-code login and refresh-token exchange with token
//! persistence. Refresh tokens rotate on every exchange, so the new pair is
//! written to the token store before it is handed back to the caller.

use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{OdriveError, Result};
use crate::token::{TokenPair, TokenStore};

/// Identity provider token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Device-code initiation response
#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    interval: Option<u64>,
}

/// OAuth client for the device-code and refresh-token grants
pub struct AuthClient {
    client: reqwest::Client,
    authority_url: String,
    client_id: String,
    scope: String,
    login_scope: String,
    poll_interval_secs: u64,
    max_poll_attempts: u32,
    store: TokenStore,
}

impl AuthClient {
    pub fn new(config: &Config, store: TokenStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority_url: config.authority_url.clone(),
            client_id: config.client_id.clone(),
            scope: config.scope.clone(),
            login_scope: config.login_scope(),
            poll_interval_secs: config.poll_interval_secs,
            max_poll_attempts: config.max_poll_attempts,
            store,
        }
    }

    /// Exchange a refresh token for a new credential pair.
    ///
    /// The rotated pair is persisted before returning; the old refresh token
    /// is invalid the moment the provider answers.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        info!("Refreshing access token...");

        let response = self
            .client
            .post(format!("{}/token", self.authority_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(OdriveError::Auth(format!(
                "Token refresh failed: {}",
                error
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| OdriveError::Auth(format!("Failed to parse token response: {}", e)))?;

        let pair = TokenPair {
            access_token: token_response.access_token,
            // Keep the old refresh token if the provider did not rotate it
            refresh_token: token_response
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
        };

        self.store.save(&pair)?;
        Ok(pair)
    }

    /// Run the device-code login flow.
    ///
    /// Initiates a device-code session, shows the verification URL and user
    /// code, then polls the token endpoint until the user completes the flow,
    /// the provider reports a terminal error, or the attempt bound is hit.
    pub async fn device_login(&self) -> Result<TokenPair> {
        let response = self
            .client
            .post(format!("{}/devicecode", self.authority_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.login_scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(OdriveError::Auth(format!(
                "Device code request failed: {}",
                error
            )));
        }

        let device: DeviceCodeResponse = response
            .json()
            .await
            .map_err(|e| OdriveError::Auth(format!("Failed to parse device code response: {}", e)))?;

        println!(
            "\nGo to {} and enter the code: {}\n",
            device.verification_uri, device.user_code
        );

        // Best effort; the URL is already printed
        if open::that(&device.verification_uri).is_err() {
            debug!("Could not open browser automatically");
        }

        let interval = device.interval.unwrap_or(self.poll_interval_secs);
        self.poll_for_token(&device.device_code, interval).await
    }

    /// Poll the token endpoint until the user completes authorization
    async fn poll_for_token(&self, device_code: &str, interval_secs: u64) -> Result<TokenPair> {
        for attempt in 1..=self.max_poll_attempts {
            sleep(Duration::from_secs(interval_secs)).await;

            let response = self
                .client
                .post(format!("{}/token", self.authority_url))
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("grant_type", "urn:ietf:params:oauth:grant-type:device_code"),
                    ("device_code", device_code),
                ])
                .send()
                .await?;

            if response.status().is_success() {
                let token_response: TokenResponse = response.json().await.map_err(|e| {
                    OdriveError::Auth(format!("Failed to parse token response: {}", e))
                })?;

                let refresh_token = token_response.refresh_token.ok_or_else(|| {
                    OdriveError::Auth("Provider returned no refresh token".to_string())
                })?;

                let pair = TokenPair {
                    access_token: token_response.access_token,
                    refresh_token,
                };
                self.store.save(&pair)?;
                info!("Login successful");
                return Ok(pair);
            }

            let body = response.text().await.unwrap_or_default();
            if !is_authorization_pending(&body) {
                return Err(OdriveError::Auth(format!("Login failed: {}", body)));
            }
            debug!("Authorization pending (attempt {})", attempt);
        }

        Err(OdriveError::Auth(format!(
            "Login not completed after {} attempts; run --login again",
            self.max_poll_attempts
        )))
    }
}

/// Check whether a token endpoint error body is the non-terminal
/// `authorization_pending` case
fn is_authorization_pending(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
        .map(|e| e == "authorization_pending")
        .unwrap_or(false)
}
