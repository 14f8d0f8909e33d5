//! Authenticated request execution
//!
//! Every Graph call goes through [`GraphClient::execute`], which implements
//! the single refresh-and-retry policy: expiry is discovered reactively via
//! 401, the refresh token is exchanged once, and the request is retried
//! exactly once. A second 401 is treated like any other failing status.

use reqwest::StatusCode;
use tracing::info;

use crate::auth::AuthClient;
use crate::config::Config;
use crate::error::{OdriveError, Result};
use crate::token::TokenStore;

pub struct GraphClient {
    client: reqwest::Client,
    store: TokenStore,
    auth: AuthClient,
}

impl GraphClient {
    pub fn new(config: &Config, store: TokenStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth: AuthClient::new(config, store.clone()),
            store,
        }
    }

    /// Execute a bearer-authenticated request built by `build`.
    ///
    /// Fails with `MissingCredentials` before any network traffic when no
    /// tokens are stored. On 401, refreshes once (persisting the rotated
    /// pair) and rebuilds the request with the new access token. Any other
    /// non-success status is returned as `Http` with the raw payload, without
    /// retrying.
    pub async fn execute<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let pair = self.store.load()?;

        let response = build(&self.client)
            .bearer_auth(&pair.access_token)
            .send()
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_result(response).await;
        }

        info!("Access token expired, refreshing...");
        let pair = self.auth.refresh(&pair.refresh_token).await?;

        let response = build(&self.client)
            .bearer_auth(&pair.access_token)
            .send()
            .await?;

        Self::into_result(response).await
    }

    async fn into_result(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(OdriveError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }
}
