//! Reqwest-backed GitHub profile adapter.
//!
//! Resolves the authenticated user's login via `GET /user`. A rejected
//! token yields `Ok(None)` so the caller's fail-open policy, not this
//! adapter, decides what an unresolved username means.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::AccessToken;
use crate::domain::ports::{ProviderProfile, ProviderProfileError};

const DEFAULT_ENDPOINT: &str = "https://api.github.com/user";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "gitghost-backend/0.1";

#[derive(Debug, Deserialize)]
struct ProfileDto {
    login: String,
}

/// GitHub profile adapter for username resolution.
pub struct GithubProfileClient {
    client: Client,
    endpoint: Url,
}

impl GithubProfileClient {
    /// Build a client against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed or
    /// the default endpoint fails to parse.
    pub fn new() -> Result<Self, ProviderProfileError> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT)
            .map_err(|err| ProviderProfileError::lookup(err.to_string()))?;
        Self::with_endpoint(endpoint)
    }

    /// Build a client against an explicit endpoint, for tests and mirrors.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(endpoint: Url) -> Result<Self, ProviderProfileError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| ProviderProfileError::lookup(err.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ProviderProfile for GithubProfileClient {
    async fn username(&self, token: &AccessToken) -> Result<Option<String>, ProviderProfileError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", token.reveal()),
            )
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(|err| ProviderProfileError::lookup(err.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let profile: ProfileDto = response
                    .json()
                    .await
                    .map_err(|err| ProviderProfileError::lookup(err.to_string()))?;
                Ok(Some(profile.login))
            }
            status => Err(ProviderProfileError::lookup(format!(
                "unexpected profile status {status}"
            ))),
        }
    }
}
