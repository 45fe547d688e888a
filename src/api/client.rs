//! GitHub-compatible REST client.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use super::{HostingCredential, HostingOperations, Repository};
use crate::error::ApiError;

/// Public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const PER_PAGE: &str = "100";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

#[derive(Serialize)]
struct CreateRepositoryRequest<'a> {
    name: &'a str,
    private: bool,
}

/// REST client authenticated with a username and personal access token.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    credential: HostingCredential,
}

impl GitHubClient {
    /// Creates a client for `base_url` (no trailing path, e.g. `https://api.github.com`).
    pub fn new(base_url: impl Into<String>, credential: HostingCredential) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = Client::builder()
            .user_agent(concat!("gitnoob/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(self.credential.username(), Some(self.credential.token()))
    }

    /// Maps any status other than `expected` to `UnexpectedStatus`, preferring
    /// the API's `message` field over the raw body.
    async fn expect_status(
        operation: &str,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response, ApiError> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("no response body").to_string()
                } else {
                    body.trim().to_string()
                }
            });
        Err(ApiError::UnexpectedStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::ParseError {
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl HostingOperations for GitHubClient {
    async fn create_repository(&self, name: &str, private: bool) -> Result<Repository, ApiError> {
        debug!(name, private, "creating repository");
        let response = self
            .authed(self.client.post(self.url("/user/repos")))
            .json(&CreateRepositoryRequest { name, private })
            .send()
            .await?;
        let response = Self::expect_status("create repository", response, StatusCode::CREATED).await?;
        let repository: Repository = Self::parse(response).await?;
        info!(name = %repository.name, "repository created");
        Ok(repository)
    }

    async fn delete_repository(&self, name: &str) -> Result<(), ApiError> {
        let path = format!("/repos/{}/{}", self.credential.username(), name);
        debug!(path = %path, "deleting repository");
        let response = self.authed(self.client.delete(self.url(&path))).send().await?;
        Self::expect_status("delete repository", response, StatusCode::NO_CONTENT).await?;
        info!(name, "repository deleted");
        Ok(())
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>, ApiError> {
        let response = self
            .authed(self.client.get(self.url("/user/repos")))
            .query(&[("per_page", PER_PAGE)])
            .send()
            .await?;
        let response = Self::expect_status("list repositories", response, StatusCode::OK).await?;
        let repositories: Vec<Repository> = Self::parse(response).await?;
        debug!(count = repositories.len(), "repositories listed");
        Ok(repositories)
    }

    fn username(&self) -> &str {
        self.credential.username()
    }
}
