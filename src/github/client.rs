use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Method, RequestBuilder,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::RepoRef;

use super::{
    AccountIdentity, ApiError, FileRef, NewRepository, PutContents, PutContentsResponse,
    RepositoryApi, RepositorySummary,
};

const USER_AGENT: &str = "codesync";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// GitHub REST client. Every request carries the token, a fixed user agent
/// and a timeout.
#[derive(Clone, Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<GitHubClient, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(GitHubClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, format!("token {token}"))
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

fn contents_path(repo: &RepoRef, path: &str) -> String {
    format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path)
}

/// GitHub error bodies look like `{"message": "...", "documentation_url": "..."}`.
fn error_message(body: &str, reason: Option<&str>) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string));

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => reason.unwrap_or("Unknown error").to_string(),
    }
}

#[async_trait]
impl RepositoryApi for GitHubClient {
    #[tracing::instrument(skip_all)]
    async fn authenticated_user(&self, token: &str) -> Result<AccountIdentity, ApiError> {
        Self::send(self.request(Method::GET, "/user", token)).await
    }

    #[tracing::instrument(skip(self, token), fields(repo = %repo))]
    async fn get_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
    ) -> Result<FileRef, ApiError> {
        Self::send(self.request(Method::GET, &contents_path(repo, path), token)).await
    }

    #[tracing::instrument(skip(self, token, body), fields(repo = %repo, update = body.sha.is_some()))]
    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
        body: &PutContents,
    ) -> Result<PutContentsResponse, ApiError> {
        debug!("Writing {} bytes of base64 content", body.content.len());
        Self::send(
            self.request(Method::PUT, &contents_path(repo, path), token)
                .json(body),
        )
        .await
    }

    #[tracing::instrument(skip_all)]
    async fn list_repositories(&self, token: &str) -> Result<Vec<RepositorySummary>, ApiError> {
        Self::send(
            self.request(Method::GET, "/user/repos", token)
                .query(&[("sort", "updated"), ("per_page", "50")]),
        )
        .await
    }

    #[tracing::instrument(skip(self, token))]
    async fn create_repository(
        &self,
        token: &str,
        repository: &NewRepository,
    ) -> Result<RepositorySummary, ApiError> {
        Self::send(self.request(Method::POST, "/user/repos", token).json(repository)).await
    }
}
