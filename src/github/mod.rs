mod client;
mod types;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RepoRef;

pub use client::GitHubClient;
pub use types::{
    AccountIdentity, FileRef, NewRepository, PutContents, PutContentsResponse,
    RepositorySummary,
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered with a non-2xx status.
    #[error("{status} - {message}")]
    Status { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Http(err) => err.to_string(),
        }
    }
}

/// The slice of the GitHub REST API the publisher needs.
#[async_trait]
pub trait RepositoryApi: Send + Sync {
    /// `GET /user`
    async fn authenticated_user(&self, token: &str) -> Result<AccountIdentity, ApiError>;

    /// `GET /repos/{owner}/{repo}/contents/{path}`
    async fn get_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
    ) -> Result<FileRef, ApiError>;

    /// `PUT /repos/{owner}/{repo}/contents/{path}`
    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
        body: &PutContents,
    ) -> Result<PutContentsResponse, ApiError>;

    /// `GET /user/repos`
    async fn list_repositories(&self, token: &str) -> Result<Vec<RepositorySummary>, ApiError>;

    /// `POST /user/repos`
    async fn create_repository(
        &self,
        token: &str,
        repository: &NewRepository,
    ) -> Result<RepositorySummary, ApiError>;
}
