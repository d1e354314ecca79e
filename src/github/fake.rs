//! In-process stand-in for the GitHub API.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::models::RepoRef;

use super::{
    types::ContentInfo, AccountIdentity, ApiError, FileRef, NewRepository, PutContents,
    PutContentsResponse, RepositoryApi, RepositorySummary,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub repo: RepoRef,
    pub path: String,
    pub body: PutContents,
}

#[derive(Default)]
struct State {
    valid_tokens: HashSet<String>,
    files: HashMap<String, String>,
    puts: Vec<RecordedPut>,
    probes: Vec<String>,
    put_failure: Option<(u16, String)>,
    probe_failure: Option<u16>,
    repositories: Vec<RepositorySummary>,
}

#[derive(Default)]
pub struct FakeGitHub {
    state: Mutex<State>,
}

impl FakeGitHub {
    pub fn with_token(token: &str) -> FakeGitHub {
        let fake = FakeGitHub::default();
        fake.state
            .lock()
            .unwrap()
            .valid_tokens
            .insert(token.to_string());
        fake
    }

    pub fn add_file(&self, path: &str, sha: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), sha.to_string());
    }

    pub fn fail_puts_with(&self, status: u16, message: &str) {
        self.state.lock().unwrap().put_failure = Some((status, message.to_string()));
    }

    pub fn fail_probes_with(&self, status: u16) {
        self.state.lock().unwrap().probe_failure = Some(status);
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn probes(&self) -> Vec<String> {
        self.state.lock().unwrap().probes.clone()
    }

    fn check_token(state: &State, token: &str) -> Result<(), ApiError> {
        if state.valid_tokens.contains(token) {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: 401,
                message: "Bad credentials".to_string(),
            })
        }
    }
}

pub fn html_url(repo: &RepoRef, branch: &str, path: &str) -> String {
    format!("https://github.com/{repo}/blob/{branch}/{path}")
}

#[async_trait]
impl RepositoryApi for FakeGitHub {
    async fn authenticated_user(&self, token: &str) -> Result<AccountIdentity, ApiError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;

        Ok(AccountIdentity {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            avatar_url: None,
        })
    }

    async fn get_contents(
        &self,
        _repo: &RepoRef,
        path: &str,
        token: &str,
    ) -> Result<FileRef, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.probes.push(path.to_string());
        Self::check_token(&state, token)?;

        if let Some(status) = state.probe_failure {
            return Err(ApiError::Status {
                status,
                message: "Server Error".to_string(),
            });
        }

        match state.files.get(path) {
            Some(sha) => Ok(FileRef { sha: sha.clone() }),
            None => Err(ApiError::Status {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }

    async fn put_contents(
        &self,
        repo: &RepoRef,
        path: &str,
        token: &str,
        body: &PutContents,
    ) -> Result<PutContentsResponse, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;

        state.puts.push(RecordedPut {
            repo: repo.clone(),
            path: path.to_string(),
            body: body.clone(),
        });

        if let Some((status, message)) = state.put_failure.clone() {
            return Err(ApiError::Status { status, message });
        }

        let sha = format!("sha-{}", state.puts.len());
        state.files.insert(path.to_string(), sha.clone());

        Ok(PutContentsResponse {
            content: ContentInfo {
                path: path.to_string(),
                sha,
                html_url: html_url(repo, &body.branch, path),
            },
        })
    }

    async fn list_repositories(&self, token: &str) -> Result<Vec<RepositorySummary>, ApiError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        Ok(state.repositories.clone())
    }

    async fn create_repository(
        &self,
        token: &str,
        repository: &NewRepository,
    ) -> Result<RepositorySummary, ApiError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;

        let summary = RepositorySummary {
            id: state.repositories.len() as u64 + 1,
            name: repository.name.clone(),
            full_name: format!("octocat/{}", repository.name),
            private: repository.private,
            html_url: Some(format!("https://github.com/octocat/{}", repository.name)),
        };
        state.repositories.insert(0, summary.clone());

        Ok(summary)
    }
}
