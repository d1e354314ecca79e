use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::Display;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    error::SyncError,
    github::{
        AccountIdentity, FileRef, NewRepository, PutContents, RepositoryApi, RepositorySummary,
    },
    models::{types::EpochMillis, Credentials, PublishRecord, RepoRef, Submission},
    notifier::{notify_best_effort, Notification, Notifier},
    repository::{CredentialsRepository, HistoryRepository},
    utils::formatting::{encode_content, format_content, format_path},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PublishAction {
    Created,
    Updated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResult {
    /// The hosted file URL.
    pub url: String,
    pub path: String,
    pub sha: String,
    pub action: PublishAction,
}

/// Writes submissions into the configured GitHub repository.
pub struct Publisher {
    api: Arc<dyn RepositoryApi>,
    credentials: CredentialsRepository,
    history: HistoryRepository,
    notifier: Arc<dyn Notifier>,
    branch: String,
}

impl Publisher {
    pub fn new(
        api: Arc<dyn RepositoryApi>,
        credentials: CredentialsRepository,
        history: HistoryRepository,
        notifier: Arc<dyn Notifier>,
        branch: impl Into<String>,
    ) -> Publisher {
        Publisher {
            api,
            credentials,
            history,
            notifier,
            branch: branch.into(),
        }
    }

    #[tracing::instrument(skip_all)]
    pub async fn test_connection(&self, token: &str) -> Result<AccountIdentity, SyncError> {
        self.api.authenticated_user(token).await.map_err(|err| {
            warn!("Token check failed: {err}");
            SyncError::auth("Invalid GitHub token")
        })
    }

    /// Verifies the token and stores it with the target repository.
    #[tracing::instrument(skip(self, token))]
    pub async fn login(
        &self,
        token: &str,
        target_repository: Option<&str>,
    ) -> Result<Credentials, SyncError> {
        let user = self.test_connection(token).await?;

        let target_repository = target_repository
            .map(str::trim)
            .filter(|repo| !repo.is_empty())
            .unwrap_or(NewRepository::DEFAULT_NAME);

        let credentials = Credentials {
            token: token.to_string(),
            account_id: user.login,
            target_repository: target_repository.to_string(),
        };

        if credentials.repository().is_none() {
            return Err(SyncError::config(format!(
                "Invalid target repository `{target_repository}`"
            )));
        }

        self.credentials.save(&credentials).await?;
        info!("Logged in as {}", credentials.account_id);

        Ok(credentials)
    }

    pub async fn stored_credentials(&self) -> Result<Option<Credentials>, SyncError> {
        Ok(self.credentials.load().await?)
    }

    /// Current digest of the file, or `None` when it is absent or could not be checked.
    pub async fn exists(&self, repo: &RepoRef, path: &str, token: &str) -> Option<FileRef> {
        match self.api.get_contents(repo, path, token).await {
            Ok(file) => Some(file),
            Err(err) if err.status() == Some(404) => None,
            Err(err) => {
                warn!("Could not check whether {path} exists in {repo}: {err}");
                None
            }
        }
    }

    #[tracing::instrument(skip_all, fields(platform = %submission.platform, title = %submission.title))]
    pub async fn publish(&self, submission: &Submission) -> Result<PublishResult, SyncError> {
        match self.try_publish(submission).await {
            Ok(result) => {
                info!("{} {}", result.action, result.url);
                notify_best_effort(
                    self.notifier.as_ref(),
                    Notification::success(
                        "Solution synced",
                        format!("{} saved to {}", submission.title, result.path),
                    ),
                );
                Ok(result)
            }
            Err(err) => {
                warn!("Publish failed: {err}");
                notify_best_effort(
                    self.notifier.as_ref(),
                    Notification::failure("Sync failed", err.to_string()),
                );
                Err(err)
            }
        }
    }

    async fn try_publish(&self, submission: &Submission) -> Result<PublishResult, SyncError> {
        let (credentials, repo) = self
            .credentials
            .load()
            .await?
            .filter(|credentials| !credentials.token.trim().is_empty())
            .and_then(|credentials| {
                let repo = credentials.repository()?;
                Some((credentials, repo))
            })
            .ok_or_else(|| {
                SyncError::config("GitHub credentials or repository not configured")
            })?;

        let path = format_path(submission);
        let content = format_content(submission, OffsetDateTime::now_utc());

        let existing = self.exists(&repo, &path, &credentials.token).await;
        let (verb, action) = match existing {
            Some(_) => ("Update", PublishAction::Updated),
            None => ("Add", PublishAction::Created),
        };

        let body = PutContents {
            message: format!("{verb} {}: {}", submission.platform, submission.title),
            content: encode_content(&content),
            branch: self.branch.clone(),
            sha: existing.map(|file| file.sha),
        };

        let response = self
            .api
            .put_contents(&repo, &path, &credentials.token, &body)
            .await
            .map_err(|err| SyncError::Remote {
                status: err.status(),
                message: err.message(),
            })?;

        let record = PublishRecord {
            submission: submission.clone(),
            remote_url: response.content.html_url.clone(),
            published_at: EpochMillis::now(),
        };
        if let Err(err) = self.history.append(&record).await {
            warn!("Published {path} but could not record it in history: {err}");
        }

        Ok(PublishResult {
            url: response.content.html_url,
            path: response.content.path,
            sha: response.content.sha,
            action,
        })
    }

    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, SyncError> {
        let credentials = self.require_token().await?;
        self.api
            .list_repositories(&credentials.token)
            .await
            .map_err(|err| SyncError::Remote {
                status: err.status(),
                message: err.message(),
            })
    }

    pub async fn create_repository(
        &self,
        repository: &NewRepository,
    ) -> Result<RepositorySummary, SyncError> {
        let credentials = self.require_token().await?;
        self.api
            .create_repository(&credentials.token, repository)
            .await
            .map_err(|err| SyncError::Remote {
                status: err.status(),
                message: err.message(),
            })
    }

    async fn require_token(&self) -> Result<Credentials, SyncError> {
        self.credentials
            .load()
            .await?
            .filter(|credentials| !credentials.token.trim().is_empty())
            .ok_or_else(|| SyncError::config("No GitHub token found"))
    }
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;

    use super::Publisher;
    use crate::{
        github::fake::FakeGitHub,
        models::Credentials,
        notifier::recording::RecordingNotifier,
        repository::{test_pool, CredentialsRepository, HistoryRepository},
    };

    pub const TOKEN: &str = "ghp_valid";

    pub struct Harness {
        pub publisher: Publisher,
        pub github: Arc<FakeGitHub>,
        pub credentials: CredentialsRepository,
        pub history: HistoryRepository,
        pub notifier: Arc<RecordingNotifier>,
    }

    pub async fn harness() -> Harness {
        let pool = test_pool().await;
        let github = Arc::new(FakeGitHub::with_token(TOKEN));
        let credentials = CredentialsRepository::new(pool.clone());
        let history = HistoryRepository::new(pool);
        let notifier = Arc::new(RecordingNotifier::default());

        let publisher = Publisher::new(
            github.clone(),
            credentials.clone(),
            history.clone(),
            notifier.clone(),
            "main",
        );

        Harness {
            publisher,
            github,
            credentials,
            history,
            notifier,
        }
    }

    pub async fn logged_in_harness() -> Harness {
        let harness = harness().await;
        harness
            .credentials
            .save(&Credentials {
                token: TOKEN.to_string(),
                account_id: "octocat".to_string(),
                target_repository: "solutions".to_string(),
            })
            .await
            .unwrap();
        harness
    }
}
