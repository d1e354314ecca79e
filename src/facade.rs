use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    actors::{Actor, ActorGone, ActorHandle},
    error::SyncError,
    github::AccountIdentity,
    models::Submission,
    publisher::{PublishResult, Publisher},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum FacadeRequest {
    Submission(Submission),
    TestCredentials,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacadeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    Result(PublishResult),
    User(AccountIdentity),
    Error(String),
}

impl FacadeResponse {
    fn ok(body: ResponseBody) -> FacadeResponse {
        FacadeResponse {
            success: true,
            body,
        }
    }

    pub fn failure(message: impl Into<String>) -> FacadeResponse {
        FacadeResponse {
            success: false,
            body: ResponseBody::Error(message.into()),
        }
    }
}

impl From<SyncError> for FacadeResponse {
    fn from(err: SyncError) -> Self {
        FacadeResponse::failure(err.to_string())
    }
}

/// Single entry point for watchers and the command line.
pub struct SyncFacade {
    publisher: Arc<Publisher>,
}

impl SyncFacade {
    pub fn new(publisher: Arc<Publisher>) -> SyncFacade {
        SyncFacade { publisher }
    }

    async fn test_credentials(&self) -> Result<AccountIdentity, SyncError> {
        let credentials = self
            .publisher
            .stored_credentials()
            .await?
            .filter(|credentials| !credentials.token.trim().is_empty())
            .ok_or_else(|| SyncError::config("No GitHub token found"))?;

        self.publisher.test_connection(&credentials.token).await
    }
}

#[async_trait]
impl Actor for SyncFacade {
    type Message = FacadeRequest;
    type Response = FacadeResponse;

    async fn handle_message(&mut self, message: FacadeRequest) -> FacadeResponse {
        match message {
            FacadeRequest::Submission(submission) => {
                debug!("Publishing {} submission {}", submission.platform, submission.title);
                match self.publisher.publish(&submission).await {
                    Ok(result) => FacadeResponse::ok(ResponseBody::Result(result)),
                    Err(err) => err.into(),
                }
            }

            FacadeRequest::TestCredentials => match self.test_credentials().await {
                Ok(user) => FacadeResponse::ok(ResponseBody::User(user)),
                Err(err) => err.into(),
            },
        }
    }
}

pub type FacadeHandle = ActorHandle<SyncFacade>;

pub fn spawn_facade(publisher: Arc<Publisher>) -> FacadeHandle {
    ActorHandle::spawn(SyncFacade::new(publisher))
}

/// Sends a request and folds a stopped facade into a failure response.
pub async fn request(facade: &FacadeHandle, request: FacadeRequest) -> FacadeResponse {
    match facade.send(request).await {
        Ok(response) => response,
        Err(ActorGone) => {
            warn!("Sync service is not running");
            FacadeResponse::failure("Sync service is not running")
        }
    }
}
