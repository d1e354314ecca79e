use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

const MAILBOX_SIZE: usize = 32;

#[async_trait]
pub trait Actor: Send + 'static {
    type Message: Send;
    type Response: Send;

    async fn handle_message(&mut self, message: Self::Message) -> Self::Response;
}

/// The actor has stopped and will not answer.
#[derive(Debug, Error)]
#[error("The actor has stopped")]
pub struct ActorGone;

pub struct ActorHandle<T: Actor> {
    message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
}

impl<T: Actor> Clone for ActorHandle<T> {
    fn clone(&self) -> Self {
        ActorHandle {
            message_sender: self.message_sender.clone(),
        }
    }
}

impl<T: Actor> ActorHandle<T> {
    pub fn new(
        message_sender: mpsc::Sender<MessageWrap<T::Message, T::Response>>,
    ) -> ActorHandle<T> {
        ActorHandle { message_sender }
    }

    /// Runs the actor on its own task until every handle is dropped.
    pub fn spawn(mut actor: T) -> ActorHandle<T> {
        let (message_sender, mut message_receiver) = mpsc::channel(MAILBOX_SIZE);

        tokio::spawn(async move {
            while let Some(MessageWrap {
                message,
                respond_to,
            }) = message_receiver.recv().await
            {
                let response = actor.handle_message(message).await;
                if respond_to.send(response).is_err() {
                    debug!("Caller went away before the response was ready");
                }
            }
        });

        ActorHandle::new(message_sender)
    }

    pub async fn send(&self, message: T::Message) -> Result<T::Response, ActorGone> {
        let (response_sender, response_receiver) = oneshot::channel();

        self.message_sender
            .send(MessageWrap {
                message,
                respond_to: response_sender,
            })
            .await
            .map_err(|_| ActorGone)?;

        response_receiver.await.map_err(|_| ActorGone)
    }
}

pub struct MessageWrap<M: Send, R: Send> {
    pub message: M,
    pub respond_to: oneshot::Sender<R>,
}
