use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success { title: String, message: String },
    Failure { title: String, message: String },
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Notification {
        Notification::Success {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Notification {
        Notification::Failure {
            title: title.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("Could not deliver notification: {0}")]
pub struct NotifyError(pub String);

/// Where user-visible feedback goes.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Delivery failures are logged and swallowed.
pub fn notify_best_effort(notifier: &dyn Notifier, notification: Notification) {
    if let Err(err) = notifier.notify(notification) {
        warn!("{err}");
    }
}

/// Writes notifications to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::Success { title, message } => info!("{title}: {message}"),
            Notification::Failure { title, message } => error!("{title}: {message}"),
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod recording {
    use std::sync::Mutex;

    use super::{Notification, Notifier, NotifyError};

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub fail: bool,
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn failing() -> RecordingNotifier {
            RecordingNotifier {
                fail: true,
                ..Default::default()
            }
        }

        pub fn seen(&self) -> Vec<Notification> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
            self.seen.lock().unwrap().push(notification);
            if self.fail {
                Err(NotifyError("display unavailable".to_string()))
            } else {
                Ok(())
            }
        }
    }
}
