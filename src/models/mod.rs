mod credentials;
mod publish_record;
mod submission;

pub mod types;

pub use credentials::{Credentials, RepoRef};
pub use publish_record::{HistorySummary, PublishRecord};
pub use submission::{Difficulty, Platform, Submission};
