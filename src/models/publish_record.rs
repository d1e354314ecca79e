use super::{types::EpochMillis, Submission};

/// A successfully published submission, as kept in the history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishRecord {
    pub submission: Submission,
    pub remote_url: String,
    pub published_at: EpochMillis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySummary {
    pub total: u64,
    pub today: u64,
    pub last_published_at: Option<EpochMillis>,
}
