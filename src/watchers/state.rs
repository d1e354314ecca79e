use std::time::Duration;

use crate::models::{types::EpochMillis, Submission};

/// Per-watcher bookkeeping. Lives as long as the watcher and is never persisted.
#[derive(Debug, Default)]
pub struct WatcherState {
    is_processing: bool,
    last_processed: Option<Submission>,
    last_timestamp: Option<EpochMillis>,
}

impl WatcherState {
    /// `Idle -> Processing`. Returns false if a submission is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.is_processing {
            false
        } else {
            self.is_processing = true;
            true
        }
    }

    pub fn finish(&mut self) {
        self.is_processing = false;
    }

    pub fn is_processing(&self) -> bool {
        self.is_processing
    }

    /// Extraction timestamps never go backwards, even if the wall clock does.
    pub fn stamp(&mut self, now: EpochMillis) -> EpochMillis {
        let stamp = match self.last_timestamp {
            Some(last) => last.max(now),
            None => now,
        };
        self.last_timestamp = Some(stamp);
        stamp
    }

    pub fn is_new(&self, candidate: &Submission, window: Duration) -> bool {
        match &self.last_processed {
            None => true,
            Some(last) => {
                last.natural_key() != candidate.natural_key()
                    || last.timestamp.distance(candidate.timestamp) > window
            }
        }
    }

    pub fn remember(&mut self, submission: Submission) {
        self.last_processed = Some(submission);
    }
}
