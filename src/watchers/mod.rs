mod codeforces;
mod leetcode;
mod page;
mod state;
mod strategy;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    select,
    time::{interval_at, sleep, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    facade::{request, FacadeHandle, FacadeRequest, ResponseBody},
    models::{types::EpochMillis, Platform, Submission},
    notifier::{notify_best_effort, Notification, Notifier},
};

pub use codeforces::Codeforces;
pub use leetcode::LeetCode;
pub use page::{HttpPage, PageError, PageSnapshot, PageSource};
pub use state::WatcherState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub session_duration: Duration,
    /// Pause between detecting a verdict and reading the page.
    pub settle_delay: Duration,
    pub dedup_window: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    Ignored,
    Monitored,
    SingleSubmission,
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read the page: {0}")]
    Page(#[from] PageError),

    #[error("Invalid problem URL: {0}")]
    ProblemLink(String),
}

/// Everything that differs between judges.
#[async_trait]
pub trait Site: Send + Sync {
    /// What `detect` saw on the page, handed over to `extract`.
    type Detection: Send;

    fn platform(&self) -> Platform;

    fn timing(&self) -> Timing;

    fn classify(&self, url: &Url) -> PageKind;

    fn detect(&self, kind: PageKind, page: &PageSnapshot) -> Option<Self::Detection>;

    async fn extract(
        &self,
        page: &dyn PageSource,
        detection: Self::Detection,
        timestamp: EpochMillis,
    ) -> Result<Submission, ExtractionError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Published; carries the hosted file URL.
    Synced(String),
    Failed(String),
    Duplicate,
    Busy,
    ExtractionFailed(String),
    NoVerdict,
    Navigated,
    Ignored,
}

pub struct Watcher<S: Site> {
    site: S,
    page: Arc<dyn PageSource>,
    facade: FacadeHandle,
    notifier: Arc<dyn Notifier>,
    state: Mutex<WatcherState>,
}

impl<S: Site> Watcher<S> {
    pub fn new(
        site: S,
        page: Arc<dyn PageSource>,
        facade: FacadeHandle,
        notifier: Arc<dyn Notifier>,
    ) -> Watcher<S> {
        Watcher {
            site,
            page,
            facade,
            notifier,
            state: Mutex::new(WatcherState::default()),
        }
    }

    /// Watches the page forever, starting over every time it navigates.
    #[tracing::instrument(skip_all, fields(platform = %self.site.platform()))]
    pub async fn run(&self) {
        loop {
            let watched_url = match self.page.current().await {
                Ok(snapshot) => {
                    let url = snapshot.url.clone();
                    let outcome = self.watch_snapshot(snapshot).await;
                    info!("{url}: {outcome:?}");
                    if outcome == WatchOutcome::Navigated {
                        continue;
                    }
                    Some(url)
                }
                Err(err) => {
                    warn!("Could not read the page: {err}");
                    None
                }
            };

            self.wait_for_navigation(watched_url).await;
        }
    }

    /// Handles whatever the page currently shows and reports what happened.
    pub async fn watch_current_page(&self) -> Result<WatchOutcome, PageError> {
        let snapshot = self.page.current().await?;
        Ok(self.watch_snapshot(snapshot).await)
    }

    async fn watch_snapshot(&self, snapshot: PageSnapshot) -> WatchOutcome {
        match self.site.classify(&snapshot.url) {
            PageKind::Ignored => WatchOutcome::Ignored,

            PageKind::SingleSubmission => {
                match self.site.detect(PageKind::SingleSubmission, &snapshot) {
                    Some(detection) => self.handle_accepted(detection).await,
                    None => WatchOutcome::NoVerdict,
                }
            }

            PageKind::Monitored => {
                debug!("Watching {} for an accepted verdict", snapshot.url);
                self.watch_session(&snapshot.url).await
            }
        }
    }

    /// Polls a monitored page until a verdict shows up, the page navigates
    /// away, or the session runs out.
    async fn watch_session(&self, url: &Url) -> WatchOutcome {
        let timing = self.site.timing();
        let deadline = Instant::now() + timing.session_duration;

        let mut ticks = interval_at(Instant::now() + timing.poll_interval, timing.poll_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                _ = sleep_until(deadline) => return WatchOutcome::NoVerdict,
                _ = ticks.tick() => {}
            }

            let snapshot = match self.page.current().await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!("Could not read the page: {err}");
                    continue;
                }
            };

            if &snapshot.url != url {
                return WatchOutcome::Navigated;
            }

            if self.is_busy() {
                continue;
            }

            if let Some(detection) = self.site.detect(PageKind::Monitored, &snapshot) {
                info!("Accepted verdict detected");
                return self.handle_accepted(detection).await;
            }
        }
    }

    async fn wait_for_navigation(&self, from: Option<Url>) {
        let poll_interval = self.site.timing().poll_interval;

        loop {
            sleep(poll_interval).await;
            match self.page.current().await {
                Ok(snapshot) if Some(&snapshot.url) != from.as_ref() => return,
                Ok(_) => {}
                Err(err) => debug!("Page still unavailable: {err}"),
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.with_state(|state| state.is_processing())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut WatcherState) -> T) -> T {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    /// `Idle -> Processing -> Idle`. A detection arriving while processing is dropped.
    pub async fn handle_accepted(&self, detection: S::Detection) -> WatchOutcome {
        if !self.with_state(WatcherState::try_begin) {
            debug!("Already processing a submission, ignoring detection");
            return WatchOutcome::Busy;
        }

        let outcome = self.process(detection).await;
        self.with_state(WatcherState::finish);

        outcome
    }

    async fn process(&self, detection: S::Detection) -> WatchOutcome {
        let timing = self.site.timing();
        if !timing.settle_delay.is_zero() {
            sleep(timing.settle_delay).await;
        }

        let timestamp = self.with_state(|state| state.stamp(EpochMillis::now()));

        let submission = match self
            .site
            .extract(self.page.as_ref(), detection, timestamp)
            .await
        {
            Ok(submission) => submission,
            Err(err) => {
                warn!("Could not extract submission: {err}");
                return WatchOutcome::ExtractionFailed(err.to_string());
            }
        };

        let is_new = self.with_state(|state| {
            if state.is_new(&submission, timing.dedup_window) {
                state.remember(submission.clone());
                true
            } else {
                false
            }
        });
        if !is_new {
            debug!("{} was already synced, skipping", submission.title);
            return WatchOutcome::Duplicate;
        }

        let title = submission.title.clone();
        let response = request(&self.facade, FacadeRequest::Submission(submission)).await;

        match response.body {
            ResponseBody::Result(result) if response.success => {
                notify_best_effort(
                    self.notifier.as_ref(),
                    Notification::success("CodeSync", format!("{title} synced to GitHub")),
                );
                WatchOutcome::Synced(result.url)
            }
            ResponseBody::Error(message) => {
                error!("Sync failed: {message}");
                WatchOutcome::Failed(message)
            }
            other => {
                error!("Unexpected response from sync service: {other:?}");
                WatchOutcome::Failed("Unexpected response".to_string())
            }
        }
    }
}
