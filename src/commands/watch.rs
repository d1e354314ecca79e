use std::sync::Arc;

use tracing::info;
use url::Url;

use crate::{
    commands::{internal_err, user_err, CommandResult},
    models::Platform,
    watchers::{Codeforces, HttpPage, LeetCode, PageSource, Site, WatchOutcome, Watcher},
    AppState,
};

pub async fn watch(state: &AppState, site: Platform, url: Url, follow: bool) -> CommandResult {
    let page: Arc<dyn PageSource> = Arc::new(
        HttpPage::new(url, state.http_timeout)
            .map_err(|err| internal_err(format!("Could not create HTTP client: {err}")))?,
    );

    match site {
        Platform::LeetCode => watch_with(state, LeetCode::default(), page, follow).await,
        Platform::Codeforces => watch_with(state, Codeforces::default(), page, follow).await,
    }
}

async fn watch_with<S: Site>(
    state: &AppState,
    site: S,
    page: Arc<dyn PageSource>,
    follow: bool,
) -> CommandResult {
    let watcher = Watcher::new(site, page, state.facade.clone(), state.notifier.clone());

    if follow {
        info!("Watching until interrupted");
        watcher.run().await;
        return Ok("Stopped watching".to_string());
    }

    let outcome = watcher
        .watch_current_page()
        .await
        .map_err(|err| user_err(format!("Could not load the page: {err}")))?;

    describe(outcome)
}

fn describe(outcome: WatchOutcome) -> CommandResult {
    match outcome {
        WatchOutcome::Synced(url) => Ok(format!("Synced to {url}")),
        WatchOutcome::Failed(message) => Err(user_err(message)),
        WatchOutcome::Duplicate => Ok("Already synced a moment ago".to_string()),
        WatchOutcome::Busy => Ok("Another submission is still being synced".to_string()),
        WatchOutcome::ExtractionFailed(message) => {
            Err(user_err(format!("Could not read the submission: {message}")))
        }
        WatchOutcome::NoVerdict => Ok("No accepted verdict showed up".to_string()),
        WatchOutcome::Navigated => Ok("The page changed before a verdict showed up".to_string()),
        WatchOutcome::Ignored => Ok("Nothing to watch on this page".to_string()),
    }
}
