use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

use crate::github::ApiError;

/// What the watched page looks like right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: Url,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with status {status}")]
    Status { url: Url, status: u16 },

    #[error("Page is not available: {0}")]
    Unavailable(String),
}

/// A view of the current page, plus the ability to fetch other documents
/// from the same site.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn current(&self) -> Result<PageSnapshot, PageError>;

    async fn fetch(&self, url: &Url) -> Result<String, PageError>;
}

/// Follows a single URL by reloading it over HTTP on every snapshot.
pub struct HttpPage {
    http: reqwest::Client,
    url: Mutex<Url>,
}

impl HttpPage {
    pub fn new(url: Url, timeout: Duration) -> Result<HttpPage, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent("codesync")
            .timeout(timeout)
            .build()?;

        Ok(HttpPage {
            http,
            url: Mutex::new(url),
        })
    }

    async fn get(&self, url: &Url) -> Result<(Url, String), PageError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PageError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        // Redirects count as navigation.
        let final_url = response.url().clone();
        let html = response.text().await?;
        if html.trim().is_empty() {
            return Err(PageError::Unavailable(format!("{final_url} returned an empty page")));
        }

        Ok((final_url, html))
    }
}

#[async_trait]
impl PageSource for HttpPage {
    async fn current(&self) -> Result<PageSnapshot, PageError> {
        let mut url = self.url.lock().await;
        let (final_url, html) = self.get(&url).await?;
        *url = final_url.clone();

        Ok(PageSnapshot {
            url: final_url,
            html,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<String, PageError> {
        Ok(self.get(url).await?.1)
    }
}

#[cfg(test)]
pub mod scripted {
    use std::{
        collections::{HashMap, VecDeque},
        sync::Mutex,
    };

    use async_trait::async_trait;
    use url::Url;

    use super::{PageError, PageSnapshot, PageSource};

    /// Plays back a fixed sequence of snapshots; the last one repeats forever.
    #[derive(Default)]
    pub struct ScriptedPage {
        snapshots: Mutex<VecDeque<PageSnapshot>>,
        documents: Mutex<HashMap<String, String>>,
        fetched: Mutex<Vec<String>>,
    }

    pub fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot {
            url: Url::parse(url).unwrap(),
            html: html.to_string(),
        }
    }

    impl ScriptedPage {
        pub fn new(snapshots: impl IntoIterator<Item = PageSnapshot>) -> ScriptedPage {
            ScriptedPage {
                snapshots: Mutex::new(snapshots.into_iter().collect()),
                ..Default::default()
            }
        }

        pub fn with_document(self, url: &str, html: &str) -> ScriptedPage {
            self.documents
                .lock()
                .unwrap()
                .insert(url.to_string(), html.to_string());
            self
        }

        pub fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for ScriptedPage {
        async fn current(&self) -> Result<PageSnapshot, PageError> {
            let mut snapshots = self.snapshots.lock().unwrap();
            match snapshots.len() {
                0 => Err(PageError::Unavailable("no snapshots left".to_string())),
                1 => Ok(snapshots[0].clone()),
                _ => Ok(snapshots.pop_front().unwrap()),
            }
        }

        async fn fetch(&self, url: &Url) -> Result<String, PageError> {
            self.fetched.lock().unwrap().push(url.to_string());
            self.documents
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| PageError::Status {
                    url: url.clone(),
                    status: 404,
                })
        }
    }
}
