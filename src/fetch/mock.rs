//! In-memory [`Fetch`] double for unit tests

use crate::fetch::{Fetch, FetchError, FetchOptions, FetchResult, FetchStrategy};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serves fixed bodies per strategy and records every call
///
/// Unknown URLs fail with HTTP 404 (lightweight) or a render error (browser).
#[derive(Default)]
pub struct StaticFetcher {
    lightweight: HashMap<String, String>,
    browser: HashMap<String, String>,
    panics: HashSet<String>,
    calls: Mutex<Vec<(FetchStrategy, String)>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    fail_open: bool,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body returned by the lightweight strategy
    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.lightweight.insert(url.to_string(), body.to_string());
        self
    }

    /// Body returned by the browser strategy
    pub fn rendered(mut self, url: &str, body: &str) -> Self {
        self.browser.insert(url.to_string(), body.to_string());
        self
    }

    /// Makes any fetch of `url` panic
    pub fn panic_on(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    pub fn failing_browser(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// URLs fetched with `strategy`, in call order
    pub fn calls(&self, strategy: FetchStrategy) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == strategy)
            .map(|(_, url)| url.clone())
            .collect()
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str, strategy: FetchStrategy, _options: &FetchOptions) -> FetchResult {
        self.calls.lock().unwrap().push((strategy, url.to_string()));

        if self.panics.contains(url) {
            panic!("simulated fetch panic for {}", url);
        }

        let (pages, missing) = match strategy {
            FetchStrategy::Lightweight => (&self.lightweight, FetchError::HttpStatus(404)),
            FetchStrategy::Browser => (
                &self.browser,
                FetchError::Render("no rendered page".to_string()),
            ),
        };

        match pages.get(url) {
            Some(body) => FetchResult::success(url, strategy, body.clone(), 1),
            None => FetchResult::failure(url, strategy, missing, 1),
        }
    }

    async fn open_session(&self, strategy: FetchStrategy) -> Result<(), FetchError> {
        if strategy == FetchStrategy::Browser {
            if self.fail_open {
                return Err(FetchError::Render("browser unavailable".to_string()));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn close_session(&self, strategy: FetchStrategy) {
        if strategy == FetchStrategy::Browser {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
