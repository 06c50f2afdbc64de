//! Bounded-concurrency scheduling of per-page tasks
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Isolating each task so a panic only fails its own page
//! - Progress reporting as tasks complete

use crate::crawler::{PageLinks, ProgressCallback};
use crate::fetch::FetchStrategy;
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Runs one task per URL with at most `concurrency` in flight
pub struct Scheduler {
    concurrency: usize,
    progress: Option<ProgressCallback>,
}

impl Scheduler {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `task` for every distinct URL and returns the results in input order
    ///
    /// Duplicate URLs are processed once. Completion order is unspecified. A
    /// task that panics yields an error result for its URL and never affects
    /// other tasks; there is no batch-wide cancellation.
    pub async fn run<F, Fut>(&self, urls: &[String], strategy: FetchStrategy, task: F) -> Vec<PageLinks>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = PageLinks> + Send + 'static,
    {
        let urls = dedup_urls(urls);
        let total = urls.len();
        if total == 0 {
            return Vec::new();
        }

        debug!(
            "Scheduling {} {} tasks with concurrency {}",
            total, strategy, self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let completed = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for url in &urls {
            let job = task(url.clone());
            let url = url.clone();
            let semaphore = semaphore.clone();
            let completed = completed.clone();
            let progress = self.progress.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;

                let result = match AssertUnwindSafe(job).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => {
                        error!("Extraction task for {} panicked", url);
                        PageLinks::error(&url, strategy, "Error: extraction task panicked")
                    }
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(progress) = &progress {
                    progress(done, total, &url);
                }

                (url, result)
            });
        }

        // Keys are disjoint: inputs were deduplicated and every task reports
        // only its own URL, so no insert ever overwrites another task's result.
        let mut results: HashMap<String, PageLinks> = HashMap::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((url, result)) => {
                    results.insert(url, result);
                }
                Err(e) => error!("Extraction task failed to complete: {}", e),
            }
        }

        urls.into_iter()
            .map(|url| {
                results.remove(&url).unwrap_or_else(|| {
                    PageLinks::error(&url, strategy, "Error: extraction task did not complete")
                })
            })
            .collect()
    }
}

/// Removes duplicate URLs, keeping the first occurrence
fn dedup_urls(urls: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}
