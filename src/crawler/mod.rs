//! Crawler module for link extraction over many pages
//!
//! This module contains the extraction pipeline, including:
//! - Bounded-concurrency scheduling with per-task failure isolation
//! - Per-page fetch and link extraction
//! - Escalation of failed or empty pages to the browser strategy
//! - Progress reporting

mod coordinator;
mod scheduler;

pub use coordinator::{escalation_concurrency, screenshot_file_name, Orchestrator};
pub use scheduler::Scheduler;

use crate::extract::ExtractedLink;
use crate::fetch::FetchStrategy;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Progress callback invoked as `(completed, total, url)` after each page
///
/// Called from concurrently completing tasks.
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Status of a single page extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    Success,
    Error,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extraction result for one page
#[derive(Debug, Clone)]
pub struct PageLinks {
    pub url: String,
    pub status: PageStatus,
    pub total_links: usize,
    pub links: Vec<ExtractedLink>,
    /// Failure description when `status` is `Error`
    pub message: Option<String>,
    /// Strategy of the fetch that produced this result
    pub strategy: FetchStrategy,
    pub screenshot_path: Option<PathBuf>,
}

impl PageLinks {
    pub fn success(url: &str, strategy: FetchStrategy, links: Vec<ExtractedLink>) -> Self {
        Self {
            url: url.to_string(),
            status: PageStatus::Success,
            total_links: links.len(),
            links,
            message: None,
            strategy,
            screenshot_path: None,
        }
    }

    pub fn error(url: &str, strategy: FetchStrategy, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: PageStatus::Error,
            total_links: 0,
            links: Vec::new(),
            message: Some(message.into()),
            strategy,
            screenshot_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PageStatus::Success
    }

    /// Returns true if this page should be retried with the browser strategy
    pub fn needs_escalation(&self) -> bool {
        self.status == PageStatus::Error || self.total_links == 0
    }
}
