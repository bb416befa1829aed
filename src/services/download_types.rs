use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FailureReason {
    /// Non-retryable status (4xx other than 429, or anything unexpected)
    Http { status: u16, reason: String },
    /// Retryable problems persisted through every attempt
    RetriesExhausted { attempts: u32, last_error: String },
    /// Body arrived but could not be stored
    Write { message: String },
    /// Nothing to derive a filename from
    InvalidUrl { url: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Http { status, reason } => write!(f, "HTTP error {status}: {reason}"),
            FailureReason::RetriesExhausted {
                attempts,
                last_error,
            } => write!(f, "failed after {attempts} attempts ({last_error})"),
            FailureReason::Write { message } => write!(f, "could not write file: {message}"),
            FailureReason::InvalidUrl { url } => write!(f, "invalid audio URL '{url}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DownloadOutcome {
    Downloaded { attempts: u32 },
    AlreadyCached,
    Failed { reason: FailureReason },
}

impl DownloadOutcome {
    /// True when the file is now present on disk.
    pub fn is_available(&self) -> bool {
        !matches!(self, DownloadOutcome::Failed { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadItem {
    pub url: String,
    pub filename: String,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DownloadReport {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub items: Vec<DownloadItem>,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn record(&mut self, item: DownloadItem) {
        match item.outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::AlreadyCached => self.skipped += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(item);
    }
}

/// URL → local filename for every audio file present on disk this run.
#[derive(Debug, Default, Clone)]
pub struct DownloadCache {
    by_url: HashMap<String, String>,
}

impl DownloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only call once the file exists locally.
    pub fn insert(&mut self, url: impl Into<String>, filename: impl Into<String>) {
        self.by_url.insert(url.into(), filename.into());
    }

    pub fn filename(&self, url: &str) -> Option<&str> {
        self.by_url.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }
}
