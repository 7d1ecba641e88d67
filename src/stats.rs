use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FileFailure;

/// What one file contributed to a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub matches: usize,
    pub failure: Option<FileFailure>,
}

impl FileOutcome {
    pub fn new(path: PathBuf) -> Self {
        FileOutcome {
            path,
            lines_read: 0,
            lines_skipped: 0,
            matches: 0,
            failure: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug)]
pub struct ScanResult {
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
    pub domain_counts: HashMap<String, u64>,
    pub blocklist: String,
    pub files: Vec<FileOutcome>,
}

impl ScanResult {
    pub fn domain_count(&self) -> usize {
        self.domain_counts.len()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.domain_counts.values().sum()
    }

    pub fn failures(&self) -> Vec<&FileFailure> {
        self.files.iter().filter_map(|f| f.failure.as_ref()).collect()
    }

    /// Distinct domains, sorted for stable output.
    pub fn sorted_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.domain_counts.keys().cloned().collect();
        domains.sort();
        domains
    }

    /// Domains by descending count, ties broken alphabetically.
    pub fn ranked_domains(&self) -> Vec<(&String, &u64)> {
        let mut ranked: Vec<(&String, &u64)> = self.domain_counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}
