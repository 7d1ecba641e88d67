use anyhow::{Context, Result};
use chrono::Local;
use rayon::prelude::*;
use std::fmt;
use std::fs::{self, DirEntry};
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn};

use crate::patterns::PatternExtractor;
use crate::registry::DomainRegistry;
use crate::scanner::FileScanner;
use crate::source::{LogFile, DEFAULT_MAX_LINE_LENGTH};
use crate::stats::{FileOutcome, ScanResult};

/// How many files are scanned at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerLimit {
    /// One thread per file of interest.
    #[default]
    PerFile,
    /// One thread per logical CPU.
    Cpus,
    Fixed(NonZeroUsize),
}

impl WorkerLimit {
    /// Thread count for a scan of `file_count` files; always at least one.
    pub fn threads_for(&self, file_count: usize) -> usize {
        let wanted = match self {
            WorkerLimit::PerFile => file_count,
            WorkerLimit::Cpus => num_cpus::get(),
            WorkerLimit::Fixed(n) => n.get(),
        };
        wanted.min(file_count).max(1)
    }
}

impl FromStr for WorkerLimit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-file" | "unbounded" => Ok(WorkerLimit::PerFile),
            "cpus" | "auto" => Ok(WorkerLimit::Cpus),
            other => other
                .parse::<NonZeroUsize>()
                .map(WorkerLimit::Fixed)
                .map_err(|_| {
                    format!(
                        "invalid worker limit '{}': expected 'per-file', 'cpus' or a positive number",
                        s
                    )
                }),
        }
    }
}

impl fmt::Display for WorkerLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerLimit::PerFile => write!(f, "per-file"),
            WorkerLimit::Cpus => write!(f, "cpus"),
            WorkerLimit::Fixed(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub directory: PathBuf,
    pub prefix: String,
    pub max_line_length: usize,
    pub workers: WorkerLimit,
}

impl ScanOptions {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        ScanOptions {
            directory: directory.into(),
            prefix: prefix.into(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            workers: WorkerLimit::default(),
        }
    }
}

/// Lists the files directly inside `directory` whose name starts with `prefix`.
pub fn discover_log_files(directory: &Path, prefix: &str) -> Result<Vec<LogFile>> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("Could not read log directory {:?}", directory))?;

    Ok(select_log_files(entries, directory, prefix))
}

// A broken entry only loses that entry; the rest of the listing is still used.
fn select_log_files<I>(entries: I, directory: &Path, prefix: &str) -> Vec<LogFile>
where
    I: IntoIterator<Item = io::Result<DirEntry>>,
{
    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(action = "discover", component = "scan_coordinator", directory = ?directory, error = %e, "Could not read directory entry");
                continue;
            }
        };
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            warn!(action = "discover", component = "scan_coordinator", file_name = ?entry.file_name(), "Ignoring non UTF-8 file name");
            continue;
        };
        if !name.starts_with(prefix) {
            continue;
        }

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => continue,
            Ok(_) => files.push(LogFile::new(entry.path())),
            Err(e) => {
                warn!(action = "discover", component = "scan_coordinator", file_path = ?entry.path(), error = %e, "Could not stat directory entry");
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Runs a complete scan over one log directory.
pub struct ScanCoordinator {
    options: ScanOptions,
    extractor: PatternExtractor,
}

impl ScanCoordinator {
    pub fn new(options: ScanOptions, extractor: PatternExtractor) -> Self {
        ScanCoordinator { options, extractor }
    }

    pub fn scan(&self) -> Result<ScanResult> {
        let started_at = Local::now();
        let start_time = Instant::now();
        info!(
            action = "start",
            component = "scan_coordinator",
            directory = ?self.options.directory,
            prefix = %self.options.prefix,
            pattern = self.extractor.as_str(),
            "Starting log scan"
        );

        let files = discover_log_files(&self.options.directory, &self.options.prefix)?;
        info!(
            action = "discover",
            component = "scan_coordinator",
            file_count = files.len(),
            "Found files of interest"
        );

        let registry = DomainRegistry::new();
        let outcomes = self.scan_files(&files, &registry)?;

        let domain_counts = registry.domains();
        let blocklist = registry.to_blocklist_string();
        let elapsed = start_time.elapsed();
        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();

        info!(
            action = "complete",
            component = "scan_coordinator",
            unique_domains = domain_counts.len(),
            files_scanned = outcomes.len(),
            files_failed = failed,
            duration_ms = elapsed.as_millis(),
            "Log scan completed"
        );

        Ok(ScanResult {
            started_at,
            elapsed,
            domain_counts,
            blocklist,
            files: outcomes,
        })
    }

    // Returns only after every file has been processed.
    fn scan_files(&self, files: &[LogFile], registry: &DomainRegistry) -> Result<Vec<FileOutcome>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let threads = self.options.workers.threads_for(files.len());
        info!(
            action = "configure",
            component = "scan_coordinator",
            worker_count = threads,
            worker_limit = %self.options.workers,
            "Using workers for processing"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("scan-worker-{}", i))
            .build()
            .context("Failed to build scan worker pool")?;

        let scanner = FileScanner::new(&self.extractor, registry, self.options.max_line_length);
        let outcomes: Vec<FileOutcome> = pool.install(|| {
            files
                .par_iter()
                .with_max_len(1)
                .map(|file| scanner.scan(file))
                .collect()
        });
        Ok(outcomes)
    }
}

/// Scans `directory` for files starting with `prefix` using default settings.
pub fn scan(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<ScanResult> {
    ScanCoordinator::new(ScanOptions::new(directory, prefix), PatternExtractor::default()).scan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_worker_limits() {
        assert_eq!("per-file".parse::<WorkerLimit>(), Ok(WorkerLimit::PerFile));
        assert_eq!("CPUS".parse::<WorkerLimit>(), Ok(WorkerLimit::Cpus));
        assert_eq!(
            "4".parse::<WorkerLimit>(),
            Ok(WorkerLimit::Fixed(NonZeroUsize::new(4).unwrap()))
        );
        assert!("0".parse::<WorkerLimit>().is_err());
        assert!("lots".parse::<WorkerLimit>().is_err());
    }

    #[test]
    fn thread_count_is_bounded_by_file_count() {
        assert_eq!(WorkerLimit::PerFile.threads_for(12), 12);
        assert_eq!(WorkerLimit::PerFile.threads_for(0), 1);
        let two = WorkerLimit::Fixed(NonZeroUsize::new(2).unwrap());
        assert_eq!(two.threads_for(12), 2);
        assert_eq!(two.threads_for(1), 1);
        assert!(WorkerLimit::Cpus.threads_for(3) <= 3);
    }

    #[test]
    fn discovery_filters_by_prefix_and_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pihole.log"), "").unwrap();
        fs::write(dir.path().join("pihole.log.1"), "").unwrap();
        fs::write(dir.path().join("pihole.log.2.gz"), "").unwrap();
        fs::write(dir.path().join("FTL.log"), "").unwrap();
        fs::create_dir(dir.path().join("pihole.log.d")).unwrap();

        let files = discover_log_files(dir.path(), "pihole.log").unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pihole.log", "pihole.log.1", "pihole.log.2.gz"]);
    }

    #[test]
    fn broken_entry_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pihole.log"), "").unwrap();
        fs::write(dir.path().join("pihole.log.1"), "").unwrap();

        let mut entries: Vec<io::Result<DirEntry>> = fs::read_dir(dir.path()).unwrap().collect();
        entries.insert(1, Err(io::Error::new(io::ErrorKind::Other, "entry vanished")));

        let files = select_log_files(entries, dir.path(), "pihole.log");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn unreadable_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(discover_log_files(&missing, "pihole.log").is_err());
        assert!(scan(&missing, "pihole.log").is_err());
    }

    #[test]
    fn empty_directory_yields_empty_result() {
        let dir = TempDir::new().unwrap();
        let result = scan(dir.path(), "pihole.log").unwrap();
        assert_eq!(result.domain_count(), 0);
        assert_eq!(result.blocklist, "");
        assert!(result.files.is_empty());
    }
}
