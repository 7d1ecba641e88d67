pub mod args;
pub mod blocklist;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod patterns;
pub mod prompt;
pub mod registry;
pub mod run;
pub mod scanner;
pub mod source;
pub mod stats;
pub mod utils;

pub use args::Args;
pub use coordinator::{discover_log_files, scan, ScanCoordinator, ScanOptions, WorkerLimit};
pub use error::{FileFailure, LineError, SourceError};
pub use patterns::{PatternExtractor, DEFAULT_EDGE_PATTERN};
pub use registry::DomainRegistry;
pub use scanner::FileScanner;
pub use source::{Compression, LineSource, LogFile};
pub use stats::{FileOutcome, ScanResult};
