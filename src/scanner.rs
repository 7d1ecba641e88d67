use std::time::Instant;
use tracing::{info, warn};

use crate::error::{FileFailure, LineError};
use crate::patterns::PatternExtractor;
use crate::registry::DomainRegistry;
use crate::source::{LineSource, LogFile};
use crate::stats::FileOutcome;

/// Feeds one log file through the extractor into the shared registry.
///
/// Errors are confined to the file being scanned: an oversized line is
/// skipped, an unreadable stream ends this file early and is reported in the
/// returned [`FileOutcome`].
pub struct FileScanner<'a> {
    extractor: &'a PatternExtractor,
    registry: &'a DomainRegistry,
    max_line_length: usize,
}

impl<'a> FileScanner<'a> {
    pub fn new(
        extractor: &'a PatternExtractor,
        registry: &'a DomainRegistry,
        max_line_length: usize,
    ) -> Self {
        FileScanner {
            extractor,
            registry,
            max_line_length,
        }
    }

    pub fn scan(&self, file: &LogFile) -> FileOutcome {
        let start_time = Instant::now();
        let mut outcome = FileOutcome::new(file.path.clone());

        let source = match LineSource::open(file, self.max_line_length) {
            Ok(source) => source,
            Err(e) => {
                warn!(action = "open", component = "file_scanner", file_path = ?file.path, error = %e, "Skipped unreadable file");
                outcome.failure = Some(FileFailure::from(e));
                return outcome;
            }
        };

        for record in source {
            match record {
                Ok(line) => {
                    outcome.lines_read += 1;
                    let found = self.extractor.extract(&line);
                    if !found.is_empty() {
                        outcome.matches += found.len();
                        self.registry.insert_many(found);
                    }
                }
                Err(LineError::TooLong { line_number, length, .. }) => {
                    outcome.lines_skipped += 1;
                    warn!(action = "skip_line", component = "file_scanner", file_path = ?file.path, line_number, length, "Skipped line, line is too long");
                }
                Err(e @ LineError::Unreadable { .. }) => {
                    warn!(action = "read", component = "file_scanner", file_path = ?file.path, error = %e, "Stopped reading file");
                    outcome.failure = Some(FileFailure {
                        path: file.path.clone(),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        info!(
            action = "complete",
            component = "file_scanner",
            file_path = ?file.path,
            lines_read = outcome.lines_read,
            lines_skipped = outcome.lines_skipped,
            matches = outcome.matches,
            failed = !outcome.succeeded(),
            duration_ms = start_time.elapsed().as_millis(),
            "Finished processing file"
        );
        outcome
    }
}
