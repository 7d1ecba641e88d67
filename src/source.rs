use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use crate::error::{LineError, SourceError};

/// Default line limit, matching the usual 4 KiB reader buffer.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
}

impl Compression {
    /// Classifies a file by its name alone; the content is never sniffed.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => Compression::Gzip,
            _ => Compression::Plain,
        }
    }
}

/// A log file selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub compression: Compression,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let compression = Compression::from_path(&path);
        LogFile { path, compression }
    }
}

enum Record {
    Line(Vec<u8>),
    TooLong(usize),
}

/// Newline-delimited records read from a log file, decompressed on the fly.
///
/// Yields `Ok(line)` per record without its line terminator,
/// `Err(LineError::TooLong)` for records over the limit (reading continues),
/// and a single `Err(LineError::Unreadable)` when the stream fails, after
/// which the iterator is exhausted.
pub struct LineSource {
    reader: Box<dyn BufRead + Send>,
    max_line_length: usize,
    line_number: usize,
    finished: bool,
}

impl LineSource {
    pub fn open(file: &LogFile, max_line_length: usize) -> Result<Self, SourceError> {
        let handle = File::open(&file.path).map_err(|source| SourceError {
            path: file.path.clone(),
            source,
        })?;

        let reader: Box<dyn BufRead + Send> = match file.compression {
            Compression::Plain => Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, handle)),
            Compression::Gzip => Box::new(BufReader::with_capacity(
                READ_BUFFER_SIZE,
                MultiGzDecoder::new(handle),
            )),
        };

        Ok(Self::from_reader(reader, max_line_length))
    }

    pub fn from_reader(reader: Box<dyn BufRead + Send>, max_line_length: usize) -> Self {
        LineSource {
            reader,
            max_line_length,
            line_number: 0,
            finished: false,
        }
    }

    /// Number of records (including skipped ones) handed out so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn read_record(&mut self) -> io::Result<Option<Record>> {
        // One spare byte so a `\r` before the newline does not count against the limit.
        let limit = self.max_line_length;
        let buffered_limit = limit.saturating_add(1);
        let mut line = Vec::new();
        let mut length = 0usize;
        let mut overflowed = false;
        let mut started = false;

        loop {
            let (consumed, terminated) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buf.is_empty() {
                    if !started {
                        return Ok(None);
                    }
                    break;
                }
                started = true;

                let (chunk, consumed, terminated) = match buf.iter().position(|&b| b == b'\n') {
                    Some(idx) => (&buf[..idx], idx + 1, true),
                    None => (buf, buf.len(), false),
                };

                length += chunk.len();
                if !overflowed {
                    if length > buffered_limit {
                        overflowed = true;
                        line = Vec::new();
                    } else {
                        line.extend_from_slice(chunk);
                    }
                }
                (consumed, terminated)
            };

            self.reader.consume(consumed);
            if terminated {
                break;
            }
        }

        if overflowed {
            return Ok(Some(Record::TooLong(length)));
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.len() > limit {
            return Ok(Some(Record::TooLong(line.len())));
        }
        Ok(Some(Record::Line(line)))
    }
}

impl Iterator for LineSource {
    type Item = Result<Vec<u8>, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(None) => {
                self.finished = true;
                None
            }
            Ok(Some(Record::Line(line))) => {
                self.line_number += 1;
                Some(Ok(line))
            }
            Ok(Some(Record::TooLong(length))) => {
                self.line_number += 1;
                Some(Err(LineError::TooLong {
                    line_number: self.line_number,
                    length,
                    limit: self.max_line_length,
                }))
            }
            Err(source) => {
                self.finished = true;
                Some(Err(LineError::Unreadable {
                    line_number: self.line_number,
                    source,
                }))
            }
        }
    }
}

impl FusedIterator for LineSource {}
