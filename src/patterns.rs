use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::time::Instant;
use tracing::info;

/// Edge hostnames handed out by the video CDN, e.g. `r4---sn-abcxyz.googlevideo.com`.
pub const DEFAULT_EDGE_PATTERN: &str = r"r[0-9]+---sn-[A-Za-z0-9-]+\.googlevideo\.com";

/// Pulls edge hostnames out of raw log lines.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
}

impl PatternExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let start_time = Instant::now();
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid edge hostname pattern: {}", pattern))?;

        info!(
            action = "compile",
            component = "pattern_extractor",
            pattern = pattern,
            duration_ms = start_time.elapsed().as_millis(),
            "Compiled edge hostname pattern"
        );
        Ok(PatternExtractor { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Every non-overlapping match in `line`, left to right.
    pub fn extract(&self, line: &[u8]) -> Vec<String> {
        self.regex
            .find_iter(line)
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        PatternExtractor {
            regex: Regex::new(DEFAULT_EDGE_PATTERN).expect("default edge pattern compiles"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_occurrence_yields_nothing() {
        let extractor = PatternExtractor::default();
        assert!(extractor.extract(b"no match here").is_empty());
        assert!(extractor.extract(b"").is_empty());
        assert!(extractor
            .extract(b"query[A] www.googlevideo.com from 10.0.0.2")
            .is_empty());
    }

    #[test]
    fn finds_single_hostname_inside_log_line() {
        let extractor = PatternExtractor::default();
        let line = b"Jan 12 10:00:01 dnsmasq[611]: query[A] r4---sn-abcxyz.googlevideo.com from 192.168.1.20";
        assert_eq!(
            extractor.extract(line),
            vec!["r4---sn-abcxyz.googlevideo.com".to_string()]
        );
    }

    #[test]
    fn finds_every_occurrence_left_to_right() {
        let extractor = PatternExtractor::default();
        let line = b"r1---sn-foo.googlevideo.com r2---sn-bar.googlevideo.com r13---sn-5hne6nzk.googlevideo.com";
        assert_eq!(
            extractor.extract(line),
            vec![
                "r1---sn-foo.googlevideo.com".to_string(),
                "r2---sn-bar.googlevideo.com".to_string(),
                "r13---sn-5hne6nzk.googlevideo.com".to_string(),
            ]
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        let extractor = PatternExtractor::default();
        assert!(extractor.extract(b"R4---SN-ABC.GOOGLEVIDEO.COM").is_empty());
    }

    #[test]
    fn tolerates_invalid_utf8_around_matches() {
        let extractor = PatternExtractor::default();
        let mut line = vec![0xff, 0xfe, b' '];
        line.extend_from_slice(b"r7---sn-q4fl6n6s.googlevideo.com");
        line.push(0xc3);
        assert_eq!(
            extractor.extract(&line),
            vec!["r7---sn-q4fl6n6s.googlevideo.com".to_string()]
        );
    }

    #[test]
    fn custom_pattern_replaces_default_grammar() {
        let extractor = PatternExtractor::new(r"r[0-9]---sn-(.*?)\.googlevideo\.com").unwrap();
        assert_eq!(
            extractor.extract(b"r5---sn-a_b.googlevideo.com"),
            vec!["r5---sn-a_b.googlevideo.com".to_string()]
        );
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = PatternExtractor::new("r[0-9").unwrap_err();
        assert!(err.to_string().contains("Invalid edge hostname pattern"));
    }
}
