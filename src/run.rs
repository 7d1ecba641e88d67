use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::blocklist::BlocklistSink;
use crate::config::Config;
use crate::coordinator::{ScanCoordinator, ScanOptions};
use crate::patterns::PatternExtractor;
use crate::stats::ScanResult;
use crate::utils::{format_number, redact_domain};
use crate::Args;

/// Merges command line overrides into the loaded config and runs the scan.
pub fn scan_logs(config: &Config, args: &Args) -> Result<ScanResult> {
    let pattern = args.pattern.as_deref().unwrap_or_else(|| config.edge_pattern());
    let extractor = PatternExtractor::new(pattern)?;

    let directory = args
        .logs_dir
        .clone()
        .unwrap_or_else(|| config.logs_directory.clone());
    let workers = match args.workers {
        Some(workers) => workers,
        None => config.worker_limit()?,
    };

    let options = ScanOptions {
        directory,
        prefix: config.log_file_prefix.clone(),
        max_line_length: config.max_line_length(),
        workers,
    };

    ScanCoordinator::new(options, extractor).scan()
}

pub fn output_path(config: &Config, args: &Args) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_file))
}

/// Writes one domain per line, sorted.
pub fn write_domains(result: &ScanResult, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Could not write output to file {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for domain in result.sorted_domains() {
        writeln!(writer, "{}", domain)
            .with_context(|| format!("Could not write domain {} to file {:?}", domain, path))?;
    }
    writer.flush()?;

    info!(action = "write", component = "output", file_path = ?path, domain_count = result.domain_count(), "Wrote extracted domains");
    Ok(())
}

/// Decides whether to submit, asking on stdin when the config wants a confirmation.
pub fn should_submit(config: &Config, args: &Args, domain_count: usize) -> Result<bool> {
    if args.dry_run || domain_count == 0 {
        return Ok(false);
    }
    if args.yes || !config.confirm {
        return Ok(true);
    }
    let stdin = io::stdin();
    crate::prompt::confirm(stdin.lock(), io::stdout(), domain_count)
}

pub fn submit_domains(result: &ScanResult, sink: &dyn BlocklistSink) -> Result<()> {
    info!(action = "submit", component = "blocklist", domain_count = result.domain_count(), "Adding domains to the blocklist");
    let output = sink
        .submit(&result.sorted_domains())
        .context("Could not send domains to the blocklist command")?;
    println!("{}", output.trim_end());
    Ok(())
}

pub fn print_scan_results(result: &ScanResult, output: &Path, args: &Args) {
    println!("\n--- Log Scan ---");
    println!("Started: {}", result.started_at.format("%B %-d, %Y %H:%M:%S"));
    println!(
        "Files scanned: {} ({} failed)",
        format_number(result.files.len() as u64),
        format_number(result.failures().len() as u64)
    );
    for failure in result.failures() {
        warn!(action = "report", component = "scan_summary", file_path = ?failure.path, reason = %failure.reason, "File skipped");
        println!("- skipped {}: {}", failure.path.display(), failure.reason);
    }
    println!(
        "Unique domains: {} ({} occurrences)",
        format_number(result.domain_count() as u64),
        format_number(result.total_occurrences())
    );
    println!(
        "Written to {} in {:.1}ms",
        output.display(),
        result.elapsed.as_secs_f64() * 1000.0
    );

    if let Some(top) = args.top {
        let ranked = result.ranked_domains();
        println!("\nTop {} most seen domains:", top.min(ranked.len()));
        for (domain, count) in ranked.iter().take(top) {
            let display_domain = if args.redact {
                redact_domain(domain)
            } else {
                domain.to_string()
            };
            println!("- {}: {} hits", display_domain, format_number(**count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::WorkerLimit;
    use clap::Parser;
    use std::cell::RefCell;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::TempDir;

    struct RecordingSink {
        received: RefCell<Vec<Vec<String>>>,
    }

    impl BlocklistSink for RecordingSink {
        fn submit(&self, domains: &[String]) -> Result<String> {
            self.received.borrow_mut().push(domains.to_vec());
            Ok(format!("[i] Adding {} domain(s)", domains.len()))
        }
    }

    fn config_for(dir: &Path) -> Config {
        Config {
            logs_directory: dir.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn cli_overrides_take_precedence() {
        let logs = TempDir::new().unwrap();
        fs::write(
            logs.path().join("pihole.log"),
            "r1---sn-x.googlevideo.com\nr9---sn-y.googlevideo.com\n",
        )
        .unwrap();

        let config = Config {
            logs_directory: PathBuf::from("/definitely/missing"),
            workers: Some("2".to_string()),
            ..Config::default()
        };
        let args = Args::parse_from([
            "edgeblock",
            "--logs-dir",
            logs.path().to_str().unwrap(),
            "--pattern",
            r"r1---sn-[a-z]+\.googlevideo\.com",
            "--workers",
            "1",
        ]);

        let result = scan_logs(&config, &args).unwrap();
        assert_eq!(result.sorted_domains(), vec!["r1---sn-x.googlevideo.com"]);
        assert_eq!(args.workers, Some(WorkerLimit::Fixed(NonZeroUsize::new(1).unwrap())));
    }

    #[test]
    fn writes_sorted_domains_and_submits_them() {
        let logs = TempDir::new().unwrap();
        fs::write(
            logs.path().join("pihole.log"),
            "r2---sn-b.googlevideo.com r1---sn-a.googlevideo.com\n",
        )
        .unwrap();
        let config = config_for(logs.path());
        let args = Args::parse_from(["edgeblock", "--yes"]);

        let result = scan_logs(&config, &args).unwrap();
        let out = logs.path().join("domains.txt");
        write_domains(&result, &out).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "r1---sn-a.googlevideo.com\nr2---sn-b.googlevideo.com\n"
        );

        assert!(should_submit(&config, &args, result.domain_count()).unwrap());
        let sink = RecordingSink {
            received: RefCell::new(Vec::new()),
        };
        submit_domains(&result, &sink).unwrap();
        assert_eq!(sink.received.borrow().len(), 1);
        assert_eq!(sink.received.borrow()[0].len(), 2);
    }

    #[test]
    fn dry_run_and_empty_results_never_submit() {
        let config = Config {
            confirm: false,
            ..Config::default()
        };
        let dry = Args::parse_from(["edgeblock", "--dry-run"]);
        assert!(!should_submit(&config, &dry, 10).unwrap());

        let plain = Args::parse_from(["edgeblock"]);
        assert!(!should_submit(&config, &plain, 0).unwrap());
        assert!(should_submit(&config, &plain, 1).unwrap());
    }

    #[test]
    fn output_defaults_to_configured_name() {
        let config = Config::default();
        let args = Args::parse_from(["edgeblock"]);
        assert_eq!(output_path(&config, &args), PathBuf::from("youtube_domains.txt"));
        let args = Args::parse_from(["edgeblock", "-o", "/tmp/x.txt"]);
        assert_eq!(output_path(&config, &args), PathBuf::from("/tmp/x.txt"));
    }
}
