use anyhow::{Context, Result};
use std::process::Command;
use tracing::info;

/// Receives the final domain list once a scan is done.
pub trait BlocklistSink {
    /// Adds `domains` to the blocklist and returns the tool's output.
    fn submit(&self, domains: &[String]) -> Result<String>;
}

/// Runs `pihole -b <domain>...`.
#[derive(Debug, Clone)]
pub struct PiholeCommand {
    program: String,
    args: Vec<String>,
}

impl Default for PiholeCommand {
    fn default() -> Self {
        PiholeCommand {
            program: "pihole".to_string(),
            args: vec!["-b".to_string()],
        }
    }
}

impl PiholeCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        PiholeCommand {
            program: program.into(),
            args,
        }
    }
}

impl BlocklistSink for PiholeCommand {
    fn submit(&self, domains: &[String]) -> Result<String> {
        if domains.is_empty() {
            return Ok(String::new());
        }

        info!(action = "submit", component = "blocklist", program = %self.program, domain_count = domains.len(), "Sending domains to blocklist command");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(domains)
            .output()
            .with_context(|| format!("Could not run `{}`", self.program))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            anyhow::bail!("`{}` exited with {}: {}", self.program, output.status, combined.trim());
        }
        Ok(combined)
    }
}
