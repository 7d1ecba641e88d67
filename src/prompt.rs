use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::warn;

/// Asks whether the collected domains should be blocked.
///
/// Keeps asking until the answer starts with `y` or `n` (any case). End of
/// input counts as a no.
pub fn confirm<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    domain_count: usize,
) -> Result<bool> {
    writeln!(output, "-----------")?;
    writeln!(
        output,
        "Would you like to stick those ({}) collected domains into *your* pihole? (y/n)",
        domain_count
    )?;
    writeln!(output, "-----------")?;
    output.flush()?;

    let mut answer = String::new();
    loop {
        answer.clear();
        let read = input
            .read_line(&mut answer)
            .context("Could not read confirmation input")?;
        if read == 0 {
            return Ok(false);
        }

        match answer.trim().chars().next() {
            Some('y') | Some('Y') => return Ok(true),
            Some('n') | Some('N') => return Ok(false),
            _ => {
                warn!(action = "prompt", component = "confirmation", answer = answer.trim(), "Unsupported answer");
                writeln!(output, "Your answer ({}) is not supported. Use: Y, y, N, n", answer.trim())?;
                output.flush()?;
            }
        }
    }
}
