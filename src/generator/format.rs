use anyhow::{bail, Context};
use std::io::Write;
use std::process::{Command, Stdio};

/// Pipe rendered code through rustfmt and return the formatted text.
pub fn format_source(code: &str, rustfmt_bin: &str) -> anyhow::Result<String> {
    let mut child = Command::new(rustfmt_bin)
        .args(["--edition", "2021", "--emit", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {rustfmt_bin}"))?;

    let mut stdin = child
        .stdin
        .take()
        .context("rustfmt stdin was not captured")?;
    let input = code.to_owned();
    // Writing from a second thread keeps a full stdout pipe from blocking us.
    let writer = std::thread::spawn(move || stdin.write_all(input.as_bytes()));

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed to wait for {rustfmt_bin}"))?;
    match writer.join() {
        Ok(result) => result.context("Failed to write to rustfmt")?,
        Err(_) => bail!("rustfmt writer thread panicked"),
    }

    if !output.status.success() {
        bail!(
            "{rustfmt_bin} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    String::from_utf8(output.stdout).context("rustfmt produced non-UTF-8 output")
}
