//! Subprocess plumbing shared by handlers that shell out.

use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::consts::MAX_OUTPUT_BYTES;

/// Run `program` with `args` and return its stdout.
///
/// A non-zero exit is an error carrying the exit code and both output
/// streams. The child is killed if the returned future is dropped.
pub async fn run<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    debug!(command = ?cmd.as_std(), "spawning subprocess");

    let output = cmd
        .output()
        .await
        .with_context(|| format!("failed to run {program}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        Ok(stdout.into_owned())
    } else {
        bail!(
            "{} exited with code {}\nstdout: {}\nstderr: {}",
            program,
            output.status.code().unwrap_or(-1),
            truncate_output(&stdout, MAX_OUTPUT_BYTES),
            truncate_output(&stderr, MAX_OUTPUT_BYTES)
        )
    }
}

fn truncate_output(output: &str, max_bytes: usize) -> String {
    if output.len() <= max_bytes {
        return output.to_string();
    }
    let mut end = max_bytes;
    while !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n\n[truncated: showing {}/{} bytes]",
        &output[..end],
        end,
        output.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_stdout() {
        let out = run("sh", ["-c", "echo hello"]).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = run("sh", ["-c", "echo oops >&2; exit 3"]).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("exited with code 3"), "{msg}");
        assert!(msg.contains("oops"), "{msg}");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let err = run("taskgate-definitely-not-installed", ["--version"])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to run taskgate-definitely-not-installed"));
    }

    #[test]
    fn truncate_short_output_unchanged() {
        assert_eq!(truncate_output("abc", 10), "abc");
    }

    #[test]
    fn truncate_long_output() {
        let out = truncate_output("abcdefghij", 4);
        assert!(out.starts_with("abcd\n"));
        assert!(out.contains("[truncated: showing 4/10 bytes]"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // "é" is two bytes; cutting at 1 would split it.
        let out = truncate_output("éé", 1);
        assert!(out.starts_with("\n\n[truncated"));
    }
}
