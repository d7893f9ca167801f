//! Bounded External Command Runner
//!
//! Mọi OS utility đều được gọi qua đây với timeout rõ ràng.
//! Missing utility, non-zero exit, timeout - tất cả đều fail soft.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// Run a native OS utility and capture stdout.
///
/// Returns `None` when the utility is missing, cannot be spawned, or
/// exceeds the timeout. The underlying process is killed on abandonment
/// (`kill_on_drop`). Non-zero exit with output still yields the output -
/// several platform tools (netstat, launchctl) exit non-zero on partial
/// results.
pub async fn run(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let fut = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(out)) => {
            let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
            if !out.status.success() && stdout.is_empty() {
                log::debug!("{} exited with {:?} and no output", program, out.status.code());
                return None;
            }
            Some(stdout)
        }
        Ok(Err(e)) => {
            // Utility absent on this host - the signal category is simply
            // unavailable, not an error.
            log::debug!("{} unavailable: {}", program, e);
            None
        }
        Err(_) => {
            log::warn!("{} timed out after {:?}, abandoning", program, timeout);
            None
        }
    }
}

/// Like [`run`] but degrades to an empty string, for callers that feed
/// straight into a tolerant parser.
pub async fn run_or_empty(program: &str, args: &[&str], timeout: Duration) -> String {
    run(program, args, timeout).await.unwrap_or_default()
}
