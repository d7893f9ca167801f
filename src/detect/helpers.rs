//! Noise Filter Helpers
//!
//! Phân loại system/driver/installer helper processes để loại bỏ
//! false positives trước khi kết quả vào merge.

use std::collections::HashSet;

use crate::detect::rules;
use crate::types::{ProcessSample, Threat};

/// True when the process is a recognized OS/driver/installer/casting
/// helper. Helper matches are never reported, even when the name also
/// matches a blocklist entry.
pub fn is_system_helper(sample: &ProcessSample) -> bool {
    rules::matches_any(&sample.haystack(), rules::SYSTEM_HELPERS)
}

/// True when the owning pid of a connection belongs to a system helper
pub fn pid_is_system_helper(pid: Option<u32>, processes: &[ProcessSample]) -> bool {
    let Some(pid) = pid else { return false };
    processes
        .iter()
        .find(|p| p.pid == pid)
        .map(is_system_helper)
        .unwrap_or(false)
}

/// True when the invocation looks like a background service/daemon rather
/// than a foreground, user-visible process
pub fn is_background(sample: &ProcessSample) -> bool {
    rules::DAEMON_MARKERS.is_match(&sample.cmd) || sample.exe_basename.ends_with("daemon")
}

/// End-of-cycle liveness filter: drop threats whose `details.pid` does not
/// appear in the same-cycle process snapshot. Protects against reporting
/// on processes that exited mid-scan.
pub fn retain_live(threats: Vec<Threat>, processes: &[ProcessSample]) -> Vec<Threat> {
    let live: HashSet<u32> = processes.iter().map(|p| p.pid).collect();
    let before = threats.len();

    let kept: Vec<Threat> = threats
        .into_iter()
        .filter(|t| match t.pid() {
            Some(pid) => live.contains(&pid),
            None => true,
        })
        .collect();

    if kept.len() < before {
        log::debug!("liveness filter dropped {} stale finding(s)", before - kept.len());
    }
    kept
}

// ============================================================================
// TESTS
// ============================================================================
