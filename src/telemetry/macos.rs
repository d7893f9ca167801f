//! macOS Collectors
//!
//! lsof / launchctl / osascript / sysctl. Mỗi collector fail soft.

use std::time::Duration;

use crate::telemetry::command;
use crate::types::{BrowserTab, ConnectionSample};

// ============================================================================
// NETWORK CONNECTIONS (lsof)
// ============================================================================

pub async fn connections(timeout: Duration) -> Vec<ConnectionSample> {
    let out = command::run_or_empty("lsof", &["-nP", "-i"], timeout).await;
    parse_lsof(&out)
}

/// Parse `lsof -nP -i` table output.
///
/// Columns: COMMAND PID USER FD TYPE DEVICE SIZE/OFF NODE NAME [(STATE)]
/// NAME is `local->peer` for connected sockets, `*:port` for listeners.
pub fn parse_lsof(out: &str) -> Vec<ConnectionSample> {
    let mut samples = Vec::new();

    for line in out.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }

        let pid = fields[1].parse().ok();
        let protocol = fields[7].to_lowercase();
        if protocol != "tcp" && protocol != "udp" {
            continue;
        }

        let name = fields[8];
        let state = fields
            .get(9)
            .map(|s| s.trim_matches(|c| c == '(' || c == ')').to_string())
            .unwrap_or_default();

        let (local, peer) = match name.split_once("->") {
            Some((l, p)) => (l, Some(p)),
            None => (name, None),
        };

        let (_, local_port) = super::split_host_port(local);
        let (peer_address, peer_port) = match peer {
            Some(p) => super::split_host_port(p),
            None => (String::new(), 0),
        };

        samples.push(ConnectionSample {
            protocol,
            local_port,
            peer_port,
            peer_address,
            state,
            pid,
        });
    }

    samples
}

// ============================================================================
// SERVICES (launchctl)
// ============================================================================

pub async fn services(timeout: Duration) -> Vec<String> {
    let out = command::run_or_empty("launchctl", &["list"], timeout).await;
    parse_launchctl(&out)
}

/// `launchctl list` columns: PID Status Label. "-" PID means not running.
pub fn parse_launchctl(out: &str) -> Vec<String> {
    out.lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 || fields[0] == "-" {
                return None;
            }
            Some(fields[2].to_lowercase())
        })
        .collect()
}

// ============================================================================
// INSTALLED APPLICATIONS
// ============================================================================

pub fn installed_applications() -> Vec<String> {
    let mut apps = Vec::new();
    for dir in ["/Applications", "/System/Applications"] {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if let Some(app) = name.strip_suffix(".app") {
                apps.push(app.to_string());
            }
        }
    }
    apps
}

// ============================================================================
// BROWSER TABS (AppleScript automation surface)
// ============================================================================

/// Tab inspection via osascript. Only called for browsers confirmed to be
/// running; a denied automation prompt degrades to no tabs.
pub async fn browser_tabs(browser: &str, timeout: Duration) -> Vec<BrowserTab> {
    let script = match tab_script(browser) {
        Some(s) => s,
        None => return Vec::new(),
    };
    let out = command::run_or_empty("osascript", &["-e", script], timeout).await;
    parse_tab_lines(&out)
}

/// AppleScript per browser family, emitting one `window|tab|url|title`
/// line per tab.
fn tab_script(browser: &str) -> Option<&'static str> {
    match browser {
        "safari" => Some(
            r#"set out to ""
tell application "Safari"
  repeat with w from 1 to count of windows
    repeat with t from 1 to count of tabs of window w
      set out to out & w & "|" & t & "|" & (URL of tab t of window w) & "|" & (name of tab t of window w) & linefeed
    end repeat
  end repeat
end tell
return out"#,
        ),
        "chrome" | "google chrome" => Some(
            r#"set out to ""
tell application "Google Chrome"
  repeat with w from 1 to count of windows
    repeat with t from 1 to count of tabs of window w
      set out to out & w & "|" & t & "|" & (URL of tab t of window w) & "|" & (title of tab t of window w) & linefeed
    end repeat
  end repeat
end tell
return out"#,
        ),
        _ => None,
    }
}

pub fn parse_tab_lines(out: &str) -> Vec<BrowserTab> {
    out.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(4, '|');
            let window_index = parts.next()?.trim().parse().ok()?;
            let tab_index = parts.next()?.trim().parse().ok()?;
            let url = parts.next()?.trim().to_string();
            let title = parts.next()?.trim().to_string();
            Some(BrowserTab { url, title, window_index, tab_index })
        })
        .collect()
}

// ============================================================================
// SCREEN-SHARING SESSION PRESENCE
// ============================================================================

/// Remote-Desktop / Screen Sharing agent processes that only run while a
/// session is active.
const SHARING_AGENTS: &[&str] = &["screensharingd", "ardagent", "applevncserver", "screensharingagent"];

pub async fn remote_desktop_session_active(timeout: Duration) -> bool {
    let out = command::run_or_empty("ps", &["-axo", "comm="], timeout).await;
    sharing_agent_present(&out)
}

pub fn sharing_agent_present(ps_out: &str) -> bool {
    ps_out.lines().any(|line| {
        let name = line.rsplit('/').next().unwrap_or(line).trim().to_lowercase();
        SHARING_AGENTS.iter().any(|agent| name == *agent)
    })
}

// ============================================================================
// SYSTEM IDENTITY
// ============================================================================

pub async fn system_vendor_model(timeout: Duration) -> (String, String) {
    let model = command::run_or_empty("sysctl", &["-n", "hw.model"], timeout).await;
    ("Apple".to_string(), model.trim().to_string())
}

// ============================================================================
// TESTS
// ============================================================================
