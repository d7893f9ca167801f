//! Windows Collectors
//!
//! netstat / powershell / qwinsta / wmic. Mỗi collector fail soft.

use std::time::Duration;

use crate::telemetry::command;
use crate::types::{BrowserTab, ConnectionSample};

// ============================================================================
// NETWORK CONNECTIONS (netstat)
// ============================================================================

pub async fn connections(timeout: Duration) -> Vec<ConnectionSample> {
    let out = command::run_or_empty("netstat", &["-ano"], timeout).await;
    parse_netstat(&out)
}

/// Parse `netstat -ano` output. TCP rows carry a state column, UDP rows
/// do not; the owning PID is always the last column.
pub fn parse_netstat(out: &str) -> Vec<ConnectionSample> {
    let mut samples = Vec::new();

    for line in out.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let proto = match fields.first() {
            Some(p) if p.eq_ignore_ascii_case("tcp") || p.eq_ignore_ascii_case("udp") => {
                p.to_lowercase()
            }
            _ => continue,
        };

        let (state, pid_field) = if proto == "tcp" {
            if fields.len() < 5 {
                continue;
            }
            (fields[3].to_string(), fields[4])
        } else {
            if fields.len() < 4 {
                continue;
            }
            (String::new(), fields[3])
        };

        let (_, local_port) = super::split_host_port(fields[1]);
        let (peer_address, peer_port) = super::split_host_port(fields[2]);

        samples.push(ConnectionSample {
            protocol: proto,
            local_port,
            peer_port,
            peer_address,
            state,
            pid: pid_field.parse().ok(),
        });
    }

    samples
}

// ============================================================================
// SERVICES (powershell Get-Service)
// ============================================================================

pub async fn services(timeout: Duration) -> Vec<String> {
    let out = command::run_or_empty(
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            "Get-Service | Where-Object {$_.Status -eq 'Running'} | Select-Object -ExpandProperty Name",
        ],
        timeout,
    )
    .await;
    parse_name_lines(&out)
}

// ============================================================================
// INSTALLED APPLICATIONS (uninstall registry keys)
// ============================================================================

pub async fn installed_applications(timeout: Duration) -> Vec<String> {
    let out = command::run_or_empty(
        "powershell",
        &[
            "-NoProfile",
            "-Command",
            "Get-ItemProperty HKLM:\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*, \
             HKLM:\\Software\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\* \
             -ErrorAction SilentlyContinue | Select-Object -ExpandProperty DisplayName",
        ],
        timeout,
    )
    .await;
    parse_name_lines(&out)
}

pub fn parse_name_lines(out: &str) -> Vec<String> {
    out.lines()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect()
}

// ============================================================================
// BROWSER WINDOWS (title enumeration fallback)
// ============================================================================

pub async fn browser_windows(browser: &str, timeout: Duration) -> Vec<BrowserTab> {
    let ps = format!(
        "Get-Process {} -ErrorAction SilentlyContinue | \
         Where-Object {{$_.MainWindowTitle}} | Select-Object -ExpandProperty MainWindowTitle",
        browser
    );
    let out = command::run_or_empty("powershell", &["-NoProfile", "-Command", &ps], timeout).await;
    parse_window_titles(&out)
}

pub fn parse_window_titles(out: &str) -> Vec<BrowserTab> {
    out.lines()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(idx, title)| BrowserTab {
            url: String::new(),
            title: title.to_string(),
            window_index: idx as u32,
            tab_index: 0,
        })
        .collect()
}

// ============================================================================
// REMOTE DESKTOP SESSION PRESENCE (qwinsta)
// ============================================================================

pub async fn remote_desktop_session_active(timeout: Duration) -> bool {
    let out = command::run_or_empty("qwinsta", &[], timeout).await;
    parse_qwinsta_active_rdp(&out)
}

/// An `rdp-tcp#N` row in Active state means somebody is attached over RDP.
pub fn parse_qwinsta_active_rdp(out: &str) -> bool {
    out.lines().any(|line| {
        let lower = line.to_lowercase();
        lower.contains("rdp-tcp#") && lower.contains("active")
    })
}

// ============================================================================
// SYSTEM IDENTITY (wmic)
// ============================================================================

pub async fn system_vendor_model(timeout: Duration) -> (String, String) {
    let out = command::run_or_empty(
        "wmic",
        &["computersystem", "get", "manufacturer,model", "/value"],
        timeout,
    )
    .await;
    parse_wmic_vendor_model(&out)
}

pub fn parse_wmic_vendor_model(out: &str) -> (String, String) {
    let mut vendor = String::new();
    let mut model = String::new();
    for line in out.lines() {
        if let Some(v) = line.trim().strip_prefix("Manufacturer=") {
            vendor = v.trim().to_string();
        } else if let Some(m) = line.trim().strip_prefix("Model=") {
            model = m.trim().to_string();
        }
    }
    (vendor, model)
}

// ============================================================================
// TESTS
// ============================================================================
