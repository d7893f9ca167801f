//! Linux Collectors
//!
//! ss / systemctl / wmctrl / pw-dump / DMI. Mỗi collector fail soft.

use std::time::Duration;

use crate::telemetry::command;
use crate::telemetry::split_host_port;
use crate::types::{BrowserTab, ConnectionSample, ScreencastSample};

// ============================================================================
// NETWORK CONNECTIONS (ss)
// ============================================================================

pub async fn connections(timeout: Duration) -> Vec<ConnectionSample> {
    let out = command::run_or_empty("ss", &["-H", "-tunap"], timeout).await;
    parse_ss(&out)
}

/// Parse `ss -H -tunap` output.
///
/// Columns: Netid State Recv-Q Send-Q Local-Address:Port Peer-Address:Port [Process]
pub fn parse_ss(out: &str) -> Vec<ConnectionSample> {
    let mut samples = Vec::new();

    for line in out.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            continue;
        }

        let (_, local_port) = split_host_port(fields[4]);
        let (peer_address, peer_port) = split_host_port(fields[5]);

        // users:(("firefox",pid=1234,fd=99))
        let pid = line
            .split("pid=")
            .nth(1)
            .and_then(|rest| rest.split(|c: char| !c.is_ascii_digit()).next())
            .and_then(|digits| digits.parse().ok());

        samples.push(ConnectionSample {
            protocol: fields[0].to_lowercase(),
            local_port,
            peer_port,
            peer_address,
            state: fields[1].to_string(),
            pid,
        });
    }

    samples
}

// ============================================================================
// SERVICES (systemctl)
// ============================================================================

pub async fn services(timeout: Duration) -> Vec<String> {
    let out = command::run_or_empty(
        "systemctl",
        &["list-units", "--type=service", "--state=running", "--no-legend", "--plain"],
        timeout,
    )
    .await;
    parse_systemctl(&out)
}

pub fn parse_systemctl(out: &str) -> Vec<String> {
    out.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(|unit| unit.trim_end_matches(".service").to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

// ============================================================================
// INSTALLED APPLICATIONS (desktop entries)
// ============================================================================

pub fn installed_applications() -> Vec<String> {
    let mut apps = Vec::new();
    let mut dirs = vec!["/usr/share/applications".to_string()];
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(format!("{}/.local/share/applications", home));
    }

    for dir in dirs {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if let Some(app) = name.strip_suffix(".desktop") {
                apps.push(app.to_string());
            }
        }
    }

    apps
}

// ============================================================================
// BROWSER WINDOWS (wmctrl fallback - no tab-level access on Linux)
// ============================================================================

pub async fn browser_windows(browser: &str, timeout: Duration) -> Vec<BrowserTab> {
    let out = command::run_or_empty("wmctrl", &["-l"], timeout).await;
    parse_wmctrl(&out, browser)
}

/// `wmctrl -l` lines: `0x03e00003  0 hostname Window Title Words`.
/// Only window titles are available; urls stay empty.
pub fn parse_wmctrl(out: &str, browser: &str) -> Vec<BrowserTab> {
    let needle = browser.to_lowercase();
    out.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            // window-id, desktop, hostname, then the title words
            let mut fields = line.split_whitespace();
            let (_id, _desktop, _host) = (fields.next()?, fields.next()?, fields.next()?);
            let title = fields.collect::<Vec<_>>().join(" ");
            if title.is_empty() || !title.to_lowercase().contains(&needle) {
                return None;
            }
            Some(BrowserTab {
                url: String::new(),
                title,
                window_index: idx as u32,
                tab_index: 0,
            })
        })
        .collect()
}

// ============================================================================
// SCREENCAST SESSIONS (PipeWire capture graph)
// ============================================================================

pub async fn screencast_sessions(timeout: Duration) -> Vec<ScreencastSample> {
    let out = command::run_or_empty("pw-dump", &[], timeout).await;
    parse_pw_dump(&out)
}

/// Parse `pw-dump` JSON, keeping nodes that consume desktop video
/// (`Stream/Input/Video` media class). Malformed JSON yields nothing.
pub fn parse_pw_dump(out: &str) -> Vec<ScreencastSample> {
    let Ok(serde_json::Value::Array(objects)) = serde_json::from_str(out) else {
        return Vec::new();
    };

    let mut sessions = Vec::new();

    for obj in &objects {
        if obj.get("type").and_then(|t| t.as_str()) != Some("PipeWire:Interface:Node") {
            continue;
        }
        let Some(info) = obj.get("info") else { continue };
        let props = info.get("props").cloned().unwrap_or_default();

        let media_class = props
            .get("media.class")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if !media_class.contains("Stream/Input/Video") {
            continue;
        }

        sessions.push(ScreencastSample {
            node_id: obj.get("id").and_then(|v| v.as_u64()).unwrap_or(0),
            media_class,
            app_name: props
                .get("application.name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_lowercase(),
            pid: props
                .get("application.process.id")
                .and_then(|v| v.as_u64())
                .map(|p| p as u32),
            active: info.get("state").and_then(|v| v.as_str()) == Some("running"),
        });
    }

    sessions
}

// ============================================================================
// SYSTEM IDENTITY (DMI)
// ============================================================================

pub fn system_vendor_model() -> (String, String) {
    let read = |path: &str| {
        std::fs::read_to_string(path)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    (
        read("/sys/class/dmi/id/sys_vendor"),
        read("/sys/class/dmi/id/product_name"),
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ss_tcp_and_udp() {
        let out = "\
tcp   ESTAB  0 0  192.168.1.50:44422  142.250.74.206:443  users:((\"firefox\",pid=2211,fd=88))
udp   UNCONN 0 0  0.0.0.0:5353        0.0.0.0:*
tcp   LISTEN 0 5  127.0.0.1:5900      0.0.0.0:*           users:((\"x11vnc\",pid=777,fd=4))";

        let samples = parse_ss(out);
        assert_eq!(samples.len(), 3);

        assert_eq!(samples[0].protocol, "tcp");
        assert_eq!(samples[0].local_port, 44422);
        assert_eq!(samples[0].peer_port, 443);
        assert_eq!(samples[0].peer_address, "142.250.74.206");
        assert_eq!(samples[0].pid, Some(2211));

        assert_eq!(samples[1].protocol, "udp");
        assert_eq!(samples[1].pid, None);

        assert_eq!(samples[2].local_port, 5900);
        assert_eq!(samples[2].pid, Some(777));
    }

    #[test]
    fn test_parse_ss_garbage_lines_skipped() {
        let samples = parse_ss("not a real line\n\n??\n");
        assert!(samples.is_empty());
    }

    #[test]
    fn test_parse_systemctl() {
        let out = "\
teamviewerd.service   loaded active running TeamViewer remote control daemon
cups.service          loaded active running CUPS Scheduler";
        let services = parse_systemctl(out);
        assert_eq!(services, vec!["teamviewerd", "cups"]);
    }

    #[test]
    fn test_parse_wmctrl_filters_by_browser() {
        let out = "\
0x03e00003  0 host Mozilla Firefox
0x04200007  0 host meet.google.com is sharing your screen - Google Chrome
0x05000001  0 host Terminal";
        let tabs = parse_wmctrl(out, "chrome");
        assert_eq!(tabs.len(), 1);
        assert!(tabs[0].title.contains("sharing your screen"));
        assert!(tabs[0].url.is_empty());
    }

    #[test]
    fn test_parse_pw_dump_capture_node() {
        let out = r#"[
          {
            "id": 57,
            "type": "PipeWire:Interface:Node",
            "info": {
              "state": "running",
              "props": {
                "media.class": "Stream/Input/Video",
                "application.name": "OBS Studio",
                "application.process.id": 4242
              }
            }
          },
          {
            "id": 12,
            "type": "PipeWire:Interface:Node",
            "info": {
              "state": "running",
              "props": { "media.class": "Audio/Sink" }
            }
          }
        ]"#;

        let sessions = parse_pw_dump(out);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].node_id, 57);
        assert_eq!(sessions[0].app_name, "obs studio");
        assert_eq!(sessions[0].pid, Some(4242));
        assert!(sessions[0].active);
    }

    #[test]
    fn test_parse_pw_dump_malformed() {
        assert!(parse_pw_dump("{ not json").is_empty());
        assert!(parse_pw_dump("").is_empty());
    }
}
