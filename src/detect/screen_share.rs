//! Screen Sharing / Screencast Detector
//!
//! Tổng hợp nhiều nguồn evidence: capture flags, capture tools, screencast
//! sessions, WebRTC UDP traffic, remote desktop sessions, sharing tabs.
//! WebRTC evidence được làm mượt qua sticky tracker (grace window).

use std::collections::HashMap;

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::engine::baseline::NetworkBaseline;
use crate::types::{BrowserTab, ProcessSample, Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let mut threats = Vec::new();

    let sharing_tabs = matched_sharing_tabs(&input.browser_tabs);
    let udp_surge = update_baseline(input);

    // Browser launched with forced screen-capture permission flags
    for p in candidate_processes(input, rules::BROWSERS) {
        if rules::BROWSER_CAPTURE_FLAGS.is_match(&p.cmd) {
            threats.push(
                Threat::new(
                    ThreatKind::ScreenShare,
                    Severity::High,
                    format!("Browser launched with screen-capture flags: {}", p.name),
                )
                .with_pid(p.pid)
                .with_detail("process", &p.name)
                .with_detail("cmd", &p.cmd),
            );
        }
    }

    // Dedicated capture tools with a capture backend in their arguments
    for p in candidate_processes(input, rules::CAPTURE_TOOLS) {
        if let Some(hint) = rules::first_match(&p.cmd, rules::CAPTURE_BACKEND_HINTS) {
            threats.push(
                Threat::new(
                    ThreatKind::ScreenShare,
                    Severity::High,
                    format!("Screen capture tool active: {}", p.name),
                )
                .with_pid(p.pid)
                .with_detail("process", &p.name)
                .with_detail("backend", hint),
            );
        }
    }

    // Platform screencast telemetry (desktop-composition capture graph)
    for session in input.screencasts.iter().filter(|s| s.active) {
        let mut threat = Threat::new(
            ThreatKind::ScreenShare,
            Severity::High,
            format!("Active screencast session: {}", session.app_name),
        )
        .with_detail("node_id", session.node_id.to_string())
        .with_detail("media_class", &session.media_class);
        if let Some(pid) = session.pid {
            threat = threat.with_pid(pid);
        }
        threats.push(threat);
    }

    // OS session introspection (RDP session / sharing agent)
    if input.remote_session_active {
        threats.push(Threat::new(
            ThreatKind::ScreenShare,
            Severity::High,
            "Remote desktop session attached".to_string(),
        ));
    }

    // WebRTC media traffic attributable to a browser or meeting app
    threats.extend(webrtc_findings(input, &sharing_tabs, udp_surge));

    threats
}

// ============================================================================
// WEBRTC TRAFFIC (sticky-smoothed)
// ============================================================================

fn webrtc_findings(input: &CycleInput, sharing_tabs: &[&BrowserTab], udp_surge: bool) -> Vec<Threat> {
    let counts = media_udp_counts(input);
    let mut sticky = input.sticky.lock();
    let mut threats = Vec::new();

    for p in input.processes.iter().filter(|p| !helpers::is_system_helper(p)) {
        // Native meeting apps multiplex fewer sockets than browsers,
        // so they get the lower thresholds.
        let (udp_threshold, cpu_threshold) = if rules::matches_any(&p.haystack(), rules::MEETING_APPS) {
            (input.tunables.meeting_udp_threshold, input.tunables.meeting_cpu_threshold)
        } else if rules::matches_any(&p.haystack(), rules::BROWSERS) {
            (input.tunables.browser_udp_threshold, input.tunables.browser_cpu_threshold)
        } else {
            continue;
        };

        let udp_count = counts.get(&p.pid).copied().unwrap_or(0);
        let instantaneous =
            udp_count >= udp_threshold || (udp_count > 0 && p.cpu_percent >= cpu_threshold);

        if instantaneous {
            sticky.touch(u64::from(p.pid), input.now);
        } else if !sticky.is_active(u64::from(p.pid), input.now) {
            continue;
        }

        let severity = if sharing_tabs.len() >= input.tunables.sharing_tab_high_count {
            Severity::High
        } else {
            Severity::Medium
        };

        let mut threat = Threat::new(
            ThreatKind::ScreenShare,
            severity,
            format!("WebRTC screen-share traffic from {}", p.name),
        )
        .with_pid(p.pid)
        .with_detail("process", &p.name)
        .with_detail("udp_connections", udp_count.to_string())
        .with_detail("cpu", format!("{:.1}", p.cpu_percent));

        if !instantaneous {
            threat = threat.with_detail("evidence", "sticky");
        }
        if udp_surge {
            threat = threat.with_detail("udp_surge", "true");
        }
        if !sharing_tabs.is_empty() {
            threat = threat
                .with_detail("sharing_tabs", sharing_tabs.len().to_string())
                .with_detail("tab", &sharing_tabs[0].title);
        }

        threats.push(threat);
    }

    // Bookkeeping for the grace window happens here, in the owning detector.
    sticky.prune(input.now);

    threats
}

/// Outbound UDP connections on high or STUN/TURN relay ports, per owning pid
fn media_udp_counts(input: &CycleInput) -> HashMap<u32, usize> {
    let floor = input.tunables.high_port_floor;
    let mut counts: HashMap<u32, usize> = HashMap::new();

    for conn in input.connections.iter().filter(|c| c.is_udp()) {
        let relay = rules::RTC_RELAY_PORTS.contains(&conn.peer_port);
        let high = conn.local_port >= floor || conn.peer_port >= floor;
        if !relay && !high {
            continue;
        }
        if let Some(pid) = conn.pid {
            *counts.entry(pid).or_insert(0) += 1;
        }
    }

    counts
}

// ============================================================================
// SUPPORTING EVIDENCE
// ============================================================================

fn candidate_processes<'a>(
    input: &'a CycleInput,
    patterns: &'static [&'static str],
) -> impl Iterator<Item = &'a ProcessSample> {
    input
        .processes
        .iter()
        .filter(|p| !helpers::is_system_helper(p))
        .filter(move |p| rules::matches_any(&p.haystack(), patterns))
}

/// Tabs whose url hits a conferencing domain or whose title carries a
/// sharing phrase
fn matched_sharing_tabs(tabs: &[BrowserTab]) -> Vec<&BrowserTab> {
    tabs.iter()
        .filter(|t| {
            rules::matches_any(&t.url, rules::SHARING_DOMAINS)
                || rules::matches_any(&t.title, rules::SHARING_TITLE_KEYWORDS)
        })
        .collect()
}

/// Replace the engine's network baseline with this cycle's aggregates and
/// report whether high-port UDP grew enough to count as a surge.
fn update_baseline(input: &CycleInput) -> bool {
    let current = NetworkBaseline::capture(&input.connections, input.tunables.high_port_floor, input.now);
    let mut guard = input.baseline.lock();

    let surge = guard
        .as_ref()
        .map(|prev| prev.udp_growth(current.high_port_udp) >= input.tunables.udp_surge_delta)
        .unwrap_or(false);

    *guard = Some(current);
    surge
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineTunables;
    use crate::types::{ConnectionSample, ScreencastSample, SignatureSet};
    use chrono::{Duration, Utc};

    fn base_input() -> CycleInput {
        CycleInput::new(SignatureSet::default(), EngineTunables::default(), Utc::now())
    }

    fn proc(pid: u32, name: &str, cmd: &str, cpu: f32) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cmd: cmd.to_string(),
            exe_basename: name.to_lowercase(),
            cpu_percent: cpu,
            ..Default::default()
        }
    }

    fn udp(pid: u32, local: u16, peer: u16) -> ConnectionSample {
        ConnectionSample {
            protocol: "udp".to_string(),
            local_port: local,
            peer_port: peer,
            pid: Some(pid),
            ..Default::default()
        }
    }

    #[test]
    fn test_browser_capture_flags() {
        let mut input = base_input();
        input.processes = vec![proc(9, "chrome", "chrome --auto-select-desktop-capture-source=Screen", 4.0)];
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].severity, Severity::High);
        assert!(threats[0].message.contains("capture flags"));
    }

    #[test]
    fn test_capture_tool_needs_backend_hint() {
        let mut input = base_input();
        input.processes = vec![
            proc(10, "ffmpeg", "ffmpeg -f x11grab -i :0 out.mkv", 20.0),
            proc(11, "ffmpeg", "ffmpeg -i movie.mkv movie.mp4", 20.0),
        ];
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].pid(), Some(10));
        assert_eq!(threats[0].details.get("backend").map(String::as_str), Some("x11grab"));
    }

    #[test]
    fn test_active_screencast_session() {
        let mut input = base_input();
        input.screencasts = vec![ScreencastSample {
            node_id: 57,
            media_class: "Stream/Input/Video".to_string(),
            app_name: "obs studio".to_string(),
            pid: Some(4242),
            active: true,
        }];
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].pid(), Some(4242));
    }

    #[test]
    fn test_meeting_app_lower_udp_threshold() {
        let mut input = base_input();
        input.processes = vec![proc(20, "zoom", "zoom", 2.0)];
        // 3 relay connections: below the browser threshold (8) but at the
        // meeting threshold (3)
        input.connections = vec![udp(20, 40001, 3478), udp(20, 40002, 3478), udp(20, 40003, 19302)];

        let threats = detect(&input);
        assert_eq!(threats.len(), 1);
        assert!(threats[0].message.contains("zoom"));
    }

    #[test]
    fn test_browser_below_threshold_not_flagged() {
        let mut input = base_input();
        input.processes = vec![proc(21, "firefox", "firefox", 2.0)];
        input.connections = vec![udp(21, 40001, 3478), udp(21, 40002, 3478), udp(21, 40003, 19302)];

        assert!(detect(&input).is_empty());
    }

    #[test]
    fn test_sticky_keeps_finding_within_grace() {
        let t0 = Utc::now();
        let mut input = base_input();
        input.now = t0;
        input.processes = vec![proc(30, "zoom", "zoom", 2.0)];
        input.connections = vec![udp(30, 40001, 3478), udp(30, 40002, 3478), udp(30, 40003, 3478)];

        // cycle 1: instantaneous evidence true
        assert_eq!(detect(&input).len(), 1);

        // cycle 2 at T+30s: traffic gone, sticky keeps it alive
        input.connections.clear();
        input.now = t0 + Duration::seconds(30);
        let threats = detect(&input);
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].details.get("evidence").map(String::as_str), Some("sticky"));

        // cycle 3 at T+91s: grace window expired
        input.now = t0 + Duration::seconds(91);
        assert!(detect(&input).is_empty());
    }

    #[test]
    fn test_sharing_tabs_raise_severity() {
        let mut input = base_input();
        input.processes = vec![proc(40, "zoom", "zoom", 2.0)];
        input.connections = vec![udp(40, 40001, 3478), udp(40, 40002, 3478), udp(40, 40003, 3478)];
        input.browser_tabs = vec![
            BrowserTab {
                url: "https://meet.google.com/abc".to_string(),
                title: "Meet".to_string(),
                ..Default::default()
            },
            BrowserTab {
                url: String::new(),
                title: "zoom.us is sharing your screen".to_string(),
                ..Default::default()
            },
        ];

        let threats = detect(&input);
        assert_eq!(threats[0].severity, Severity::High);
        assert_eq!(threats[0].details.get("sharing_tabs").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_remote_session_reported() {
        let mut input = base_input();
        input.remote_session_active = true;
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert!(threats[0].message.contains("Remote desktop session"));
    }

    #[test]
    fn test_udp_surge_marks_findings() {
        let mut input = base_input();
        input.processes = vec![proc(50, "zoom", "zoom", 2.0)];
        // cycle 1: quiet baseline
        detect(&input);

        // cycle 2: surge of high-port UDP attributable to zoom
        input.connections = (0..12).map(|i| udp(50, 40000 + i as u16, 3478)).collect();
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].details.get("udp_surge").map(String::as_str), Some("true"));
    }
}
