//! Suspicious Network Connection Detector
//!
//! Flag connections trên các remote-access ports (RDP, VNC, SSH, ...).
//! Connections của system helper processes được bỏ qua.

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let mut threats = Vec::new();

    for conn in &input.connections {
        let port = if rules::SUSPICIOUS_PORTS.contains(&conn.local_port) {
            conn.local_port
        } else if rules::SUSPICIOUS_PORTS.contains(&conn.peer_port) {
            conn.peer_port
        } else {
            continue;
        };

        if helpers::pid_is_system_helper(conn.pid, &input.processes) {
            continue;
        }

        let mut threat = Threat::new(
            ThreatKind::SuspiciousConnection,
            Severity::Medium,
            format!("Suspicious {} connection on port {}", conn.protocol, port),
        )
        .with_detail("port", port.to_string())
        .with_detail("local_port", conn.local_port.to_string())
        .with_detail("peer", &conn.peer_address)
        .with_detail("state", &conn.state);

        if let Some(pid) = conn.pid {
            threat = threat.with_pid(pid);
            if let Some(owner) = input.processes.iter().find(|p| p.pid == pid) {
                threat = threat.with_detail("process", &owner.name);
            }
        }

        threats.push(threat);
    }

    threats
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineTunables;
    use crate::types::{ConnectionSample, ProcessSample, SignatureSet};
    use chrono::Utc;

    fn base_input() -> CycleInput {
        CycleInput::new(SignatureSet::default(), EngineTunables::default(), Utc::now())
    }

    fn conn(local: u16, peer: u16, pid: Option<u32>) -> ConnectionSample {
        ConnectionSample {
            protocol: "tcp".to_string(),
            local_port: local,
            peer_port: peer,
            peer_address: "203.0.113.9".to_string(),
            state: "ESTABLISHED".to_string(),
            pid,
        }
    }

    #[test]
    fn test_rdp_peer_port_flagged() {
        let mut input = base_input();
        input.connections = vec![conn(50111, 3389, None)];
        let threats = detect(&input);

        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].kind, ThreatKind::SuspiciousConnection);
        assert!(threats[0].message.contains("3389"));
    }

    #[test]
    fn test_vnc_listener_flagged_with_owner() {
        let mut input = base_input();
        input.processes = vec![ProcessSample {
            pid: 77,
            name: "x11vnc".to_string(),
            ..Default::default()
        }];
        input.connections = vec![conn(5900, 0, Some(77))];

        let threats = detect(&input);
        assert_eq!(threats[0].pid(), Some(77));
        assert_eq!(threats[0].details.get("process").map(String::as_str), Some("x11vnc"));
    }

    #[test]
    fn test_helper_owned_connection_excluded() {
        let mut input = base_input();
        input.processes = vec![ProcessSample {
            pid: 88,
            name: "svchost".to_string(),
            cmd: "svchost.exe -k termsvcs".to_string(),
            exe_basename: "svchost".to_string(),
            ..Default::default()
        }];
        input.connections = vec![conn(3389, 0, Some(88))];

        assert!(detect(&input).is_empty());
    }

    #[test]
    fn test_ordinary_port_ignored() {
        let mut input = base_input();
        input.connections = vec![conn(50112, 443, None)];
        assert!(detect(&input).is_empty());
    }
}
