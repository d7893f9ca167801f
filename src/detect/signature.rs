//! Signature Detector
//!
//! Caller-supplied indicators cho từng scan: process names, ports, domains.
//! Signature hits không qua helper suppression - caller đã chỉ định rõ.

use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let sigs = &input.signatures;
    if sigs.is_empty() {
        return Vec::new();
    }

    let mut threats = Vec::new();

    let name_patterns: Vec<&str> = sigs.process_names.iter().map(String::as_str).collect();
    for p in &input.processes {
        if let Some(matched) = rules::first_match(&p.haystack(), &name_patterns) {
            threats.push(
                Threat::new(
                    ThreatKind::SignatureProcess,
                    Severity::High,
                    format!("Signature process match: {}", matched),
                )
                .with_pid(p.pid)
                .with_detail("signature", matched)
                .with_detail("process", &p.name),
            );
        }
    }

    let domain_patterns: Vec<&str> = sigs.domains.iter().map(String::as_str).collect();
    for conn in &input.connections {
        if let Some(port) = sigs
            .ports
            .iter()
            .find(|p| **p == conn.local_port || **p == conn.peer_port)
        {
            let mut threat = Threat::new(
                ThreatKind::SignaturePort,
                Severity::Medium,
                format!("Signature port match: {}", port),
            )
            .with_detail("signature", port.to_string())
            .with_detail("local_port", conn.local_port.to_string())
            .with_detail("peer", &conn.peer_address);
            if let Some(pid) = conn.pid {
                threat = threat.with_pid(pid);
            }
            threats.push(threat);
        }

        if let Some(domain) = rules::first_match(&conn.peer_address, &domain_patterns) {
            let mut threat = Threat::new(
                ThreatKind::SignatureDomain,
                Severity::Medium,
                format!("Signature domain match: {}", domain),
            )
            .with_detail("signature", domain)
            .with_detail("peer", &conn.peer_address);
            if let Some(pid) = conn.pid {
                threat = threat.with_pid(pid);
            }
            threats.push(threat);
        }
    }

    threats
}

// ============================================================================
// TESTS
// ============================================================================
