//! Remote Control Application Detector
//!
//! Phát hiện remote-access tools (TeamViewer, AnyDesk, VNC, RDP, ...).
//! Foreground application = critical, background service/daemon = medium.

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{ProcessSample, Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let mut threats = Vec::new();

    for (key, patterns) in rules::REMOTE_CONTROL_TOOLS {
        // At most one finding per normalized app key, keeping the
        // highest-CPU instance.
        let best: Option<&ProcessSample> = input
            .processes
            .iter()
            .filter(|p| !helpers::is_system_helper(p))
            .filter(|p| rules::matches_any(&p.haystack(), patterns))
            .max_by(|a, b| {
                a.cpu_percent
                    .partial_cmp(&b.cpu_percent)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        let Some(process) = best else { continue };

        let as_service = helpers::is_background(process) || service_running(input, patterns);

        let mut threat = if as_service {
            Threat::new(
                ThreatKind::RemoteControlService,
                Severity::Medium,
                format!("Remote control service running: {}", key),
            )
        } else {
            Threat::new(
                ThreatKind::RemoteControlApplication,
                Severity::Critical,
                format!("Remote control application running: {}", key),
            )
        };

        threat = threat
            .with_pid(process.pid)
            .with_detail("app", *key)
            .with_detail("process", &process.name)
            .with_detail("cmd", &process.cmd)
            .with_detail("cpu", format!("{:.1}", process.cpu_percent));

        if rules::matches_any(&input.installed_apps.join(" "), patterns) {
            threat = threat.with_detail("installed", "true");
        }

        threats.push(threat);
    }

    threats
}

/// A running platform service matching the tool corroborates the
/// service/daemon classification.
fn service_running(input: &CycleInput, patterns: &[&str]) -> bool {
    input
        .services
        .iter()
        .any(|s| rules::matches_any(s, patterns))
}

// ============================================================================
// TESTS
// ============================================================================
