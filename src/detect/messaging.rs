//! Messaging Application Detector
//!
//! Chat/messaging apps mở trong monitored session. Presence-based:
//! idle client vẫn là một kênh liên lạc.

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    input
        .processes
        .iter()
        .filter(|p| !helpers::is_system_helper(p))
        .filter_map(|p| {
            let matched = rules::first_match(&p.haystack(), rules::MESSAGING_APPS)?;
            Some(
                Threat::new(
                    ThreatKind::MessagingApp,
                    Severity::Medium,
                    format!("Messaging application running: {}", matched),
                )
                .with_pid(p.pid)
                .with_detail("process", &p.name),
            )
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineTunables;
    use crate::types::{ProcessSample, SignatureSet};
    use chrono::Utc;

    fn input_with(processes: Vec<ProcessSample>) -> CycleInput {
        let mut input = CycleInput::new(SignatureSet::default(), EngineTunables::default(), Utc::now());
        input.processes = processes;
        input
    }

    fn proc(pid: u32, name: &str) -> ProcessSample {
        ProcessSample {
            pid,
            name: name.to_string(),
            cmd: name.to_lowercase(),
            exe_basename: name.to_lowercase(),
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_messenger_flagged() {
        let threats = detect(&input_with(vec![proc(15, "Telegram")]));
        assert_eq!(threats.len(), 1);
        assert_eq!(threats[0].kind, ThreatKind::MessagingApp);
        assert_eq!(threats[0].severity, Severity::Medium);
    }

    #[test]
    fn test_discord_flagged() {
        assert_eq!(detect(&input_with(vec![proc(16, "Discord")])).len(), 1);
    }

    #[test]
    fn test_unrelated_process_ignored() {
        assert!(detect(&input_with(vec![proc(17, "bash")])).is_empty());
    }
}
