//! Suspicious Process Detector
//!
//! Ứng dụng không phù hợp trong monitored session: calculators, editors,
//! IDEs, math tools. Idle instances vẫn tính - không cần activity.

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
            let matched = rules::first_match(&p.haystack(), rules::SUSPICIOUS_APPS)?;
            Some(
                Threat::new(
                    ThreatKind::SuspiciousProcess,
                    Severity::Medium,
                    format!("Suspicious application running: {}", matched),
                )
                .with_pid(p.pid)
                .with_detail("process", &p.name)
                .with_detail("cpu", format!("{:.1}", p.cpu_percent)),
            )
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
