//! Clipboard Sync Detector
//!
//! Clipboard-bridging tools đồng bộ clipboard sang thiết bị khác
//! (KDE Connect, Barrier, Synergy, ...) - kênh exfiltration trực tiếp.

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
            let matched = rules::first_match(&p.haystack(), rules::CLIPBOARD_BRIDGES)?;
            Some(
                Threat::new(
                    ThreatKind::ClipboardSync,
                    Severity::Medium,
                    format!("Clipboard sync tool running: {}", matched),
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
