//! Virtualization Detector
//!
//! Session chạy trong VM = host integrity không tin được. Hai nguồn evidence:
//! DMI vendor/model strings và hypervisor guest-tool processes.

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let mut threats = Vec::new();

    let platform = format!("{} {}", input.system_vendor, input.system_model);
    if let Some(vendor) = rules::first_match(&platform, rules::VM_VENDOR_STRINGS) {
        threats.push(
            Threat::new(
                ThreatKind::Virtualization,
                Severity::High,
                format!("Session running inside a virtual machine: {}", vendor),
            )
            .with_detail("vendor", &input.system_vendor)
            .with_detail("model", &input.system_model),
        );
    }

    for p in input.processes.iter().filter(|p| !helpers::is_system_helper(p)) {
        if let Some(matched) = rules::first_match(&p.haystack(), rules::VM_PROCESSES) {
            threats.push(
                Threat::new(
                    ThreatKind::Virtualization,
                    Severity::High,
                    format!("Hypervisor guest tool running: {}", matched),
                )
                .with_pid(p.pid)
                .with_detail("process", &p.name),
            );
        }
    }

    threats
}

// ============================================================================
// TESTS
// ============================================================================
