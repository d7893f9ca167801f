//! Memory Pressure Detector
//!
//! Weak signal: tổng memory của browsers + meeting apps + capture tools
//! vượt ngưỡng. Một finding duy nhất, không gắn pid.

use crate::detect::helpers;
use crate::detect::rules;
use crate::detect::CycleInput;
use crate::types::{Severity, Threat, ThreatKind};

pub fn detect(input: &CycleInput) -> Vec<Threat> {
    let mut total = 0.0f32;
    let mut contributors = 0usize;

    for p in input.processes.iter().filter(|p| !helpers::is_system_helper(p)) {
        let hay = p.haystack();
        if rules::matches_any(&hay, rules::BROWSERS)
            || rules::matches_any(&hay, rules::MEETING_APPS)
            || rules::matches_any(&hay, rules::CAPTURE_TOOLS)
        {
            total += p.mem_percent;
            contributors += 1;
        }
    }

    if contributors == 0 || total < input.tunables.aggregate_mem_threshold {
        return Vec::new();
    }

    vec![Threat::new(
        ThreatKind::MemoryPressure,
        Severity::Low,
        format!("Screen-capable applications using {:.1}% of memory", total),
    )
    .with_detail("memory_percent", format!("{:.1}", total))
    .with_detail("processes", contributors.to_string())]
}

// ============================================================================
// TESTS
// ============================================================================
