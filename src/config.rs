//! Engine Tunables
//!
//! Single source of truth for detection thresholds.
//! Các ngưỡng heuristic đều có thể override - defaults giữ nguyên giá trị gốc.

use serde::{Deserialize, Serialize};

// ============================================================================
// DEFAULTS (Constants - không đổi lúc runtime)
// ============================================================================

/// Per-detector wall-clock budget (ms)
pub const DEFAULT_DETECTOR_TIMEOUT_MS: u64 = 5_000;

/// Per external OS-utility invocation budget (ms)
pub const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 2_500;

/// Sticky grace window: a just-lost detection stays alive this long (ms)
pub const DEFAULT_STICKY_GRACE_MS: i64 = 60_000;

/// Browser CPU% considered "elevated" for screen-share corroboration
pub const DEFAULT_BROWSER_CPU_THRESHOLD: f32 = 30.0;

/// Meeting apps multiplex fewer sockets, so their CPU bar is lower
pub const DEFAULT_MEETING_CPU_THRESHOLD: f32 = 10.0;

/// Outbound UDP connections on high/relay ports before a browser is flagged
pub const DEFAULT_BROWSER_UDP_THRESHOLD: usize = 8;

/// Same, for native meeting apps
pub const DEFAULT_MEETING_UDP_THRESHOLD: usize = 3;

/// First "high" (ephemeral) port for UDP media heuristics
pub const DEFAULT_HIGH_PORT_FLOOR: u16 = 32_768;

/// Aggregate mem% across screen-capable apps before the weak signal fires
pub const DEFAULT_AGGREGATE_MEM_THRESHOLD: f32 = 30.0;

/// High-port UDP connection growth between cycles treated as a surge
pub const DEFAULT_UDP_SURGE_DELTA: usize = 10;

/// Sharing tabs needed to raise a screen-share finding to High
pub const DEFAULT_SHARING_TAB_HIGH_COUNT: usize = 2;

// ============================================================================
// TUNABLES
// ============================================================================

/// Named, overridable heuristic thresholds.
///
/// The defaults reproduce the original heuristic constants; none of them
/// has been empirically validated, so treat them as a starting point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineTunables {
    pub detector_timeout_ms: u64,
    pub command_timeout_ms: u64,
    pub sticky_grace_ms: i64,
    pub browser_cpu_threshold: f32,
    pub meeting_cpu_threshold: f32,
    pub browser_udp_threshold: usize,
    pub meeting_udp_threshold: usize,
    pub high_port_floor: u16,
    pub aggregate_mem_threshold: f32,
    pub udp_surge_delta: usize,
    pub sharing_tab_high_count: usize,
}

impl Default for EngineTunables {
    fn default() -> Self {
        Self {
            detector_timeout_ms: DEFAULT_DETECTOR_TIMEOUT_MS,
            command_timeout_ms: DEFAULT_COMMAND_TIMEOUT_MS,
            sticky_grace_ms: DEFAULT_STICKY_GRACE_MS,
            browser_cpu_threshold: DEFAULT_BROWSER_CPU_THRESHOLD,
            meeting_cpu_threshold: DEFAULT_MEETING_CPU_THRESHOLD,
            browser_udp_threshold: DEFAULT_BROWSER_UDP_THRESHOLD,
            meeting_udp_threshold: DEFAULT_MEETING_UDP_THRESHOLD,
            high_port_floor: DEFAULT_HIGH_PORT_FLOOR,
            aggregate_mem_threshold: DEFAULT_AGGREGATE_MEM_THRESHOLD,
            udp_surge_delta: DEFAULT_UDP_SURGE_DELTA,
            sharing_tab_high_count: DEFAULT_SHARING_TAB_HIGH_COUNT,
        }
    }
}

impl EngineTunables {
    /// High sensitivity - lower thresholds, more findings
    pub fn high_sensitivity() -> Self {
        Self {
            browser_cpu_threshold: 20.0,
            meeting_cpu_threshold: 5.0,
            browser_udp_threshold: 5,
            meeting_udp_threshold: 2,
            aggregate_mem_threshold: 20.0,
            ..Default::default()
        }
    }

    pub fn detector_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.detector_timeout_ms)
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.command_timeout_ms)
    }
}
