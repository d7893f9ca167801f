//! Threat Types & Telemetry Samples
//!
//! Core types cho detection engine.
//! KHÔNG chứa logic - chỉ data structures.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SEVERITY
// ============================================================================

/// Threat severity levels (informational only - the engine never drops
/// or reorders findings based on severity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT KIND
// ============================================================================

/// Finding categories emitted by the detector catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    RemoteControlApplication,
    RemoteControlService,
    SuspiciousProcess,
    SuspiciousConnection,
    ScreenShare,
    Virtualization,
    MessagingApp,
    ClipboardSync,
    MemoryPressure,
    SignatureProcess,
    SignaturePort,
    SignatureDomain,
}

impl ThreatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatKind::RemoteControlApplication => "remote_control_application",
            ThreatKind::RemoteControlService => "remote_control_service",
            ThreatKind::SuspiciousProcess => "suspicious_process",
            ThreatKind::SuspiciousConnection => "suspicious_connection",
            ThreatKind::ScreenShare => "screen_share",
            ThreatKind::Virtualization => "virtualization",
            ThreatKind::MessagingApp => "messaging_app",
            ThreatKind::ClipboardSync => "clipboard_sync",
            ThreatKind::MemoryPressure => "memory_pressure",
            ThreatKind::SignatureProcess => "signature_process",
            ThreatKind::SignaturePort => "signature_port",
            ThreatKind::SignatureDomain => "signature_domain",
        }
    }
}

impl std::fmt::Display for ThreatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT
// ============================================================================

/// A single structured finding from a detector.
///
/// Identity for within-cycle deduplication is `(kind, message)`.
/// `details` is opaque, detector-specific metadata; consumers must not
/// mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub kind: ThreatKind,
    pub severity: Severity,
    pub message: String,
    pub details: BTreeMap<String, String>,
    pub detected_at: DateTime<Utc>,
}

impl Threat {
    pub fn new(kind: ThreatKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            details: BTreeMap::new(),
            detected_at: Utc::now(),
        }
    }

    /// Attach a detail key/value (builder style)
    pub fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Attach the owning pid - threats carrying a pid are subject to the
    /// end-of-cycle liveness filter
    pub fn with_pid(self, pid: u32) -> Self {
        self.with_detail("pid", pid.to_string())
    }

    /// Owning pid, if this finding references one
    pub fn pid(&self) -> Option<u32> {
        self.details.get("pid").and_then(|v| v.parse().ok())
    }

    /// Dedup identity within one scan cycle
    pub fn identity(&self) -> (ThreatKind, &str) {
        (self.kind, self.message.as_str())
    }
}

// ============================================================================
// TELEMETRY SAMPLES
// ============================================================================

/// Per-cycle process snapshot entry. Ephemeral; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    /// Full command line, space-joined
    pub cmd: String,
    /// Basename of the resolved executable, lowercase
    pub exe_basename: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
    pub status: String,
}

impl ProcessSample {
    /// Lowercased haystack over name, command line and exe basename
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.name, self.cmd, self.exe_basename).to_lowercase()
    }
}

/// Per-cycle network connection snapshot entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionSample {
    pub protocol: String,
    pub local_port: u16,
    pub peer_port: u16,
    pub peer_address: String,
    pub state: String,
    pub pid: Option<u32>,
}

impl ConnectionSample {
    pub fn is_udp(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("udp")
    }
}

/// Browser tab as reported by the platform automation surface
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserTab {
    pub url: String,
    pub title: String,
    pub window_index: u32,
    pub tab_index: u32,
}

/// Active media-capture node from the platform capture subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreencastSample {
    pub node_id: u64,
    pub media_class: String,
    pub app_name: String,
    pub pid: Option<u32>,
    pub active: bool,
}

// ============================================================================
// SIGNATURE SET
// ============================================================================

/// Operator-supplied banned signatures. Read-only input; empty fields
/// mean "no additional signatures".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureSet {
    #[serde(default)]
    pub process_names: Vec<String>,
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub domains: Vec<String>,
}

impl SignatureSet {
    pub fn is_empty(&self) -> bool {
        self.process_names.is_empty() && self.ports.is_empty() && self.domains.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
