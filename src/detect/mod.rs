//! Detector Catalog
//!
//! Mỗi detector là một pure function: telemetry (+ signatures) -> Vec<Threat>.
//! Tất cả detector chạy concurrent trong một scan cycle, fault-isolated.

pub mod clipboard;
pub mod helpers;
pub mod memory_pressure;
pub mod messaging;
pub mod network;
pub mod remote_control;
pub mod rules;
pub mod screen_share;
pub mod signature;
pub mod suspicious_process;
pub mod virtualization;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::config::EngineTunables;
use crate::engine::baseline::NetworkBaseline;
use crate::engine::sticky::StickyTracker;
use crate::types::{
    BrowserTab, ConnectionSample, ProcessSample, ScreencastSample, SignatureSet, Threat,
};

// ============================================================================
// CYCLE INPUT
// ============================================================================

/// One scan cycle's shared view: read-only telemetry snapshots plus the
/// engine's temporal state. Shared by reference across all concurrently
/// running detectors.
pub struct CycleInput {
    pub processes: Vec<ProcessSample>,
    pub connections: Vec<ConnectionSample>,
    pub services: Vec<String>,
    pub installed_apps: Vec<String>,
    pub screencasts: Vec<ScreencastSample>,
    pub browser_tabs: Vec<BrowserTab>,
    pub remote_session_active: bool,
    pub system_vendor: String,
    pub system_model: String,
    pub signatures: SignatureSet,
    pub tunables: EngineTunables,
    pub now: DateTime<Utc>,

    /// Cross-cycle temporal memory, owned by the engine instance
    pub sticky: Arc<Mutex<StickyTracker>>,
    /// Previous cycle's connection aggregates, owned by the engine instance
    pub baseline: Arc<Mutex<Option<NetworkBaseline>>>,
}

impl CycleInput {
    /// Empty cycle view - snapshots are filled in by the orchestrator
    /// (or directly by tests).
    pub fn new(signatures: SignatureSet, tunables: EngineTunables, now: DateTime<Utc>) -> Self {
        let sticky = Arc::new(Mutex::new(StickyTracker::new(tunables.sticky_grace_ms)));
        Self {
            processes: Vec::new(),
            connections: Vec::new(),
            services: Vec::new(),
            installed_apps: Vec::new(),
            screencasts: Vec::new(),
            browser_tabs: Vec::new(),
            remote_session_active: false,
            system_vendor: String::new(),
            system_model: String::new(),
            signatures,
            tunables,
            now,
            sticky,
            baseline: Arc::new(Mutex::new(None)),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// A detector: pure function of the cycle view, zero or more findings out
pub type DetectorFn = fn(&CycleInput) -> Vec<Threat>;

/// Full catalog, run concurrently each cycle by the orchestrator
pub const DETECTORS: &[(&str, DetectorFn)] = &[
    ("remote_control", remote_control::detect),
    ("suspicious_process", suspicious_process::detect),
    ("network", network::detect),
    ("screen_share", screen_share::detect),
    ("virtualization", virtualization::detect),
    ("messaging", messaging::detect),
    ("clipboard", clipboard::detect),
    ("memory_pressure", memory_pressure::detect),
    ("signature", signature::detect),
];
