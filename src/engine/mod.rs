//! Detection Engine - Orchestrator
//!
//! Một scan cycle: snapshot telemetry -> fan out toàn bộ detector catalog
//! (concurrent, fault-isolated, time-bounded) -> merge + dedup + liveness.
//! Engine entry không bao giờ fail: mọi lỗi degrade thành ít findings hơn.

pub mod baseline;
pub mod sticky;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::EngineTunables;
use crate::detect::{helpers, rules, CycleInput, DetectorFn, DETECTORS};
use crate::engine::baseline::NetworkBaseline;
use crate::engine::sticky::StickyTracker;
use crate::telemetry::HostTelemetry;
use crate::types::{ProcessSample, SignatureSet, Threat, ThreatKind};

// ============================================================================
// ENGINE
// ============================================================================

/// Long-lived detection engine for one monitored host.
///
/// Holds the temporal state that outlives a single cycle (sticky tracker,
/// network baseline). Construct once and call [`run_all_checks`] each
/// polling interval.
///
/// [`run_all_checks`]: DetectionEngine::run_all_checks
pub struct DetectionEngine {
    telemetry: HostTelemetry,
    tunables: EngineTunables,
    detectors: Vec<(&'static str, DetectorFn)>,
    sticky: Arc<Mutex<StickyTracker>>,
    baseline: Arc<Mutex<Option<NetworkBaseline>>>,
}

impl DetectionEngine {
    pub fn new() -> Self {
        Self::with_tunables(EngineTunables::default())
    }

    pub fn with_tunables(tunables: EngineTunables) -> Self {
        let telemetry = HostTelemetry::new(tunables.command_timeout());
        let sticky = Arc::new(Mutex::new(StickyTracker::new(tunables.sticky_grace_ms)));
        Self {
            telemetry,
            tunables,
            detectors: DETECTORS.to_vec(),
            sticky,
            baseline: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the detector catalog (tests inject stub detectors here)
    pub fn with_detectors(mut self, detectors: Vec<(&'static str, DetectorFn)>) -> Self {
        self.detectors = detectors;
        self
    }

    /// Run one full scan cycle against live host telemetry.
    ///
    /// Never fails - a telemetry source or detector that errors, panics or
    /// stalls contributes nothing to the result instead of aborting the
    /// cycle.
    pub async fn run_all_checks(&self, signatures: &SignatureSet) -> Vec<Threat> {
        let cycle_id = Uuid::new_v4();
        let started = std::time::Instant::now();
        log::info!("scan cycle {} started", cycle_id);

        let processes = self.telemetry.processes();

        let (connections, services, installed_apps, screencasts, remote_session_active, vendor_model) = tokio::join!(
            self.telemetry.connections(),
            self.telemetry.services(),
            self.telemetry.installed_applications(),
            self.telemetry.screencast_sessions(),
            self.telemetry.remote_desktop_session_active(),
            self.telemetry.system_vendor_model(),
        );

        // Tab introspection is per-browser and costs an automation round
        // trip, so only query a browser confirmed to be running.
        let browser_tabs = match running_browser(&processes) {
            Some(browser) => self.telemetry.browser_tabs(browser).await,
            None => Vec::new(),
        };

        let input = Arc::new(CycleInput {
            processes,
            connections,
            services,
            installed_apps,
            screencasts,
            browser_tabs,
            remote_session_active,
            system_vendor: vendor_model.0,
            system_model: vendor_model.1,
            signatures: signatures.clone(),
            tunables: self.tunables.clone(),
            now: Utc::now(),
            sticky: Arc::clone(&self.sticky),
            baseline: Arc::clone(&self.baseline),
        });

        let raw = self.run_cycle(Arc::clone(&input)).await;
        let merged = dedup(raw);
        let threats = helpers::retain_live(merged, &input.processes);

        log::info!(
            "scan cycle {} finished: {} threat(s) in {}ms",
            cycle_id,
            threats.len(),
            started.elapsed().as_millis()
        );
        threats
    }

    /// Fan the catalog out over the shared cycle view.
    ///
    /// Each detector runs on the blocking pool under its own wall-clock
    /// budget; a panic or timeout is logged and yields an empty slice.
    pub(crate) async fn run_cycle(&self, input: Arc<CycleInput>) -> Vec<Threat> {
        let budget = self.tunables.detector_timeout();
        let mut set = tokio::task::JoinSet::new();

        for (name, det) in &self.detectors {
            let name = *name;
            let det = *det;
            let input = Arc::clone(&input);
            set.spawn(async move {
                let work = tokio::task::spawn_blocking(move || det(&input));
                match tokio::time::timeout(budget, work).await {
                    Ok(Ok(threats)) => (name, threats),
                    Ok(Err(join_err)) => {
                        log::warn!("detector {} panicked: {}", name, join_err);
                        (name, Vec::new())
                    }
                    Err(_) => {
                        log::warn!("detector {} exceeded {}ms budget", name, budget.as_millis());
                        (name, Vec::new())
                    }
                }
            });
        }

        let mut all = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, threats)) => {
                    if !threats.is_empty() {
                        log::debug!("detector {} produced {} finding(s)", name, threats.len());
                    }
                    all.extend(threats);
                }
                Err(join_err) => log::warn!("detector task failed: {}", join_err),
            }
        }
        all
    }
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// MERGE
// ============================================================================

/// Within-cycle deduplication on `(kind, message)`, first occurrence wins
/// (its details are kept).
pub(crate) fn dedup(threats: Vec<Threat>) -> Vec<Threat> {
    let mut seen: HashSet<(ThreatKind, String)> = HashSet::new();
    threats
        .into_iter()
        .filter(|t| seen.insert((t.kind, t.message.clone())))
        .collect()
}

/// First known browser with a live process, if any
fn running_browser(processes: &[ProcessSample]) -> Option<&'static str> {
    rules::BROWSERS
        .iter()
        .copied()
        .find(|browser| processes.iter().any(|p| p.haystack().contains(*browser)))
}

#[cfg(test)]
mod tests;
