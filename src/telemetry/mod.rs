//! Telemetry Adapter
//!
//! Uniform query surface over heterogeneous OS facilities.
//! Contract: mọi operation "never throws" - lỗi, timeout, utility vắng mặt
//! đều trả về empty/zero value.

pub mod command;
pub mod linux;
pub mod macos;
pub mod windows;

use std::time::Duration;

use parking_lot::Mutex;
use sysinfo::System;

use crate::types::{BrowserTab, ConnectionSample, ProcessSample, ScreencastSample};

/// Split `host:port` notation as emitted by ss/lsof/netstat.
/// Tolerates `[::1]:443`, `*:*` and bare hosts.
pub(crate) fn split_host_port(addr: &str) -> (String, u16) {
    let Some((host, port)) = addr.rsplit_once(':') else {
        return (addr.to_string(), 0);
    };
    let host = host.trim_matches(|c| c == '[' || c == ']').to_string();
    let port = port.parse().unwrap_or(0);
    (host, port)
}

// ============================================================================
// HOST TELEMETRY
// ============================================================================

/// Live telemetry source for the local host.
///
/// Process snapshots come from sysinfo; everything else shells out to the
/// platform's native query utilities through [`command`], each call bounded
/// by `cmd_timeout`.
pub struct HostTelemetry {
    system: Mutex<System>,
    cmd_timeout: Duration,
}

impl HostTelemetry {
    pub fn new(cmd_timeout: Duration) -> Self {
        Self {
            system: Mutex::new(System::new_all()),
            cmd_timeout,
        }
    }

    /// Point-in-time process snapshot
    pub fn processes(&self) -> Vec<ProcessSample> {
        let mut sys = self.system.lock();
        sys.refresh_processes();
        sys.refresh_cpu();
        sys.refresh_memory();

        let total_memory = sys.total_memory() as f64;

        sys.processes()
            .iter()
            .map(|(pid, process)| {
                let mem_percent = if total_memory > 0.0 {
                    (process.memory() as f64 / total_memory * 100.0) as f32
                } else {
                    0.0
                };
                ProcessSample {
                    pid: pid.as_u32(),
                    name: process.name().to_string(),
                    cmd: process.cmd().join(" "),
                    exe_basename: process
                        .exe()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_lowercase())
                        .unwrap_or_default(),
                    cpu_percent: process.cpu_usage(),
                    mem_percent,
                    status: format!("{:?}", process.status()),
                }
            })
            .collect()
    }

    /// Point-in-time network connection snapshot
    pub async fn connections(&self) -> Vec<ConnectionSample> {
        #[cfg(target_os = "linux")]
        return linux::connections(self.cmd_timeout).await;
        #[cfg(target_os = "macos")]
        return macos::connections(self.cmd_timeout).await;
        #[cfg(target_os = "windows")]
        return windows::connections(self.cmd_timeout).await;
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        Vec::new()
    }

    /// Running platform service/daemon names (lowercased)
    pub async fn services(&self) -> Vec<String> {
        #[cfg(target_os = "linux")]
        return linux::services(self.cmd_timeout).await;
        #[cfg(target_os = "macos")]
        return macos::services(self.cmd_timeout).await;
        #[cfg(target_os = "windows")]
        return windows::services(self.cmd_timeout).await;
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        Vec::new()
    }

    /// Installed application inventory (lowercased names)
    pub async fn installed_applications(&self) -> Vec<String> {
        #[cfg(target_os = "linux")]
        return linux::installed_applications();
        #[cfg(target_os = "macos")]
        return macos::installed_applications();
        #[cfg(target_os = "windows")]
        return windows::installed_applications(self.cmd_timeout).await;
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        Vec::new()
    }

    /// Tabs (or window titles where tab-level access is unavailable) for a
    /// browser confirmed to be running
    pub async fn browser_tabs(&self, browser: &str) -> Vec<BrowserTab> {
        #[cfg(target_os = "linux")]
        return linux::browser_windows(browser, self.cmd_timeout).await;
        #[cfg(target_os = "macos")]
        return macos::browser_tabs(browser, self.cmd_timeout).await;
        #[cfg(target_os = "windows")]
        return windows::browser_windows(browser, self.cmd_timeout).await;
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let _ = browser;
            Vec::new()
        }
    }

    /// Active media-capture nodes (desktop-composition capture graph)
    pub async fn screencast_sessions(&self) -> Vec<ScreencastSample> {
        #[cfg(target_os = "linux")]
        return linux::screencast_sessions(self.cmd_timeout).await;
        #[cfg(not(target_os = "linux"))]
        Vec::new()
    }

    /// Remote-desktop session presence (Windows) / screen-sharing agent
    /// presence (macOS)
    pub async fn remote_desktop_session_active(&self) -> bool {
        #[cfg(target_os = "windows")]
        return windows::remote_desktop_session_active(self.cmd_timeout).await;
        #[cfg(target_os = "macos")]
        return macos::remote_desktop_session_active(self.cmd_timeout).await;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        false
    }

    /// System manufacturer/model strings for hypervisor detection
    pub async fn system_vendor_model(&self) -> (String, String) {
        #[cfg(target_os = "linux")]
        return linux::system_vendor_model();
        #[cfg(target_os = "macos")]
        return macos::system_vendor_model(self.cmd_timeout).await;
        #[cfg(target_os = "windows")]
        return windows::system_vendor_model(self.cmd_timeout).await;
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        (String::new(), String::new())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("192.168.1.5:443"), ("192.168.1.5".to_string(), 443));
        assert_eq!(split_host_port("[::1]:8080"), ("::1".to_string(), 8080));
        assert_eq!(split_host_port("*:*"), ("*".to_string(), 0));
        assert_eq!(split_host_port("0.0.0.0:*"), ("0.0.0.0".to_string(), 0));
        assert_eq!(split_host_port("noport"), ("noport".to_string(), 0));
    }

    #[test]
    fn test_process_snapshot_contains_self() {
        let telemetry = HostTelemetry::new(Duration::from_secs(2));
        let procs = telemetry.processes();
        assert!(!procs.is_empty());
        let me = std::process::id();
        assert!(procs.iter().any(|p| p.pid == me));
    }
}
