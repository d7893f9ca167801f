//! Network Baseline
//!
//! Single latest snapshot cho delta-style anomaly comparison.
//! Thay thế toàn bộ mỗi cycle - không tích lũy time series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ConnectionSample;

/// Aggregate connection counts from the previous cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkBaseline {
    pub total_connections: usize,
    pub high_port_udp: usize,
    pub captured_at: DateTime<Utc>,
}

impl NetworkBaseline {
    /// Capture aggregate counts from this cycle's connection snapshot
    pub fn capture(connections: &[ConnectionSample], high_port_floor: u16, now: DateTime<Utc>) -> Self {
        let high_port_udp = connections
            .iter()
            .filter(|c| c.is_udp() && (c.local_port >= high_port_floor || c.peer_port >= high_port_floor))
            .count();

        Self {
            total_connections: connections.len(),
            high_port_udp,
            captured_at: now,
        }
    }

    /// Growth in high-port UDP connections since this baseline
    pub fn udp_growth(&self, current_high_port_udp: usize) -> usize {
        current_high_port_udp.saturating_sub(self.high_port_udp)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn udp(local: u16, peer: u16) -> ConnectionSample {
        ConnectionSample {
            protocol: "udp".to_string(),
            local_port: local,
            peer_port: peer,
            ..Default::default()
        }
    }

    fn tcp(local: u16) -> ConnectionSample {
        ConnectionSample {
            protocol: "tcp".to_string(),
            local_port: local,
            ..Default::default()
        }
    }

    #[test]
    fn test_capture_counts_high_port_udp() {
        let conns = vec![udp(40000, 3478), udp(53, 53), tcp(44300), udp(50123, 60000)];
        let baseline = NetworkBaseline::capture(&conns, 32768, Utc::now());

        assert_eq!(baseline.total_connections, 4);
        assert_eq!(baseline.high_port_udp, 2);
    }

    #[test]
    fn test_udp_growth_saturates() {
        let baseline = NetworkBaseline::capture(&[udp(40000, 40001)], 32768, Utc::now());
        assert_eq!(baseline.udp_growth(11), 10);
        assert_eq!(baseline.udp_growth(0), 0);
    }
}
