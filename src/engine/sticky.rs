//! Sticky State Tracker
//!
//! Per-subject temporal memory. Giữ detection vừa mất trong grace window
//! để tránh flicker từ intermittent signals (ví dụ WebRTC traffic bursts).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Temporal memory keyed by subject (commonly a pid).
///
/// `touch` on true instantaneous evidence; `is_active` stays true until
/// `now - last_seen` exceeds the grace window. Expired records are not
/// swept on a timer - they are ignored once stale and pruned during
/// bookkeeping.
#[derive(Debug, Default)]
pub struct StickyTracker {
    records: HashMap<u64, DateTime<Utc>>,
    grace_ms: i64,
}

impl StickyTracker {
    pub fn new(grace_ms: i64) -> Self {
        Self {
            records: HashMap::new(),
            grace_ms,
        }
    }

    /// Record (or refresh) a positive detection of `key` at `now`
    pub fn touch(&mut self, key: u64, now: DateTime<Utc>) {
        self.records.insert(key, now);
    }

    /// True while the subject was last seen within the grace window
    pub fn is_active(&self, key: u64, now: DateTime<Utc>) -> bool {
        self.records
            .get(&key)
            .map(|last| now - *last < Duration::milliseconds(self.grace_ms))
            .unwrap_or(false)
    }

    /// Drop records already outside the grace window
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let grace = Duration::milliseconds(self.grace_ms);
        self.records.retain(|_, last| now - *last < grace);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_window_semantics() {
        let t0 = Utc::now();
        let mut tracker = StickyTracker::new(60_000);

        // first positive detection at T
        tracker.touch(1234, t0);

        // evidence false at T+30s - still within the grace window
        assert!(tracker.is_active(1234, t0 + Duration::seconds(30)));

        // evidence still false at T+61s - window expired
        assert!(!tracker.is_active(1234, t0 + Duration::seconds(61)));
    }

    #[test]
    fn test_touch_refreshes_window() {
        let t0 = Utc::now();
        let mut tracker = StickyTracker::new(60_000);

        tracker.touch(7, t0);
        tracker.touch(7, t0 + Duration::seconds(50));

        // 50s + 40s after refresh = 90s after first touch, still active
        assert!(tracker.is_active(7, t0 + Duration::seconds(90)));
    }

    #[test]
    fn test_unknown_key_inactive() {
        let tracker = StickyTracker::new(60_000);
        assert!(!tracker.is_active(42, Utc::now()));
    }

    #[test]
    fn test_prune_removes_stale_records() {
        let t0 = Utc::now();
        let mut tracker = StickyTracker::new(60_000);

        tracker.touch(1, t0);
        tracker.touch(2, t0 + Duration::seconds(55));
        tracker.prune(t0 + Duration::seconds(70));

        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_active(2, t0 + Duration::seconds(70)));
    }
}
