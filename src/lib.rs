//! Exam Integrity Core
//!
//! Threat-detection engine cho monitored sessions: quét host tìm remote
//! control tools, screen sharing, virtualization, clipboard bridges và
//! caller-supplied signatures.
//!
//! Entry point là [`DetectionEngine::run_all_checks`]: snapshot telemetry,
//! chạy toàn bộ detector catalog concurrent, trả về merged findings.
//! Engine không bao giờ fail - mọi telemetry/detector error degrade thành
//! ít findings hơn.
//!
//! ```no_run
//! use exam_integrity_core::{DetectionEngine, SignatureSet};
//!
//! # async fn scan() {
//! let engine = DetectionEngine::new();
//! let threats = engine.run_all_checks(&SignatureSet::default()).await;
//! for threat in &threats {
//!     println!("[{}] {}", threat.severity, threat.message);
//! }
//! # }
//! ```

pub mod config;
pub mod detect;
pub mod engine;
pub mod telemetry;
pub mod types;

pub use config::EngineTunables;
pub use engine::DetectionEngine;
pub use types::{Severity, SignatureSet, Threat, ThreatKind};
