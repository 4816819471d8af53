use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::action::DetectionLogRepository;
use crate::models::DeviceSecuritySnapshot;
use crate::pipeline::reasons::*;
use crate::pipeline::{DeviceThreatDetector, ThreatIntelRepository};
use crate::risk::{DetectionResult, RiskLevel};

/// Device security evaluation.
///
/// Escalation policy on the snapshot flags:
///  - failed integrity check: CRITICAL, confidence 0.97, dominates the rest;
///  - root / jailbreak: at least HIGH, confidence 0.93;
///  - suspicious apps, emulator, debuggable build: one bump per flag (at
///    most two) while below CRITICAL, confidence 0.90.
pub struct EvaluateDeviceSecurityState {
    detector: Arc<dyn DeviceThreatDetector>,
    threat_intel: Arc<dyn ThreatIntelRepository>,
    detection_log: Arc<dyn DetectionLogRepository>,
}

impl EvaluateDeviceSecurityState {
    pub fn new(
        detector: Arc<dyn DeviceThreatDetector>,
        threat_intel: Arc<dyn ThreatIntelRepository>,
        detection_log: Arc<dyn DetectionLogRepository>,
    ) -> Self {
        Self {
            detector,
            threat_intel,
            detection_log,
        }
    }

    pub async fn run(&self, snapshot: &DeviceSecuritySnapshot) -> Result<DetectionResult> {
        let base = self
            .detector
            .analyze(snapshot)
            .await
            .with_context(|| format!("{} failed on snapshot {}", self.detector.name(), snapshot.id))?;

        let adjusted = self
            .threat_intel
            .adjust_device_result(snapshot, base)
            .await
            .context("Threat intel adjustment failed for device snapshot")?;

        let escalated = escalate_for_device_flags(snapshot, adjusted);

        if let Err(e) = self.detection_log.log_device_detection(snapshot, &escalated).await {
            warn!(detection_id = %escalated.id, error = ?e, "failed to log device detection");
        }

        debug!(
            snapshot_id = %snapshot.id,
            risk = %escalated.risk_level,
            confidence = escalated.confidence_score,
            "device evaluated"
        );

        Ok(escalated)
    }
}

pub fn escalate_for_device_flags(
    snapshot: &DeviceSecuritySnapshot,
    current: DetectionResult,
) -> DetectionResult {
    if !snapshot.has_any_flag() {
        return current;
    }

    let mut risk = current.risk_level;
    let mut confidence = current.confidence_score;
    let mut extra = Vec::new();

    if !snapshot.integrity_check_passed {
        risk = RiskLevel::Critical;
        confidence = confidence.max(0.97);
        extra.push(DEVICE_INTEGRITY_CHECK_FAILED);
    }

    if snapshot.is_rooted_or_jailbroken {
        risk = risk.max(RiskLevel::High);
        confidence = confidence.max(0.93);
        extra.push(DEVICE_ROOT_OR_JAILBREAK_DETECTED);
    }

    let secondary: Vec<&str> = [
        (snapshot.has_suspicious_apps, DEVICE_SUSPICIOUS_APPS),
        (snapshot.is_emulator, DEVICE_EMULATOR_SUSPICIOUS),
        (snapshot.has_debuggable_build, DEVICE_DEBUGGABLE_BUILD),
    ]
    .into_iter()
    .filter_map(|(flag, reason)| flag.then_some(reason))
    .collect();

    if !secondary.is_empty() && risk < RiskLevel::Critical {
        risk = risk.bump_times(secondary.len().min(2));
        confidence = confidence.max(0.90);
    }
    extra.extend(secondary);

    current.escalate(risk, confidence, extra)
}
