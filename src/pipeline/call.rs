use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::action::DetectionLogRepository;
use crate::models::PhoneCall;
use crate::pipeline::reasons::*;
use crate::pipeline::{CallScamDetector, ThreatIntelRepository};
use crate::risk::{DetectionResult, RiskLevel};

const METADATA_SIGNALS: [(&str, &str); 3] = [
    (CALLER_NUMBER_MALFORMED, ESCALATION_CALLER_NUMBER_MALFORMED),
    (HIGH_RISK_COUNTRY_PREFIX, ESCALATION_HIGH_RISK_COUNTRY_PREFIX),
    (CALL_SPOOFING_SUSPECTED, ESCALATION_CALL_SPOOFING_SUSPECTED),
];

/// Incoming call analysis.
///
/// 1. base score from the call detector;
/// 2. threat-intel adjustment;
/// 3. escalation for a known scam caller, then for suspicious numbering
///    metadata (malformed number, high-risk prefix, spoofing);
/// 4. audit log.
pub struct AnalyzeIncomingCall {
    detector: Arc<dyn CallScamDetector>,
    threat_intel: Arc<dyn ThreatIntelRepository>,
    detection_log: Arc<dyn DetectionLogRepository>,
}

impl AnalyzeIncomingCall {
    pub fn new(
        detector: Arc<dyn CallScamDetector>,
        threat_intel: Arc<dyn ThreatIntelRepository>,
        detection_log: Arc<dyn DetectionLogRepository>,
    ) -> Self {
        Self {
            detector,
            threat_intel,
            detection_log,
        }
    }

    pub async fn run(&self, call: &PhoneCall) -> Result<DetectionResult> {
        let base = self
            .detector
            .analyze(call)
            .await
            .with_context(|| format!("{} failed on call {}", self.detector.name(), call.id))?;

        let adjusted = self
            .threat_intel
            .adjust_call_result(call, base)
            .await
            .context("Threat intel adjustment failed for call")?;

        let known_scam_number = self
            .threat_intel
            .is_known_scam_phone(&call.phone_number)
            .await
            .context("Threat intel phone lookup failed")?;

        let escalated =
            escalate_for_metadata_signals(escalate_for_known_scam_caller(adjusted, known_scam_number));

        if let Err(e) = self.detection_log.log_call_detection(call, &escalated).await {
            warn!(detection_id = %escalated.id, error = ?e, "failed to log call detection");
        }

        debug!(
            call_id = %call.id,
            risk = %escalated.risk_level,
            confidence = escalated.confidence_score,
            "call analyzed"
        );

        Ok(escalated)
    }
}

/// Threat intel and the `caller_known_scam` tag both agreeing force
/// CRITICAL/0.97; either one alone floors at HIGH/0.90.
pub fn escalate_for_known_scam_caller(
    current: DetectionResult,
    known_scam_number: bool,
) -> DetectionResult {
    let has_reason = current.has_reason(CALLER_KNOWN_SCAM);

    if !known_scam_number && !has_reason {
        return current;
    }

    let (target, floor) = if known_scam_number && has_reason {
        (RiskLevel::Critical, 0.97)
    } else {
        (RiskLevel::High, 0.90)
    };

    current.escalate(target, floor, [ESCALATION_CALLER_KNOWN_SCAM])
}

/// One metadata signal bumps once (confidence 0.85), two or more bump twice
/// (confidence 0.92).
pub fn escalate_for_metadata_signals(current: DetectionResult) -> DetectionResult {
    let present: Vec<&str> = METADATA_SIGNALS
        .iter()
        .filter(|(signal, _)| current.has_reason(signal))
        .map(|(_, escalation)| *escalation)
        .collect();

    let (bumps, floor) = match present.len() {
        0 => return current,
        1 => (1, 0.85),
        _ => (2, 0.92),
    };

    let target = current.risk_level.bump_times(bumps);
    current.escalate(target, floor, present)
}
