use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::action::DetectionLogRepository;
use crate::models::PaymentIntent;
use crate::pipeline::reasons::ESCALATION_PAYMENT_DESTINATION_KNOWN_SCAM;
use crate::pipeline::{PaymentRiskEngine, ThreatIntelRepository};
use crate::risk::{DetectionResult, RiskLevel};

pub struct EvaluatePaymentIntent {
    engine: Arc<dyn PaymentRiskEngine>,
    threat_intel: Arc<dyn ThreatIntelRepository>,
    detection_log: Arc<dyn DetectionLogRepository>,
}

impl EvaluatePaymentIntent {
    pub fn new(
        engine: Arc<dyn PaymentRiskEngine>,
        threat_intel: Arc<dyn ThreatIntelRepository>,
        detection_log: Arc<dyn DetectionLogRepository>,
    ) -> Self {
        Self {
            engine,
            threat_intel,
            detection_log,
        }
    }

    pub async fn run(&self, payment: &PaymentIntent) -> Result<DetectionResult> {
        let base = self
            .engine
            .analyze(payment)
            .await
            .with_context(|| format!("{} failed on payment {}", self.engine.name(), payment.id))?;

        let adjusted = self
            .threat_intel
            .adjust_payment_result(payment, base)
            .await
            .context("Threat intel adjustment failed for payment")?;

        // The recipient account is looked up as a wallet address; no IBAN
        // is split out of it.
        let known_destination = self
            .threat_intel
            .is_known_scam_payment_destination(None, Some(&payment.recipient_account))
            .await
            .context("Threat intel payment destination lookup failed")?;

        let escalated = escalate_for_known_destination(adjusted, known_destination);

        if let Err(e) = self.detection_log.log_payment_detection(payment, &escalated).await {
            warn!(detection_id = %escalated.id, error = ?e, "failed to log payment detection");
        }

        debug!(
            payment_id = %payment.id,
            amount = payment.amount.as_major_units(),
            currency = %payment.currency,
            risk = %escalated.risk_level,
            "payment evaluated"
        );

        Ok(escalated)
    }
}

/// A known-scam destination lifts anything below HIGH to HIGH/0.90.
pub fn escalate_for_known_destination(
    current: DetectionResult,
    known_destination: bool,
) -> DetectionResult {
    if !known_destination || current.risk_level >= RiskLevel::High {
        return current;
    }

    current.escalate(RiskLevel::High, 0.90, [ESCALATION_PAYMENT_DESTINATION_KNOWN_SCAM])
}
