use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::action::DetectionLogRepository;
use crate::models::{DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::risk::{DetectionResult, RiskLevel};

/// Emits one structured `tracing` event per final verdict.
///
/// HIGH and CRITICAL verdicts go out at `warn`, the rest at `info`.
pub struct TracingDetectionLog;

impl TracingDetectionLog {
    pub fn new() -> Self {
        Self
    }

    fn emit(&self, observation_id: &str, result: &DetectionResult) {
        let reasons = result.reasons.join(",");

        if result.risk_level >= RiskLevel::High {
            warn!(
                detection_id = %result.id,
                observation_id,
                user_id = %result.user_id,
                channel = %result.channel,
                risk = %result.risk_level,
                confidence = result.confidence_score,
                reasons = %reasons,
                "risky detection"
            );
        } else {
            info!(
                detection_id = %result.id,
                observation_id,
                user_id = %result.user_id,
                channel = %result.channel,
                risk = %result.risk_level,
                confidence = result.confidence_score,
                reasons = %reasons,
                "detection"
            );
        }
    }
}

#[async_trait]
impl DetectionLogRepository for TracingDetectionLog {
    async fn log_message_detection(&self, message: &Message, result: &DetectionResult) -> Result<()> {
        self.emit(&message.id, result);
        Ok(())
    }

    async fn log_call_detection(&self, call: &PhoneCall, result: &DetectionResult) -> Result<()> {
        self.emit(&call.id, result);
        Ok(())
    }

    async fn log_payment_detection(
        &self,
        payment: &PaymentIntent,
        result: &DetectionResult,
    ) -> Result<()> {
        self.emit(&payment.id, result);
        Ok(())
    }

    async fn log_device_detection(
        &self,
        snapshot: &DeviceSecuritySnapshot,
        result: &DetectionResult,
    ) -> Result<()> {
        self.emit(&snapshot.id, result);
        Ok(())
    }
}

impl Default for TracingDetectionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{call, StaticDetector};
    use crate::pipeline::CallScamDetector;

    #[tokio::test]
    async fn test_logging_never_fails() {
        let log = TracingDetectionLog::default();
        let call = call("user-1", "+33612345678");

        for level in RiskLevel::ALL {
            let result = StaticDetector::new(level, 0.5).analyze(&call).await.unwrap();
            assert!(log.log_call_detection(&call, &result).await.is_ok());
        }
    }
}
