use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DetectionFeedback, DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::risk::{DetectionResult, UserRiskSnapshot};

/// Audit sink for final verdicts. Callers report a failure and move on; a
/// logging problem never changes a detection decision.
#[async_trait]
pub trait DetectionLogRepository: Send + Sync {
    async fn log_message_detection(&self, message: &Message, result: &DetectionResult) -> Result<()>;

    async fn log_call_detection(&self, call: &PhoneCall, result: &DetectionResult) -> Result<()>;

    async fn log_payment_detection(
        &self,
        payment: &PaymentIntent,
        result: &DetectionResult,
    ) -> Result<()>;

    async fn log_device_detection(
        &self,
        snapshot: &DeviceSecuritySnapshot,
        result: &DetectionResult,
    ) -> Result<()>;
}

/// Outbound port towards the research / analytics backend.
#[async_trait]
pub trait ResearchExportPort: Send + Sync {
    async fn publish_user_risk_snapshot(&self, snapshot: &UserRiskSnapshot) -> Result<()>;
}

#[async_trait]
pub trait UserFeedbackRepository: Send + Sync {
    async fn save(&self, feedback: &DetectionFeedback) -> Result<()>;
}
