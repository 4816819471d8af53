use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::action::{DetectionLogRepository, ResearchExportPort, UserFeedbackRepository};
use crate::models::{DetectionFeedback, DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::risk::{DetectionChannel, DetectionResult, UserRiskSnapshot};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A logged verdict together with the id of the observation it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedDetection {
    pub channel: DetectionChannel,
    pub observation_id: String,
    pub result: DetectionResult,
}

#[derive(Debug, Default)]
pub struct InMemoryDetectionLog {
    entries: Mutex<Vec<LoggedDetection>>,
}

impl InMemoryDetectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LoggedDetection> {
        lock(&self.entries).clone()
    }

    fn record(&self, channel: DetectionChannel, observation_id: &str, result: &DetectionResult) {
        lock(&self.entries).push(LoggedDetection {
            channel,
            observation_id: observation_id.to_string(),
            result: result.clone(),
        });
    }
}

#[async_trait]
impl DetectionLogRepository for InMemoryDetectionLog {
    async fn log_message_detection(&self, message: &Message, result: &DetectionResult) -> Result<()> {
        self.record(DetectionChannel::Message, &message.id, result);
        Ok(())
    }

    async fn log_call_detection(&self, call: &PhoneCall, result: &DetectionResult) -> Result<()> {
        self.record(DetectionChannel::Call, &call.id, result);
        Ok(())
    }

    async fn log_payment_detection(
        &self,
        payment: &PaymentIntent,
        result: &DetectionResult,
    ) -> Result<()> {
        self.record(DetectionChannel::Payment, &payment.id, result);
        Ok(())
    }

    async fn log_device_detection(
        &self,
        snapshot: &DeviceSecuritySnapshot,
        result: &DetectionResult,
    ) -> Result<()> {
        self.record(DetectionChannel::Device, &snapshot.id, result);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryResearchExport {
    snapshots: Mutex<Vec<UserRiskSnapshot>>,
}

impl InMemoryResearchExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<UserRiskSnapshot> {
        lock(&self.snapshots).clone()
    }
}

#[async_trait]
impl ResearchExportPort for InMemoryResearchExport {
    async fn publish_user_risk_snapshot(&self, snapshot: &UserRiskSnapshot) -> Result<()> {
        lock(&self.snapshots).push(snapshot.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryFeedbackRepository {
    feedback: Mutex<Vec<DetectionFeedback>>,
}

impl InMemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<DetectionFeedback> {
        lock(&self.feedback).clone()
    }
}

#[async_trait]
impl UserFeedbackRepository for InMemoryFeedbackRepository {
    async fn save(&self, feedback: &DetectionFeedback) -> Result<()> {
        lock(&self.feedback).push(feedback.clone());
        Ok(())
    }
}
