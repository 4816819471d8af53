//! Fakes and fixtures shared by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::action::{DetectionLogRepository, ResearchExportPort};
use crate::models::{
    DeviceSecuritySnapshot, Message, MoneyAmount, PaymentIntent, PhoneCall, UserId,
};
use crate::pipeline::{
    CallScamDetector, DeviceThreatDetector, MessageScamDetector, PaymentRiskEngine,
};
use crate::risk::{DetectionChannel, DetectionResult, RiskLevel, UserRiskSnapshot};

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
}

/// Detector returning a fixed verdict for any observation, counting calls.
pub struct StaticDetector {
    risk: RiskLevel,
    confidence: f64,
    reasons: Vec<String>,
    calls: AtomicUsize,
}

impl StaticDetector {
    pub fn new(risk: RiskLevel, confidence: f64) -> Self {
        Self {
            risk,
            confidence,
            reasons: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reasons(mut self, reasons: &[&str]) -> Self {
        self.reasons = reasons.iter().map(|r| r.to_string()).collect();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn verdict(
        &self,
        observation_id: &str,
        user_id: &UserId,
        created_at: DateTime<Utc>,
        channel: DetectionChannel,
    ) -> DetectionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DetectionResult {
            reasons: self.reasons.clone(),
            recommendation: "monitor".to_string(),
            ..DetectionResult::new(
                format!("det-{}", observation_id),
                user_id.clone(),
                created_at,
                channel,
                self.risk,
                self.confidence,
            )
        }
    }
}

#[async_trait]
impl MessageScamDetector for StaticDetector {
    async fn analyze(&self, message: &Message) -> Result<DetectionResult> {
        Ok(self.verdict(&message.id, &message.user_id, message.received_at, DetectionChannel::Message))
    }
}

#[async_trait]
impl CallScamDetector for StaticDetector {
    async fn analyze(&self, call: &PhoneCall) -> Result<DetectionResult> {
        Ok(self.verdict(&call.id, &call.user_id, call.started_at, DetectionChannel::Call))
    }
}

#[async_trait]
impl PaymentRiskEngine for StaticDetector {
    async fn analyze(&self, payment: &PaymentIntent) -> Result<DetectionResult> {
        Ok(self.verdict(&payment.id, &payment.user_id, payment.created_at, DetectionChannel::Payment))
    }
}

#[async_trait]
impl DeviceThreatDetector for StaticDetector {
    async fn analyze(&self, snapshot: &DeviceSecuritySnapshot) -> Result<DetectionResult> {
        Ok(self.verdict(&snapshot.id, &snapshot.user_id, snapshot.captured_at, DetectionChannel::Device))
    }
}

pub struct FailingDetector;

#[async_trait]
impl CallScamDetector for FailingDetector {
    async fn analyze(&self, _call: &PhoneCall) -> Result<DetectionResult> {
        Err(anyhow!("call model unavailable"))
    }
}

pub struct FailingLog;

#[async_trait]
impl DetectionLogRepository for FailingLog {
    async fn log_message_detection(&self, _: &Message, _: &DetectionResult) -> Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn log_call_detection(&self, _: &PhoneCall, _: &DetectionResult) -> Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn log_payment_detection(&self, _: &PaymentIntent, _: &DetectionResult) -> Result<()> {
        Err(anyhow!("disk full"))
    }

    async fn log_device_detection(
        &self,
        _: &DeviceSecuritySnapshot,
        _: &DetectionResult,
    ) -> Result<()> {
        Err(anyhow!("disk full"))
    }
}

pub struct FailingExport;

#[async_trait]
impl ResearchExportPort for FailingExport {
    async fn publish_user_risk_snapshot(&self, _: &UserRiskSnapshot) -> Result<()> {
        Err(anyhow!("export queue closed"))
    }
}

pub fn message(user: &str, content: &str, source: Option<&str>) -> Message {
    Message {
        id: "msg-1".to_string(),
        user_id: UserId::new(user),
        content: content.to_string(),
        channel: DetectionChannel::Message,
        source: source.map(str::to_string),
        received_at: at(10, 0),
    }
}

pub fn call(user: &str, phone_number: &str) -> PhoneCall {
    PhoneCall {
        id: "call-1".to_string(),
        user_id: UserId::new(user),
        phone_number: phone_number.to_string(),
        started_at: at(10, 5),
        country_iso: Some("FR".to_string()),
        is_in_contacts: false,
        is_from_unknown_number: true,
    }
}

pub fn payment(user: &str, recipient_account: &str) -> PaymentIntent {
    PaymentIntent {
        id: "pay-1".to_string(),
        user_id: UserId::new(user),
        amount: MoneyAmount::from_minor_units(150_000),
        currency: "EUR".to_string(),
        recipient_account: recipient_account.to_string(),
        channel: "BANK_TRANSFER".to_string(),
        created_at: at(10, 10),
        metadata: HashMap::new(),
    }
}

pub fn clean_device(user: &str) -> DeviceSecuritySnapshot {
    DeviceSecuritySnapshot {
        id: "dev-1".to_string(),
        user_id: UserId::new(user),
        captured_at: at(10, 15),
        is_rooted_or_jailbroken: false,
        is_emulator: false,
        has_debuggable_build: false,
        has_suspicious_apps: false,
        integrity_check_passed: true,
    }
}
