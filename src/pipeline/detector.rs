use anyhow::Result;
use async_trait::async_trait;

use crate::models::{DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::risk::DetectionResult;

// Base-score engines. Each one is a black box (ML model, rules, remote
// service) returning the initial verdict for its channel; a failure is a
// hard fault and is never retried here.

#[async_trait]
pub trait MessageScamDetector: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn analyze(&self, message: &Message) -> Result<DetectionResult>;
}

#[async_trait]
pub trait CallScamDetector: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn analyze(&self, call: &PhoneCall) -> Result<DetectionResult>;
}

#[async_trait]
pub trait PaymentRiskEngine: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn analyze(&self, payment: &PaymentIntent) -> Result<DetectionResult>;
}

#[async_trait]
pub trait DeviceThreatDetector: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    async fn analyze(&self, snapshot: &DeviceSecuritySnapshot) -> Result<DetectionResult>;
}
