use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::action::{DetectionLogRepository, ResearchExportPort};
use crate::models::{DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::pipeline::{
    AnalyzeIncomingCall, AnalyzeIncomingMessage, CallScamDetector, DeviceThreatDetector,
    EvaluateDeviceSecurityState, EvaluatePaymentIntent, MessageScamDetector, PaymentRiskEngine,
    ThreatIntelRepository,
};
use crate::risk::{
    AggregateUserRisk, AggregateUserRiskConfig, AggregatedUserRisk, DetectionResult,
    UserRiskSnapshot,
};

/// Observations gathered for one user in one orchestration pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub message: Option<Message>,
    pub call: Option<PhoneCall>,
    pub payment_intent: Option<PaymentIntent>,
    pub device_snapshot: Option<DeviceSecuritySnapshot>,
}

impl OrchestrationRequest {
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.call.is_none()
            && self.payment_intent.is_none()
            && self.device_snapshot.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestrationResult {
    /// Absent when the request carried no observation.
    pub aggregated_user_risk: Option<AggregatedUserRisk>,
    pub message_detection: Option<DetectionResult>,
    pub call_detection: Option<DetectionResult>,
    pub payment_detection: Option<DetectionResult>,
    pub device_detection: Option<DetectionResult>,
}

/// Every collaborator the detection core depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub message_detector: Arc<dyn MessageScamDetector>,
    pub call_detector: Arc<dyn CallScamDetector>,
    pub payment_engine: Arc<dyn PaymentRiskEngine>,
    pub device_detector: Arc<dyn DeviceThreatDetector>,
    pub threat_intel: Arc<dyn ThreatIntelRepository>,
    pub detection_log: Arc<dyn DetectionLogRepository>,
    pub research_export: Arc<dyn ResearchExportPort>,
}

/// Builds a ready orchestrator from explicit collaborators.
pub fn build_orchestrator(
    collaborators: Collaborators,
    config: AggregateUserRiskConfig,
) -> ZeroScamOrchestrator {
    let Collaborators {
        message_detector,
        call_detector,
        payment_engine,
        device_detector,
        threat_intel,
        detection_log,
        research_export,
    } = collaborators;

    ZeroScamOrchestrator {
        message: AnalyzeIncomingMessage::new(
            message_detector,
            threat_intel.clone(),
            detection_log.clone(),
        ),
        call: AnalyzeIncomingCall::new(call_detector, threat_intel.clone(), detection_log.clone()),
        payment: EvaluatePaymentIntent::new(
            payment_engine,
            threat_intel.clone(),
            detection_log.clone(),
        ),
        device: EvaluateDeviceSecurityState::new(device_detector, threat_intel, detection_log),
        aggregator: AggregateUserRisk::new(config),
        research_export,
    }
}

/// Fans a request out to the channel use cases (message, call, payment,
/// device, in that order), aggregates what came back and publishes the
/// snapshot. A failing channel aborts the whole pass.
pub struct ZeroScamOrchestrator {
    message: AnalyzeIncomingMessage,
    call: AnalyzeIncomingCall,
    payment: EvaluatePaymentIntent,
    device: EvaluateDeviceSecurityState,
    aggregator: AggregateUserRisk,
    research_export: Arc<dyn ResearchExportPort>,
}

impl ZeroScamOrchestrator {
    pub fn new(
        message: AnalyzeIncomingMessage,
        call: AnalyzeIncomingCall,
        payment: EvaluatePaymentIntent,
        device: EvaluateDeviceSecurityState,
        aggregator: AggregateUserRisk,
        research_export: Arc<dyn ResearchExportPort>,
    ) -> Self {
        Self {
            message,
            call,
            payment,
            device,
            aggregator,
            research_export,
        }
    }

    pub async fn run(&self, request: &OrchestrationRequest) -> Result<OrchestrationResult> {
        let message_detection = match &request.message {
            Some(message) => Some(self.message.run(message).await?),
            None => None,
        };
        let call_detection = match &request.call {
            Some(call) => Some(self.call.run(call).await?),
            None => None,
        };
        let payment_detection = match &request.payment_intent {
            Some(payment) => Some(self.payment.run(payment).await?),
            None => None,
        };
        let device_detection = match &request.device_snapshot {
            Some(snapshot) => Some(self.device.run(snapshot).await?),
            None => None,
        };

        let detections: Vec<DetectionResult> = [
            &message_detection,
            &call_detection,
            &payment_detection,
            &device_detection,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        if detections.is_empty() {
            return Ok(OrchestrationResult {
                aggregated_user_risk: None,
                message_detection,
                call_detection,
                payment_detection,
                device_detection,
            });
        }

        let aggregated = self
            .aggregator
            .aggregate(detections.clone())
            .context("Cannot aggregate orchestration detections")?;

        let snapshot = UserRiskSnapshot::from_aggregate(&aggregated, detections);
        self.research_export
            .publish_user_risk_snapshot(&snapshot)
            .await
            .context("Failed to export user risk snapshot")?;

        info!(
            user_id = %aggregated.user_id,
            risk = %aggregated.risk_level,
            confidence = aggregated.confidence_score,
            sources = aggregated.sources.len(),
            "user risk aggregated"
        );

        Ok(OrchestrationResult {
            aggregated_user_risk: Some(aggregated),
            message_detection,
            call_detection,
            payment_detection,
            device_detection,
        })
    }
}
