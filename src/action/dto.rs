//! Wire schema of the research backend, version 1.
//!
//! Every field is mapped explicitly from the domain types; when the domain
//! evolves, bump [`SCHEMA_VERSION`] instead of probing fields at runtime.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::DetectionFeedback;
use crate::risk::{DetectionResult, UserRiskSnapshot};

pub const SCHEMA_VERSION: &str = "v1";

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRiskSnapshotDto {
    pub schema_version: String,
    pub snapshot_id: String,
    pub user_id: String,
    pub created_at: String,
    pub global_risk_level: String,
    pub global_confidence: f64,
    pub detections: Vec<DetectionResultDto>,
}

impl UserRiskSnapshotDto {
    pub fn from_domain(snapshot: &UserRiskSnapshot, created_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            snapshot_id: format!("snap-{}", Uuid::new_v4()),
            user_id: snapshot.user_id.to_string(),
            created_at: rfc3339(created_at),
            global_risk_level: snapshot.global_risk_level.to_string(),
            global_confidence: snapshot.global_confidence,
            detections: snapshot.detections.iter().map(DetectionResultDto::from_domain).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResultDto {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub channel: String,
    pub risk_level: String,
    pub scam_type: Option<String>,
    pub attack_vectors: Vec<String>,
    pub confidence_score: f64,
    pub reasons: Vec<String>,
    pub recommendation: String,
}

impl DetectionResultDto {
    pub fn from_domain(result: &DetectionResult) -> Self {
        Self {
            id: result.id.clone(),
            user_id: result.user_id.to_string(),
            created_at: rfc3339(result.created_at),
            channel: result.channel.to_string(),
            risk_level: result.risk_level.to_string(),
            scam_type: result.scam_type.clone(),
            attack_vectors: result.attack_vectors.clone(),
            confidence_score: result.confidence_score,
            reasons: result.reasons.clone(),
            recommendation: result.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFeedbackDto {
    pub schema_version: String,
    pub detection_id: String,
    pub user_id: String,
    pub channel: String,
    pub is_scam: Option<bool>,
    pub label: String,
    pub comment: Option<String>,
    pub created_at: String,
    pub created_at_epoch_seconds: i64,
    pub origin: String,
    pub metadata: Option<HashMap<String, String>>,
}

impl DetectionFeedbackDto {
    pub fn from_domain(feedback: &DetectionFeedback) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            detection_id: feedback.detection_id.clone(),
            user_id: feedback.user_id.to_string(),
            channel: feedback.channel.to_string(),
            is_scam: feedback.is_scam,
            label: feedback.label.as_str().to_string(),
            comment: feedback.comment.clone(),
            created_at: rfc3339(feedback.created_at),
            created_at_epoch_seconds: feedback.created_at_epoch_seconds,
            origin: feedback.origin.as_str().to_string(),
            metadata: feedback.metadata.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchSnapshotResponseDto {
    pub status: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponseDto {
    pub status: String,
    #[serde(default)]
    pub feedback_id: Option<String>,
    #[serde(default)]
    pub detection_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthResponseDto {
    pub status: String,
}
