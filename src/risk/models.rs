use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::models::UserId;

/// Severity of a single verdict or of an aggregated user view.
///
/// Ordering goes through [`RiskLevel::rank`] rather than declaration order,
/// so `Low < Medium < High < Critical` is an explicit, tested mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn rank(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::Critical => 4,
        }
    }

    /// Promote by one level, saturating at `Critical`.
    pub fn bump(self) -> Self {
        match self {
            RiskLevel::Low => RiskLevel::Medium,
            RiskLevel::Medium => RiskLevel::High,
            RiskLevel::High => RiskLevel::Critical,
            RiskLevel::Critical => RiskLevel::Critical,
        }
    }

    pub fn bump_times(self, times: usize) -> Self {
        (0..times).fold(self, |level, _| level.bump())
    }

    /// Highest level of the iterator, `None` when it is empty.
    pub fn max_of<I>(levels: I) -> Option<Self>
    where
        I: IntoIterator<Item = RiskLevel>,
    {
        levels.into_iter().max()
    }
}

impl Ord for RiskLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Pipeline that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetectionChannel {
    Call,
    Message,
    Payment,
    Device,
    Awareness,
}

impl DetectionChannel {
    pub const ALL: [DetectionChannel; 5] = [
        DetectionChannel::Call,
        DetectionChannel::Message,
        DetectionChannel::Payment,
        DetectionChannel::Device,
        DetectionChannel::Awareness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DetectionChannel::Call => "CALL",
            DetectionChannel::Message => "MESSAGE",
            DetectionChannel::Payment => "PAYMENT",
            DetectionChannel::Device => "DEVICE",
            DetectionChannel::Awareness => "AWARENESS",
        }
    }
}

impl fmt::Display for DetectionChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one observation on one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub channel: DetectionChannel,
    pub risk_level: RiskLevel,
    pub scam_type: Option<String>,
    #[serde(default)]
    pub attack_vectors: Vec<String>,
    pub confidence_score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

impl DetectionResult {
    pub fn new(
        id: impl Into<String>,
        user_id: UserId,
        created_at: DateTime<Utc>,
        channel: DetectionChannel,
        risk_level: RiskLevel,
        confidence_score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            user_id,
            created_at,
            channel,
            risk_level,
            scam_type: None,
            attack_vectors: Vec::new(),
            confidence_score,
            reasons: Vec::new(),
            recommendation: String::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_scam_type(mut self, scam_type: impl Into<String>) -> Self {
        self.scam_type = Some(scam_type.into());
        self
    }

    pub fn with_attack_vector(mut self, vector: impl Into<String>) -> Self {
        self.attack_vectors.push(vector.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }

    pub fn has_reason(&self, reason: &str) -> bool {
        self.reasons.iter().any(|r| r == reason)
    }

    /// Copy with the risk raised to at least `risk_level`, confidence floored
    /// at `confidence_floor` and `extra_reasons` appended to the audit trail.
    pub fn escalate<I, S>(&self, risk_level: RiskLevel, confidence_floor: f64, extra_reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut reasons = self.reasons.clone();
        reasons.extend(extra_reasons.into_iter().map(Into::into));

        Self {
            risk_level: self.risk_level.max(risk_level),
            confidence_score: self.confidence_score.max(confidence_floor),
            reasons,
            ..self.clone()
        }
    }
}

/// Cross-channel judgment for one user, recomputed on every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedUserRisk {
    pub user_id: UserId,
    pub risk_level: RiskLevel,
    pub confidence_score: f64,
    pub sources: Vec<DetectionResult>,
}

/// Multi-channel snapshot handed to the research export port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRiskSnapshot {
    pub user_id: UserId,
    pub global_risk_level: RiskLevel,
    pub global_confidence: f64,
    pub detections: Vec<DetectionResult>,
}

impl UserRiskSnapshot {
    pub fn from_aggregate(aggregated: &AggregatedUserRisk, detections: Vec<DetectionResult>) -> Self {
        Self {
            user_id: aggregated.user_id.clone(),
            global_risk_level: aggregated.risk_level,
            global_confidence: aggregated.confidence_score,
            detections,
        }
    }
}
