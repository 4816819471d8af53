use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::UserId;
use crate::risk::DetectionChannel;

/// Outcome category attached to a feedback entry.
///
/// Read together with `is_scam`: `Some(true)` means the case was fraudulent,
/// `Some(false)` legitimate, `None` that the reporter could not tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackLabel {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
    Unknown,
    /// Confirmed fraud whose signal combination the engine does not cover.
    NewScamPattern,
    BorderlineButSafe,
    /// Legitimate activity blocked with real user impact.
    Overblocking,
    /// Fraud left through or under-rated.
    Underblocking,
    SuspiciousButUnconfirmed,
}

impl FeedbackLabel {
    pub const ALL: [FeedbackLabel; 10] = [
        FeedbackLabel::TruePositive,
        FeedbackLabel::FalsePositive,
        FeedbackLabel::TrueNegative,
        FeedbackLabel::FalseNegative,
        FeedbackLabel::Unknown,
        FeedbackLabel::NewScamPattern,
        FeedbackLabel::BorderlineButSafe,
        FeedbackLabel::Overblocking,
        FeedbackLabel::Underblocking,
        FeedbackLabel::SuspiciousButUnconfirmed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackLabel::TruePositive => "TRUE_POSITIVE",
            FeedbackLabel::FalsePositive => "FALSE_POSITIVE",
            FeedbackLabel::TrueNegative => "TRUE_NEGATIVE",
            FeedbackLabel::FalseNegative => "FALSE_NEGATIVE",
            FeedbackLabel::Unknown => "UNKNOWN",
            FeedbackLabel::NewScamPattern => "NEW_SCAM_PATTERN",
            FeedbackLabel::BorderlineButSafe => "BORDERLINE_BUT_SAFE",
            FeedbackLabel::Overblocking => "OVERBLOCKING",
            FeedbackLabel::Underblocking => "UNDERBLOCKING",
            FeedbackLabel::SuspiciousButUnconfirmed => "SUSPICIOUS_BUT_UNCONFIRMED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackOrigin {
    #[default]
    EndUser,
    Analyst,
    Automated,
}

impl FeedbackOrigin {
    pub const ALL: [FeedbackOrigin; 3] = [
        FeedbackOrigin::EndUser,
        FeedbackOrigin::Analyst,
        FeedbackOrigin::Automated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackOrigin::EndUser => "END_USER",
            FeedbackOrigin::Analyst => "ANALYST",
            FeedbackOrigin::Automated => "AUTOMATED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFeedback {
    pub detection_id: String,
    pub user_id: UserId,
    pub channel: DetectionChannel,
    pub is_scam: Option<bool>,
    pub label: FeedbackLabel,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_at_epoch_seconds: i64,
    #[serde(default)]
    pub origin: FeedbackOrigin,
    pub metadata: Option<HashMap<String, String>>,
}
