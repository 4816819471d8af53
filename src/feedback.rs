use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::action::UserFeedbackRepository;
use crate::models::{DetectionFeedback, FeedbackLabel, FeedbackOrigin, UserId};
use crate::risk::DetectionChannel;

pub const MAX_COMMENT_CHARS: usize = 1000;

/// Raw feedback as reported by a user, an analyst or an automated job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackRequest {
    pub detection_id: String,
    pub user_id: UserId,
    pub channel: DetectionChannel,
    #[serde(default)]
    pub is_scam: Option<bool>,
    pub label: FeedbackLabel,
    #[serde(default)]
    pub comment: Option<String>,
    /// Defaults to the recording time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub origin: FeedbackOrigin,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl FeedbackRequest {
    pub fn new(
        detection_id: impl Into<String>,
        user_id: UserId,
        channel: DetectionChannel,
        label: FeedbackLabel,
    ) -> Self {
        Self {
            detection_id: detection_id.into(),
            user_id,
            channel,
            is_scam: None,
            label,
            comment: None,
            created_at: None,
            origin: FeedbackOrigin::default(),
            metadata: None,
        }
    }

    pub fn with_is_scam(mut self, is_scam: bool) -> Self {
        self.is_scam = Some(is_scam);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_origin(mut self, origin: FeedbackOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Normalizes a feedback report and hands it to the repository.
pub struct RecordUserFeedback {
    repository: Arc<dyn UserFeedbackRepository>,
}

impl RecordUserFeedback {
    pub fn new(repository: Arc<dyn UserFeedbackRepository>) -> Self {
        Self { repository }
    }

    pub async fn run(&self, request: FeedbackRequest) -> Result<DetectionFeedback> {
        let created_at = request.created_at.unwrap_or_else(Utc::now);

        let feedback = DetectionFeedback {
            detection_id: request.detection_id,
            user_id: request.user_id,
            channel: request.channel,
            is_scam: request.is_scam,
            label: request.label,
            comment: normalize_comment(request.comment),
            created_at,
            created_at_epoch_seconds: created_at.timestamp(),
            origin: request.origin,
            metadata: request.metadata,
        };

        self.repository
            .save(&feedback)
            .await
            .with_context(|| format!("Failed to save feedback for {}", feedback.detection_id))?;

        info!(
            detection_id = %feedback.detection_id,
            user_id = %feedback.user_id,
            channel = %feedback.channel,
            label = ?feedback.label,
            "feedback recorded"
        );

        Ok(feedback)
    }
}

/// Blank comments are dropped, long ones cut to [`MAX_COMMENT_CHARS`].
fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.chars().take(MAX_COMMENT_CHARS).collect())
}
