use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::action::dto::{
    DetectionFeedbackDto, FeedbackResponseDto, HealthResponseDto, ResearchSnapshotResponseDto,
    UserRiskSnapshotDto,
};
use crate::action::{ResearchExportPort, UserFeedbackRepository};
use crate::models::DetectionFeedback;
use crate::risk::UserRiskSnapshot;

const SNAPSHOTS_PATH: &str = "/v1/research/user-risk-snapshots";
const FEEDBACK_PATH: &str = "/v1/research/feedback";
const HEALTH_PATH: &str = "/health/db";

/// Thin JSON client for the research backend.
pub struct ResearchClient {
    http: reqwest::Client,
    base_url: Url,
}

pub type SharedResearchClient = Arc<ResearchClient>;

impl ResearchClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build research HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid research endpoint {}", path))
    }

    pub async fn post_user_risk_snapshot(
        &self,
        dto: &UserRiskSnapshotDto,
    ) -> Result<ResearchSnapshotResponseDto> {
        let url = self.endpoint(SNAPSHOTS_PATH)?;
        self.http
            .post(url)
            .json(dto)
            .send()
            .await
            .context("Failed to send user risk snapshot")?
            .error_for_status()
            .context("Research backend rejected user risk snapshot")?
            .json()
            .await
            .context("Failed to parse snapshot response")
    }

    pub async fn post_feedback(&self, dto: &DetectionFeedbackDto) -> Result<FeedbackResponseDto> {
        let url = self.endpoint(FEEDBACK_PATH)?;
        self.http
            .post(url)
            .json(dto)
            .send()
            .await
            .context("Failed to send detection feedback")?
            .error_for_status()
            .context("Research backend rejected detection feedback")?
            .json()
            .await
            .context("Failed to parse feedback response")
    }

    pub async fn health(&self) -> Result<HealthResponseDto> {
        let url = self.endpoint(HEALTH_PATH)?;
        self.http
            .get(url)
            .send()
            .await
            .context("Failed to reach research backend")?
            .error_for_status()
            .context("Research backend health check failed")?
            .json()
            .await
            .context("Failed to parse health response")
    }
}

/// Publishes snapshots over HTTP. Transport errors are logged and dropped:
/// a lost snapshot must not abort the detection that produced it.
pub struct HttpResearchExport {
    client: SharedResearchClient,
}

impl HttpResearchExport {
    pub fn new(client: SharedResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResearchExportPort for HttpResearchExport {
    async fn publish_user_risk_snapshot(&self, snapshot: &UserRiskSnapshot) -> Result<()> {
        let dto = UserRiskSnapshotDto::from_domain(snapshot, Utc::now());

        match self.client.post_user_risk_snapshot(&dto).await {
            Ok(response) => debug!(
                snapshot_id = %dto.snapshot_id,
                user_id = %dto.user_id,
                detections = dto.detections.len(),
                status = %response.status,
                "user risk snapshot published"
            ),
            Err(e) => warn!(
                snapshot_id = %dto.snapshot_id,
                user_id = %dto.user_id,
                error = ?e,
                "failed to publish user risk snapshot"
            ),
        }

        Ok(())
    }
}

/// Sends feedback to the research backend, with the same drop-on-failure
/// policy as [`HttpResearchExport`].
pub struct HttpFeedbackRepository {
    client: SharedResearchClient,
}

impl HttpFeedbackRepository {
    pub fn new(client: SharedResearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserFeedbackRepository for HttpFeedbackRepository {
    async fn save(&self, feedback: &DetectionFeedback) -> Result<()> {
        let dto = DetectionFeedbackDto::from_domain(feedback);

        match self.client.post_feedback(&dto).await {
            Ok(response) => debug!(
                detection_id = %dto.detection_id,
                user_id = %dto.user_id,
                channel = %dto.channel,
                feedback_id = ?response.feedback_id,
                "detection feedback posted"
            ),
            Err(e) => warn!(
                detection_id = %dto.detection_id,
                user_id = %dto.user_id,
                error = ?e,
                "failed to post detection feedback"
            ),
        }

        Ok(())
    }
}
