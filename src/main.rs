use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use zeroscam_core::action::{
    HttpFeedbackRepository, HttpResearchExport, ResearchClient, ResearchExportPort,
    SharedResearchClient, UserFeedbackRepository,
};
use zeroscam_core::models::{FeedbackLabel, FeedbackOrigin, UserId};
use zeroscam_core::risk::{DetectionChannel, UserRiskSnapshot};
use zeroscam_core::{AggregateUserRisk, AppConfig, DetectionResult, FeedbackRequest, RecordUserFeedback};

#[derive(Parser)]
#[command(name = "zeroscam", version, about = "Scam risk aggregation and feedback tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate a JSON array of one user's detections
    Aggregate {
        #[arg(long)]
        input: PathBuf,
        /// Publish the resulting snapshot to the research backend
        #[arg(long)]
        export: bool,
    },
    /// Record feedback on a past detection
    Feedback {
        #[arg(long)]
        detection_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, value_parser = parse_wire::<DetectionChannel>)]
        channel: DetectionChannel,
        #[arg(long, value_parser = parse_wire::<FeedbackLabel>)]
        label: FeedbackLabel,
        #[arg(long)]
        is_scam: Option<bool>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long, value_parser = parse_wire::<FeedbackOrigin>, default_value = "END_USER")]
        origin: FeedbackOrigin,
    },
    /// Check the research backend
    Health,
}

/// Parses enum values in their wire form (`FALSE_POSITIVE`, `call`, ...).
fn parse_wire<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    let normalized = value.trim().replace('-', "_").to_uppercase();
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| format!("unknown value '{}'", value))
}

fn research_client(config: &AppConfig) -> Result<Option<SharedResearchClient>> {
    config
        .research_api_url
        .clone()
        .map(|url| ResearchClient::new(url, config.research_timeout).map(Arc::new))
        .transpose()
}

/// Feedback is only worth recording when it reaches the research backend.
fn feedback_repository(config: &AppConfig) -> Result<Arc<dyn UserFeedbackRepository>> {
    let client =
        research_client(config)?.ok_or_else(|| anyhow!("feedback requires RESEARCH_API_URL"))?;
    Ok(Arc::new(HttpFeedbackRepository::new(client)))
}

async fn aggregate(config: &AppConfig, input: PathBuf, export: bool) -> Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let detections: Vec<DetectionResult> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse detections from {}", input.display()))?;

    let aggregated = AggregateUserRisk::new(config.aggregate.clone())
        .aggregate(detections.clone())
        .context("Cannot aggregate detections")?;

    info!(
        user_id = %aggregated.user_id,
        risk = %aggregated.risk_level,
        confidence = aggregated.confidence_score,
        "aggregation complete"
    );

    if export {
        let client = research_client(config)?
            .ok_or_else(|| anyhow!("--export requires RESEARCH_API_URL"))?;
        let snapshot = UserRiskSnapshot::from_aggregate(&aggregated, detections);
        HttpResearchExport::new(client)
            .publish_user_risk_snapshot(&snapshot)
            .await?;
    }

    println!("{}", serde_json::to_string_pretty(&aggregated)?);
    Ok(())
}

async fn health(config: &AppConfig) -> Result<()> {
    let client =
        research_client(config)?.ok_or_else(|| anyhow!("health requires RESEARCH_API_URL"))?;

    let response = client.health().await?;
    info!(base_url = %client.base_url(), status = %response.status, "research backend reachable");
    println!("{}", response.status);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zeroscam_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Aggregate { input, export } => aggregate(&config, input, export).await,
        Command::Feedback {
            detection_id,
            user_id,
            channel,
            label,
            is_scam,
            comment,
            origin,
        } => {
            let repository = feedback_repository(&config)?;

            let mut request =
                FeedbackRequest::new(detection_id, UserId::new(user_id), channel, label)
                    .with_origin(origin);
            request.is_scam = is_scam;
            request.comment = comment;

            let feedback = RecordUserFeedback::new(repository).run(request).await?;
            println!("{}", serde_json::to_string_pretty(&feedback)?);
            Ok(())
        }
        Command::Health => health(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_without_backend_is_rejected() {
        let err = feedback_repository(&AppConfig::default()).err().expect("missing backend");
        assert!(err.to_string().contains("RESEARCH_API_URL"));
    }

    #[test]
    fn test_feedback_with_backend_uses_http_repository() {
        let config = AppConfig {
            research_api_url: Some("http://127.0.0.1:9".parse().unwrap()),
            ..AppConfig::default()
        };
        assert!(feedback_repository(&config).is_ok());
    }

    #[test]
    fn test_parse_wire_accepts_lowercase_and_dashes() {
        assert_eq!(parse_wire::<FeedbackLabel>("false-positive"), Ok(FeedbackLabel::FalsePositive));
        assert_eq!(parse_wire::<DetectionChannel>("call"), Ok(DetectionChannel::Call));
        assert!(parse_wire::<FeedbackOrigin>("robot").is_err());
    }
}
