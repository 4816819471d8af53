//! Multi-channel scam detection core: per-channel verdicts with
//! deterministic escalation, cross-channel aggregation per user, and
//! research feedback.

pub mod action;
pub mod config;
pub mod feedback;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod risk;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use feedback::{FeedbackRequest, RecordUserFeedback};
pub use orchestrator::{
    build_orchestrator, Collaborators, OrchestrationRequest, OrchestrationResult,
    ZeroScamOrchestrator,
};
pub use risk::{AggregateUserRisk, AggregatedUserRisk, DetectionResult, RiskLevel};
