mod aggregate;
mod models;

pub use aggregate::{AggregateUserRisk, AggregateUserRiskConfig, AggregationError};
pub use models::{
    AggregatedUserRisk, DetectionChannel, DetectionResult, RiskLevel, UserRiskSnapshot,
};
