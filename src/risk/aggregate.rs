use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;

use crate::models::UserId;
use crate::risk::{AggregatedUserRisk, DetectionChannel, DetectionResult, RiskLevel};

#[derive(Debug, Error, PartialEq)]
pub enum AggregationError {
    #[error("detections must not be empty")]
    EmptyBatch,

    #[error("all detections must belong to the same user id, but found: {found:?}")]
    MixedUsers { found: Vec<String> },
}

/// Tuning knobs of the cross-channel aggregator.
///
/// Defaults reproduce the production heuristics; every field can be
/// overridden from a JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateUserRiskConfig {
    /// Weight of a HIGH/CRITICAL detection in the multi-HIGH score.
    /// Channels missing from the map weigh 1.0.
    pub channel_weights: HashMap<DetectionChannel, f64>,
    pub multi_high_score_threshold: f64,
    pub min_confidence_multi_high: f64,
    pub min_confidence_multi_channel: f64,
    pub min_confidence_all_low_multi_channel: f64,
}

impl AggregateUserRiskConfig {
    pub fn channel_weight(&self, channel: DetectionChannel) -> f64 {
        self.channel_weights.get(&channel).copied().unwrap_or(1.0)
    }
}

impl Default for AggregateUserRiskConfig {
    fn default() -> Self {
        Self {
            channel_weights: DetectionChannel::ALL.iter().map(|c| (*c, 1.0)).collect(),
            multi_high_score_threshold: 2.0,
            min_confidence_multi_high: 0.95,
            min_confidence_multi_channel: 0.90,
            min_confidence_all_low_multi_channel: 0.70,
        }
    }
}

/// Combines same-user detections into one [`AggregatedUserRisk`].
///
/// Heuristics, evaluated in order on top of the max risk / max confidence
/// baseline:
///  - a lone detection is propagated as-is (confidence clamped);
///  - multi-HIGH: weighted HIGH/CRITICAL score over the threshold, or any
///    CRITICAL, bumps once and floors confidence;
///  - multi-channel: 3+ distinct channels with something at MEDIUM or above
///    bumps again;
///  - all-LOW: only LOW verdicts over 2+ channels lifts the view to MEDIUM.
#[derive(Debug, Clone, Default)]
pub struct AggregateUserRisk {
    config: AggregateUserRiskConfig,
}

impl AggregateUserRisk {
    pub fn new(config: AggregateUserRiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregateUserRiskConfig {
        &self.config
    }

    pub fn aggregate(
        &self,
        detections: Vec<DetectionResult>,
    ) -> Result<AggregatedUserRisk, AggregationError> {
        let user_id = Self::single_user(&detections)?;

        let mut sources = detections;
        // Stable: equal timestamps keep their submission order.
        sources.sort_by_key(|d| d.created_at);

        let max_risk = RiskLevel::max_of(sources.iter().map(|d| d.risk_level))
            .ok_or(AggregationError::EmptyBatch)?;
        let max_confidence = sources
            .iter()
            .map(|d| d.confidence_score)
            .fold(f64::NEG_INFINITY, f64::max);

        if sources.len() == 1 {
            return Ok(AggregatedUserRisk {
                user_id,
                risk_level: max_risk,
                confidence_score: clamp_confidence(max_confidence),
                sources,
            });
        }

        let distinct_channels: HashSet<DetectionChannel> =
            sources.iter().map(|d| d.channel).collect();

        let high_or_above: Vec<&DetectionResult> = sources
            .iter()
            .filter(|d| d.risk_level >= RiskLevel::High)
            .collect();
        let high_score: f64 = high_or_above
            .iter()
            .map(|d| self.config.channel_weight(d.channel))
            .sum();
        let critical_count = sources
            .iter()
            .filter(|d| d.risk_level == RiskLevel::Critical)
            .count();

        let mut risk = max_risk;
        let mut confidence = max_confidence;

        let multi_high =
            high_score >= self.config.multi_high_score_threshold || critical_count >= 1;
        if multi_high {
            risk = risk.bump();
            confidence = confidence.max(self.config.min_confidence_multi_high);
        }

        let multi_channel = distinct_channels.len() >= 3
            && sources.iter().any(|d| d.risk_level >= RiskLevel::Medium);
        if multi_channel {
            risk = risk.bump();
            confidence = confidence.max(self.config.min_confidence_multi_channel);
        }

        let all_low = sources.iter().all(|d| d.risk_level == RiskLevel::Low);
        if all_low && distinct_channels.len() >= 2 {
            risk = RiskLevel::Medium;
            confidence = confidence.max(self.config.min_confidence_all_low_multi_channel);
        }

        debug!(
            user_id = %user_id,
            sources = sources.len(),
            channels = distinct_channels.len(),
            high_score,
            critical_count,
            multi_high,
            multi_channel,
            all_low,
            risk = %risk,
            "aggregated user risk"
        );

        Ok(AggregatedUserRisk {
            user_id,
            risk_level: risk,
            confidence_score: clamp_confidence(confidence),
            sources,
        })
    }

    fn single_user(detections: &[DetectionResult]) -> Result<UserId, AggregationError> {
        let first = detections.first().ok_or(AggregationError::EmptyBatch)?;

        if detections.iter().any(|d| d.user_id != first.user_id) {
            let mut found: Vec<String> = detections
                .iter()
                .map(|d| d.user_id.to_string())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            found.sort();
            return Err(AggregationError::MixedUsers { found });
        }

        Ok(first.user_id.clone())
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn detection(
        id: &str,
        channel: DetectionChannel,
        risk: RiskLevel,
        confidence: f64,
        offset_secs: i64,
    ) -> DetectionResult {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        DetectionResult::new(
            id,
            UserId::new("user-1"),
            base + Duration::seconds(offset_secs),
            channel,
            risk,
            confidence,
        )
    }

    #[test]
    fn test_rejects_empty_batch() {
        let aggregator = AggregateUserRisk::default();
        assert_eq!(aggregator.aggregate(Vec::new()), Err(AggregationError::EmptyBatch));
    }

    #[test]
    fn test_rejects_mixed_users() {
        let aggregator = AggregateUserRisk::default();
        let mut other = detection("d2", DetectionChannel::Call, RiskLevel::Low, 0.2, 1);
        other.user_id = UserId::new("user-2");

        let err = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Low, 0.1, 0),
                other,
            ])
            .unwrap_err();

        assert_eq!(
            err,
            AggregationError::MixedUsers {
                found: vec!["user-1".to_string(), "user-2".to_string()]
            }
        );
    }

    #[test]
    fn test_single_source_is_propagated_with_clamped_confidence() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![detection("d1", DetectionChannel::Device, RiskLevel::Critical, 1.4, 0)])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.confidence_score, 1.0);
        assert_eq!(result.sources.len(), 1);

        let low = aggregator
            .aggregate(vec![detection("d2", DetectionChannel::Call, RiskLevel::Low, -0.3, 0)])
            .unwrap();
        assert_eq!(low.risk_level, RiskLevel::Low);
        assert_eq!(low.confidence_score, 0.0);
    }

    #[test]
    fn test_multi_high_across_message_and_call_reaches_critical() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Medium, 0.7, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::High, 0.9, 1),
                detection("d3", DetectionChannel::Call, RiskLevel::High, 0.85, 2),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert!(result.confidence_score >= 0.95);
        assert_eq!(result.sources.len(), 3);
    }

    #[test]
    fn test_all_low_on_two_channels_lifts_to_medium() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Low, 0.4, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::Low, 0.5, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.confidence_score, 0.70);
    }

    #[test]
    fn test_all_low_on_single_channel_stays_low() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Call, RiskLevel::Low, 0.4, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::Low, 0.3, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Low);
        assert_eq!(result.confidence_score, 0.4);
    }

    #[test]
    fn test_two_high_with_overshooting_confidence_is_clamped() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::High, 1.2, 0),
                detection("d2", DetectionChannel::Payment, RiskLevel::High, 0.8, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.confidence_score, 1.0);
    }

    #[test]
    fn test_single_critical_triggers_multi_high_bump() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Device, RiskLevel::Critical, 0.6, 0),
                detection("d2", DetectionChannel::Device, RiskLevel::Low, 0.2, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.confidence_score, 0.95);
    }

    #[test]
    fn test_multi_channel_medium_bumps_once() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Medium, 0.5, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::Low, 0.3, 1),
                detection("d3", DetectionChannel::Payment, RiskLevel::Low, 0.2, 2),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.confidence_score, 0.90);
    }

    #[test]
    fn test_multi_high_and_multi_channel_compound() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Medium, 0.5, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::High, 0.6, 1),
                detection("d3", DetectionChannel::Payment, RiskLevel::Medium, 0.4, 2),
            ])
            .unwrap();

        // One HIGH weighs 1.0 < 2.0: only the multi-channel bump applies.
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.confidence_score, 0.90);

        let weighted = AggregateUserRisk::new(AggregateUserRiskConfig {
            channel_weights: HashMap::from([(DetectionChannel::Call, 2.0)]),
            ..AggregateUserRiskConfig::default()
        });
        let result = weighted
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Low, 0.5, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::Medium, 0.6, 1),
                detection("d3", DetectionChannel::Call, RiskLevel::High, 0.4, 2),
                detection("d4", DetectionChannel::Payment, RiskLevel::Low, 0.4, 3),
            ])
            .unwrap();

        // Weighted CALL HIGH reaches the threshold, then the 3-channel bump.
        assert_eq!(result.risk_level, RiskLevel::Critical);
        assert_eq!(result.confidence_score, 0.95);
    }

    #[test]
    fn test_channel_weight_below_threshold_skips_multi_high() {
        let aggregator = AggregateUserRisk::new(AggregateUserRiskConfig {
            channel_weights: HashMap::from([(DetectionChannel::Message, 0.5)]),
            ..AggregateUserRiskConfig::default()
        });

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::High, 0.7, 0),
                detection("d2", DetectionChannel::Message, RiskLevel::High, 0.8, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.confidence_score, 0.8);
    }

    #[test]
    fn test_all_low_pattern_settles_on_medium_with_zero_threshold() {
        // A zero threshold fires multi-HIGH on any batch; all-LOW then pins
        // the level back to MEDIUM.
        let aggregator = AggregateUserRisk::new(AggregateUserRiskConfig {
            multi_high_score_threshold: 0.0,
            ..AggregateUserRiskConfig::default()
        });

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Message, RiskLevel::Low, 0.1, 0),
                detection("d2", DetectionChannel::Call, RiskLevel::Low, 0.2, 1),
                detection("d3", DetectionChannel::Payment, RiskLevel::Low, 0.3, 2),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.confidence_score, 0.95);
    }

    #[test]
    fn test_zero_threshold_bumps_medium_batch() {
        let aggregator = AggregateUserRisk::new(AggregateUserRiskConfig {
            multi_high_score_threshold: 0.0,
            ..AggregateUserRiskConfig::default()
        });

        let result = aggregator
            .aggregate(vec![
                detection("d1", DetectionChannel::Call, RiskLevel::Medium, 0.3, 0),
                detection("d2", DetectionChannel::Message, RiskLevel::Medium, 0.2, 1),
            ])
            .unwrap();

        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.confidence_score, 0.95);
    }

    #[test]
    fn test_sources_are_sorted_by_creation_time() {
        let aggregator = AggregateUserRisk::default();

        let result = aggregator
            .aggregate(vec![
                detection("late", DetectionChannel::Message, RiskLevel::Low, 0.1, 30),
                detection("early", DetectionChannel::Call, RiskLevel::Low, 0.1, 0),
                detection("middle", DetectionChannel::Device, RiskLevel::Low, 0.1, 10),
            ])
            .unwrap();

        let ids: Vec<&str> = result.sources.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "middle", "late"]);
    }

    #[test]
    fn test_config_deserializes_with_partial_overrides() {
        let config: AggregateUserRiskConfig = serde_json::from_str(
            r#"{"channel_weights": {"PAYMENT": 1.5}, "multi_high_score_threshold": 3.0}"#,
        )
        .unwrap();

        assert_eq!(config.channel_weight(DetectionChannel::Payment), 1.5);
        assert_eq!(config.channel_weight(DetectionChannel::Call), 1.0);
        assert_eq!(config.multi_high_score_threshold, 3.0);
        assert_eq!(config.min_confidence_multi_high, 0.95);
    }
}
