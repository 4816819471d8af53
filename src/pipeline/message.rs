use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::action::DetectionLogRepository;
use crate::models::Message;
use crate::pipeline::reasons::*;
use crate::pipeline::{MessageScamDetector, ThreatIntelRepository};
use crate::risk::{DetectionResult, RiskLevel};

/// Threat-intel answers about one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageIndicators {
    pub sender_flagged: bool,
    pub url_flagged: bool,
}

/// Incoming message analysis: detector, threat-intel adjustment,
/// known-indicator escalation, QR-code escalation, log.
pub struct AnalyzeIncomingMessage {
    detector: Arc<dyn MessageScamDetector>,
    threat_intel: Arc<dyn ThreatIntelRepository>,
    detection_log: Arc<dyn DetectionLogRepository>,
}

impl AnalyzeIncomingMessage {
    pub fn new(
        detector: Arc<dyn MessageScamDetector>,
        threat_intel: Arc<dyn ThreatIntelRepository>,
        detection_log: Arc<dyn DetectionLogRepository>,
    ) -> Self {
        Self {
            detector,
            threat_intel,
            detection_log,
        }
    }

    pub async fn run(&self, message: &Message) -> Result<DetectionResult> {
        let base = self
            .detector
            .analyze(message)
            .await
            .with_context(|| format!("{} failed on message {}", self.detector.name(), message.id))?;

        let adjusted = self
            .threat_intel
            .adjust_message_result(message, base)
            .await
            .context("Threat intel adjustment failed for message")?;

        let indicators = self.lookup_indicators(message).await?;
        let escalated = escalate_for_qr_code(escalate_for_known_indicators(adjusted, indicators));

        if let Err(e) = self.detection_log.log_message_detection(message, &escalated).await {
            warn!(detection_id = %escalated.id, error = ?e, "failed to log message detection");
        }

        debug!(
            message_id = %message.id,
            risk = %escalated.risk_level,
            confidence = escalated.confidence_score,
            "message analyzed"
        );

        Ok(escalated)
    }

    async fn lookup_indicators(&self, message: &Message) -> Result<MessageIndicators> {
        let sender_flagged = match message.source.as_deref().map(str::trim) {
            Some(sender) if !sender.is_empty() => self
                .threat_intel
                .is_known_scam_sender(sender)
                .await
                .context("Threat intel sender lookup failed")?,
            _ => false,
        };

        let mut url_flagged = false;
        for url in extract_urls(&message.content) {
            if self
                .threat_intel
                .is_known_scam_url(url.as_str())
                .await
                .context("Threat intel URL lookup failed")?
            {
                url_flagged = true;
                break;
            }
        }

        Ok(MessageIndicators {
            sender_flagged,
            url_flagged,
        })
    }
}

const URL_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// http(s) links found anywhere in free text, including links glued to the
/// preceding word. `www.` hosts are read as https.
pub fn extract_urls(content: &str) -> Vec<Url> {
    // ASCII lowercasing keeps byte offsets valid for `content`.
    let lower = content.to_ascii_lowercase();
    let mut urls = Vec::new();
    let mut pos = 0;

    while let Some((start, prefix)) = next_url_start(&lower, pos) {
        let end = content[start..]
            .find(is_url_terminator)
            .map_or(content.len(), |i| start + i);
        let candidate = content[start..end]
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'));

        let parsed = if prefix == "www." {
            Url::parse(&format!("https://{}", candidate))
        } else {
            Url::parse(candidate)
        };
        if let Ok(url) = parsed {
            if url.host_str().is_some() {
                urls.push(url);
            }
        }

        pos = end.max(start + prefix.len());
    }

    urls
}

fn is_url_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '(' | ')' | '[' | ']')
}

fn next_url_start(lower: &str, from: usize) -> Option<(usize, &'static str)> {
    URL_PREFIXES
        .iter()
        .filter_map(|prefix| lower[from..].find(*prefix).map(|i| (from + i, *prefix)))
        .min_by_key(|(i, _)| *i)
}

/// Known-bad sender and URL. A threat-intel hit or an existing signal tag
/// counts; one hit floors at HIGH/0.90, both force CRITICAL/0.97.
pub fn escalate_for_known_indicators(
    current: DetectionResult,
    indicators: MessageIndicators,
) -> DetectionResult {
    let sender_hit = indicators.sender_flagged || current.has_reason(SENDER_KNOWN_SCAM);
    let url_hit = indicators.url_flagged || current.has_reason(URL_KNOWN_SCAM);

    if !sender_hit && !url_hit {
        return current;
    }

    let mut extra = Vec::new();
    if indicators.sender_flagged && !current.has_reason(SENDER_KNOWN_SCAM) {
        extra.push(SENDER_KNOWN_SCAM);
    }
    if indicators.url_flagged && !current.has_reason(URL_KNOWN_SCAM) {
        extra.push(URL_KNOWN_SCAM);
    }
    if sender_hit {
        extra.push(ESCALATION_SENDER_KNOWN_SCAM);
    }
    if url_hit {
        extra.push(ESCALATION_URL_KNOWN_SCAM);
    }

    let (target, floor) = if sender_hit && url_hit {
        (RiskLevel::Critical, 0.97)
    } else {
        (RiskLevel::High, 0.90)
    };

    current.escalate(target, floor, extra)
}

/// QR codes: payment context floors at HIGH/0.95, a bare QR code at
/// MEDIUM/0.88.
pub fn escalate_for_qr_code(current: DetectionResult) -> DetectionResult {
    if current.has_reason(QR_CODE_PAYMENT) {
        current.escalate(RiskLevel::High, 0.95, [ESCALATION_QR_CODE_PAYMENT])
    } else if current.has_reason(QR_CODE_PRESENT) {
        current.escalate(RiskLevel::Medium, 0.88, [ESCALATION_QR_CODE_GENERIC])
    } else {
        current
    }
}
