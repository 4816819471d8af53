use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use url::Url;

use crate::models::{DeviceSecuritySnapshot, Message, PaymentIntent, PhoneCall};
use crate::risk::DetectionResult;

/// Knowledge base of known-bad identifiers.
///
/// `adjust_*` may return the initial result untouched or a modified copy; a
/// modified copy keeps every field of the input populated.
#[async_trait]
pub trait ThreatIntelRepository: Send + Sync {
    async fn adjust_message_result(
        &self,
        message: &Message,
        initial: DetectionResult,
    ) -> Result<DetectionResult>;

    async fn adjust_call_result(
        &self,
        call: &PhoneCall,
        initial: DetectionResult,
    ) -> Result<DetectionResult>;

    async fn adjust_payment_result(
        &self,
        payment: &PaymentIntent,
        initial: DetectionResult,
    ) -> Result<DetectionResult>;

    async fn adjust_device_result(
        &self,
        snapshot: &DeviceSecuritySnapshot,
        initial: DetectionResult,
    ) -> Result<DetectionResult>;

    async fn is_known_scam_phone(&self, phone_number: &str) -> Result<bool>;

    async fn is_known_scam_sender(&self, sender: &str) -> Result<bool>;

    async fn is_known_scam_url(&self, url: &str) -> Result<bool>;

    async fn is_known_scam_payment_destination(
        &self,
        iban: Option<&str>,
        wallet_address: Option<&str>,
    ) -> Result<bool>;
}

/// Set-backed threat intel with pass-through adjustments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryThreatIntel {
    phones: HashSet<String>,
    senders: HashSet<String>,
    urls: HashSet<String>,
    payment_destinations: HashSet<String>,
}

impl InMemoryThreatIntel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scam_phone(mut self, phone_number: &str) -> Self {
        self.phones.insert(normalize_phone(phone_number));
        self
    }

    pub fn with_scam_sender(mut self, sender: &str) -> Self {
        self.senders.insert(normalize_sender(sender));
        self
    }

    pub fn with_scam_url(mut self, url: &str) -> Self {
        self.urls.insert(normalize_url(url));
        self
    }

    pub fn with_scam_payment_destination(mut self, destination: &str) -> Self {
        self.payment_destinations.insert(normalize_account(destination));
        self
    }
}

#[async_trait]
impl ThreatIntelRepository for InMemoryThreatIntel {
    async fn adjust_message_result(
        &self,
        _message: &Message,
        initial: DetectionResult,
    ) -> Result<DetectionResult> {
        Ok(initial)
    }

    async fn adjust_call_result(
        &self,
        _call: &PhoneCall,
        initial: DetectionResult,
    ) -> Result<DetectionResult> {
        Ok(initial)
    }

    async fn adjust_payment_result(
        &self,
        _payment: &PaymentIntent,
        initial: DetectionResult,
    ) -> Result<DetectionResult> {
        Ok(initial)
    }

    async fn adjust_device_result(
        &self,
        _snapshot: &DeviceSecuritySnapshot,
        initial: DetectionResult,
    ) -> Result<DetectionResult> {
        Ok(initial)
    }

    async fn is_known_scam_phone(&self, phone_number: &str) -> Result<bool> {
        Ok(self.phones.contains(&normalize_phone(phone_number)))
    }

    async fn is_known_scam_sender(&self, sender: &str) -> Result<bool> {
        Ok(self.senders.contains(&normalize_sender(sender)))
    }

    async fn is_known_scam_url(&self, url: &str) -> Result<bool> {
        Ok(self.urls.contains(&normalize_url(url)))
    }

    async fn is_known_scam_payment_destination(
        &self,
        iban: Option<&str>,
        wallet_address: Option<&str>,
    ) -> Result<bool> {
        Ok([iban, wallet_address]
            .into_iter()
            .flatten()
            .any(|account| self.payment_destinations.contains(&normalize_account(account))))
    }
}

// Keeps a leading '+' and digits only, so "+33 6-12" and "+33612" match.
fn normalize_phone(phone_number: &str) -> String {
    let trimmed = phone_number.trim();
    let mut normalized: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if trimmed.starts_with('+') {
        normalized.insert(0, '+');
    }
    normalized
}

fn normalize_sender(sender: &str) -> String {
    sender.trim().to_lowercase()
}

// Scheme-less entries ("www.bad.io") are read as https, like extracted links.
fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{}", trimmed))
    };

    match parsed {
        Ok(url) => url.to_string(),
        Err(_) => trimmed.to_lowercase(),
    }
}

fn normalize_account(account: &str) -> String {
    account
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_phone_lookup_ignores_formatting() {
        let intel = InMemoryThreatIntel::new().with_scam_phone("+33 6 12-34-56-78");

        assert!(intel.is_known_scam_phone("+33612345678").await.unwrap());
        assert!(!intel.is_known_scam_phone("33612345678").await.unwrap());
    }

    #[tokio::test]
    async fn test_url_lookup_uses_normalized_form() {
        let intel = InMemoryThreatIntel::new().with_scam_url("HTTPS://Scam.Example.com");

        assert!(intel.is_known_scam_url("https://scam.example.com/").await.unwrap());
        assert!(!intel.is_known_scam_url("https://example.com/").await.unwrap());
    }

    #[tokio::test]
    async fn test_scheme_less_url_entry_matches_extracted_link() {
        let intel = InMemoryThreatIntel::new().with_scam_url("www.Bad.io");

        let links = crate::pipeline::extract_urls("go www.bad.io now");
        assert_eq!(links.len(), 1);
        assert!(intel.is_known_scam_url(links[0].as_str()).await.unwrap());
        assert!(intel.is_known_scam_url("https://www.bad.io/").await.unwrap());
        assert!(intel.is_known_scam_url("www.bad.io").await.unwrap());
    }

    #[tokio::test]
    async fn test_payment_destination_matches_iban_or_wallet() {
        let intel = InMemoryThreatIntel::new().with_scam_payment_destination("fr76 3000 6000 0112");

        assert!(intel
            .is_known_scam_payment_destination(Some("FR7630006000 0112"), None)
            .await
            .unwrap());
        assert!(intel
            .is_known_scam_payment_destination(None, Some("fr7630006000 0112"))
            .await
            .unwrap());
        assert!(!intel
            .is_known_scam_payment_destination(None, None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_sender_lookup_is_case_insensitive() {
        let intel = InMemoryThreatIntel::new().with_scam_sender("Bank-Alert");
        assert!(intel.is_known_scam_sender(" bank-alert ").await.unwrap());
    }
}
