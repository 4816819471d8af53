use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::risk::DetectionChannel;

/// Functional identifier of an end user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Amount stored in the currency's smallest unit (e.g. cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(i64);

impl MoneyAmount {
    pub fn from_minor_units(value: i64) -> Self {
        Self(value)
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }

    pub fn as_major_units(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Incoming message (SMS, mail, OTT...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user_id: UserId,
    pub content: String,
    pub channel: DetectionChannel,
    /// Sender address or short code, when the transport exposes one.
    pub source: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Incoming phone call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCall {
    pub id: String,
    pub user_id: UserId,
    pub phone_number: String,
    pub started_at: DateTime<Utc>,
    pub country_iso: Option<String>,
    pub is_in_contacts: bool,
    pub is_from_unknown_number: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub user_id: UserId,
    pub amount: MoneyAmount,
    pub currency: String,
    /// IBAN, wallet address or mobile-money account of the beneficiary.
    pub recipient_account: String,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Device security state captured at analysis time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSecuritySnapshot {
    pub id: String,
    pub user_id: UserId,
    pub captured_at: DateTime<Utc>,
    pub is_rooted_or_jailbroken: bool,
    pub is_emulator: bool,
    pub has_debuggable_build: bool,
    pub has_suspicious_apps: bool,
    pub integrity_check_passed: bool,
}

impl DeviceSecuritySnapshot {
    pub fn has_any_flag(&self) -> bool {
        !self.integrity_check_passed
            || self.is_rooted_or_jailbroken
            || self.has_suspicious_apps
            || self.is_emulator
            || self.has_debuggable_build
    }
}
