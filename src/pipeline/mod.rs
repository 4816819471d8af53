mod call;
mod detector;
mod device;
mod message;
mod payment;
pub mod reasons;
mod threat_intel;

pub use call::{escalate_for_known_scam_caller, escalate_for_metadata_signals, AnalyzeIncomingCall};
pub use detector::{CallScamDetector, DeviceThreatDetector, MessageScamDetector, PaymentRiskEngine};
pub use device::{escalate_for_device_flags, EvaluateDeviceSecurityState};
pub use message::{
    escalate_for_known_indicators, escalate_for_qr_code, extract_urls, AnalyzeIncomingMessage,
    MessageIndicators,
};
pub use payment::{escalate_for_known_destination, EvaluatePaymentIntent};
pub use threat_intel::{InMemoryThreatIntel, ThreatIntelRepository};
