// Reason tags. Detectors and threat intel emit the signal tags; the channel
// use cases append the `escalation_*` tags.

pub const SENDER_KNOWN_SCAM: &str = "sender_known_scam";
pub const URL_KNOWN_SCAM: &str = "url_known_scam";
pub const QR_CODE_PAYMENT: &str = "qr_code_payment";
pub const QR_CODE_PRESENT: &str = "qr_code_present";

pub const ESCALATION_SENDER_KNOWN_SCAM: &str = "escalation_sender_known_scam";
pub const ESCALATION_URL_KNOWN_SCAM: &str = "escalation_url_known_scam";
pub const ESCALATION_QR_CODE_PAYMENT: &str = "escalation_qr_code_payment";
pub const ESCALATION_QR_CODE_GENERIC: &str = "escalation_qr_code_generic";

pub const CALLER_KNOWN_SCAM: &str = "caller_known_scam";
pub const CALLER_NUMBER_MALFORMED: &str = "caller_number_malformed";
pub const HIGH_RISK_COUNTRY_PREFIX: &str = "high_risk_country_prefix";
pub const CALL_SPOOFING_SUSPECTED: &str = "call_spoofing_suspected";

pub const ESCALATION_CALLER_KNOWN_SCAM: &str = "escalation_caller_known_scam";
pub const ESCALATION_CALLER_NUMBER_MALFORMED: &str = "escalation_caller_number_malformed";
pub const ESCALATION_HIGH_RISK_COUNTRY_PREFIX: &str = "escalation_high_risk_country_prefix";
pub const ESCALATION_CALL_SPOOFING_SUSPECTED: &str = "escalation_call_spoofing_suspected";

pub const ESCALATION_PAYMENT_DESTINATION_KNOWN_SCAM: &str =
    "escalation_payment_destination_known_scam";

pub const DEVICE_INTEGRITY_CHECK_FAILED: &str = "device_integrity_check_failed";
pub const DEVICE_ROOT_OR_JAILBREAK_DETECTED: &str = "device_root_or_jailbreak_detected";
pub const DEVICE_SUSPICIOUS_APPS: &str = "device_suspicious_apps_installed";
pub const DEVICE_EMULATOR_SUSPICIOUS: &str = "device_emulator_suspicious";
pub const DEVICE_DEBUGGABLE_BUILD: &str = "device_debuggable_build_detected";
