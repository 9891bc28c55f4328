//! External risk signals consulted by the rule set.
//!
//! Device reputation, geo consistency and IP reputation come from systems
//! outside the engine. [`RiskSignals`] is the seam where a real provider is
//! plugged in; [`PlaceholderSignals`] stands in until one exists and does not
//! perform any detection of its own.

use crate::types::Transaction;

/// Prefix treated as suspicious by the placeholder IP check
pub const SUSPICIOUS_IP_PREFIX: &str = "10.0.0";

/// Source of signals the engine does not compute itself
pub trait RiskSignals: Send + Sync {
    /// Whether the device fingerprint has been seen before for this account
    fn is_known_device(&self, account_id: &str, device_fingerprint: &str) -> bool;

    /// Whether the transaction's location contradicts recent activity
    fn has_geographic_inconsistency(&self, transaction: &Transaction) -> bool;

    /// Whether the IP address has a bad reputation
    fn is_suspicious_ip(&self, ip_address: &str) -> bool;
}

/// Fixed stand-ins: every device is new, locations are never inconsistent,
/// and IPs under [`SUSPICIOUS_IP_PREFIX`] are suspicious.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSignals;

impl RiskSignals for PlaceholderSignals {
    fn is_known_device(&self, _account_id: &str, _device_fingerprint: &str) -> bool {
        false
    }

    fn has_geographic_inconsistency(&self, _transaction: &Transaction) -> bool {
        false
    }

    fn is_suspicious_ip(&self, ip_address: &str) -> bool {
        ip_address.starts_with(SUSPICIOUS_IP_PREFIX)
    }
}
