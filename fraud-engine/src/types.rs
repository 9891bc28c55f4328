//! Core types for fraud engine

use crate::error::ValidationError;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Version tag stamped on every analysis result
pub const MODEL_VERSION: &str = "1.0";

/// Lower edge of the medium band (and the REVIEW decision)
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

/// Lower edge of the high band (and the DECLINE decision)
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Card or online purchase
    Purchase,
    /// Cash withdrawal
    Withdrawal,
    /// Account-to-account transfer
    Transfer,
    /// Merchant refund
    Refund,
    /// Bill payment
    Payment,
    /// Deposit
    Deposit,
}

impl TransactionType {
    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "Purchase",
            TransactionType::Withdrawal => "ATM Withdrawal",
            TransactionType::Transfer => "Money Transfer",
            TransactionType::Refund => "Refund",
            TransactionType::Payment => "Bill Payment",
            TransactionType::Deposit => "Deposit",
        }
    }
}

/// A financial transaction submitted for analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Caller-assigned transaction identifier
    pub transaction_id: String,

    /// Account the transaction belongs to
    pub account_id: String,

    /// Monetary amount, must be positive
    pub amount: Decimal,

    /// ISO 4217 currency code
    pub currency: String,

    /// Merchant identifier
    pub merchant_id: String,

    /// Merchant category code, e.g. `gambling`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_category: Option<String>,

    /// Timestamp with the offset it was captured in
    pub transaction_timestamp: DateTime<FixedOffset>,

    /// Client IP address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,

    /// Client device fingerprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_fingerprint: Option<String>,

    /// Country the transaction originated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_country: Option<String>,

    /// City the transaction originated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_city: Option<String>,

    /// Kind of transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,

    /// Whether the card was physically present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_card_present: Option<bool>,
}

impl Transaction {
    /// Create transaction with the required fields; optional signals unset
    pub fn new(
        transaction_id: impl Into<String>,
        account_id: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        merchant_id: impl Into<String>,
        transaction_timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            account_id: account_id.into(),
            amount,
            currency: currency.into(),
            merchant_id: merchant_id.into(),
            merchant_category: None,
            transaction_timestamp,
            ip_address: None,
            device_fingerprint: None,
            location_country: None,
            location_city: None,
            transaction_type: None,
            is_card_present: None,
        }
    }

    /// Set merchant category
    pub fn with_merchant_category(mut self, category: impl Into<String>) -> Self {
        self.merchant_category = Some(category.into());
        self
    }

    /// Set location country
    pub fn with_location_country(mut self, country: impl Into<String>) -> Self {
        self.location_country = Some(country.into());
        self
    }

    /// Set location city
    pub fn with_location_city(mut self, city: impl Into<String>) -> Self {
        self.location_city = Some(city.into());
        self
    }

    /// Set client IP address
    pub fn with_ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set device fingerprint
    pub fn with_device_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.device_fingerprint = Some(fingerprint.into());
        self
    }

    /// Set transaction type
    pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    /// Set card-present flag
    pub fn with_card_present(mut self, present: bool) -> Self {
        self.is_card_present = Some(present);
        self
    }

    /// Check field invariants, reporting the first violation.
    ///
    /// Order: transaction ID, account ID, amount, currency, merchant ID.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.transaction_id.trim().is_empty() {
            return Err(ValidationError::new("transactionId", "cannot be blank"));
        }
        if self.account_id.trim().is_empty() {
            return Err(ValidationError::new("accountId", "cannot be blank"));
        }
        if self.amount <= Decimal::ZERO {
            return Err(ValidationError::new("amount", "must be greater than 0"));
        }
        if self.currency.trim().chars().count() != 3 {
            return Err(ValidationError::new("currency", "must be 3 characters"));
        }
        if self.merchant_id.trim().is_empty() {
            return Err(ValidationError::new("merchantId", "cannot be blank"));
        }
        Ok(())
    }
}

/// Risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    /// Score in [0, 0.3)
    Low,
    /// Score in [0.3, 0.7)
    Medium,
    /// Score in [0.7, 1.0]
    High,
}

impl RiskLevel {
    /// Classify a score; band edges belong to the higher band
    pub fn from_score(score: f64) -> Self {
        if score < MEDIUM_RISK_THRESHOLD {
            RiskLevel::Low
        } else if score < HIGH_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    /// Inclusive lower edge of the band
    pub fn min_score(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.0,
            RiskLevel::Medium => MEDIUM_RISK_THRESHOLD,
            RiskLevel::High => HIGH_RISK_THRESHOLD,
        }
    }

    /// Upper edge of the band (exclusive except for High)
    pub fn max_score(&self) -> f64 {
        match self {
            RiskLevel::Low => MEDIUM_RISK_THRESHOLD,
            RiskLevel::Medium => HIGH_RISK_THRESHOLD,
            RiskLevel::High => 1.0,
        }
    }
}

/// Accept/review/decline outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// Low risk, proceed
    Approve,
    /// Manual review needed
    Review,
    /// High risk, block
    Decline,
}

impl Decision {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Review => "REVIEW",
            Decision::Decline => "DECLINE",
        }
    }
}

impl From<RiskLevel> for Decision {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Low => Decision::Approve,
            RiskLevel::Medium => Decision::Review,
            RiskLevel::High => Decision::Decline,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fraud analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAnalysisResult {
    /// Transaction ID
    pub transaction_id: String,

    /// Clamped score in [0, 1]
    pub risk_score: f64,

    /// Risk level
    pub risk_level: RiskLevel,

    /// Decision
    pub decision: Decision,

    /// Risk factors in rule evaluation order
    pub risk_factors: Vec<String>,

    /// Recommendations for the risk level
    pub recommendations: Vec<String>,

    /// Wall-clock time the analysis started
    pub analysis_timestamp: DateTime<Utc>,

    /// Model version
    pub model_version: String,
}
