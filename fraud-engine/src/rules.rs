//! Heuristic risk rules
//!
//! Each rule returns its score contribution and appends a factor string for
//! every check that fired. Rules do not see each other's output, so the final
//! score does not depend on their order; the factor list does, which is why
//! [`evaluate_all`] runs them in a fixed sequence.

use crate::history::AccountHistoryStore;
use crate::signals::RiskSignals;
use crate::types::Transaction;
use chrono::Timelike;
use rust_decimal::Decimal;
use tracing::debug;

/// Amounts strictly above this are high value
pub const HIGH_AMOUNT_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Multiple of the account's mean amount that counts as unusual
pub const UNUSUAL_AMOUNT_MULTIPLIER: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Daily counts strictly above this are high velocity
pub const MAX_DAILY_TRANSACTIONS: u32 = 10;

/// Short velocity window
pub const SUSPICIOUS_VELOCITY_MINUTES: i64 = 5;

/// Prior transactions inside the short window that trigger the velocity rule
pub const SUSPICIOUS_VELOCITY_COUNT: usize = 3;

/// Placeholder country denylist
pub const HIGH_RISK_COUNTRIES: [&str; 3] = ["XX", "YY", "ZZ"];

/// Merchant category denylist
pub const HIGH_RISK_MERCHANT_CATEGORIES: [&str; 4] =
    ["gambling", "adult", "cryptocurrency", "money_transfer"];

// Contributions
const HIGH_AMOUNT_WEIGHT: f64 = 0.3;
const UNUSUAL_AMOUNT_WEIGHT: f64 = 0.2;
const DAILY_VELOCITY_WEIGHT: f64 = 0.2;
const SHORT_WINDOW_VELOCITY_WEIGHT: f64 = 0.25;
const HIGH_RISK_COUNTRY_WEIGHT: f64 = 0.4;
const GEO_INCONSISTENCY_WEIGHT: f64 = 0.3;
const UNUSUAL_HOUR_WEIGHT: f64 = 0.1;
const NEW_DEVICE_WEIGHT: f64 = 0.15;
const SUSPICIOUS_IP_WEIGHT: f64 = 0.2;
const HIGH_RISK_MERCHANT_WEIGHT: f64 = 0.15;

/// Inputs shared by every rule for one analysis
pub struct RuleContext<'a> {
    /// Transaction under analysis
    pub transaction: &'a Transaction,
    /// History as it stood before this transaction
    pub store: &'a AccountHistoryStore,
    /// External signal provider
    pub signals: &'a dyn RiskSignals,
}

/// Run every rule in evaluation order.
///
/// Returns one contribution per rule; factor strings are appended to
/// `factors` in the same order.
pub fn evaluate_all(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> Vec<f64> {
    vec![
        amount_risk(ctx, factors),
        velocity_risk(ctx, factors),
        geographic_risk(ctx, factors),
        time_risk(ctx, factors),
        device_risk(ctx, factors),
        merchant_risk(ctx, factors),
    ]
}

/// High absolute amount, and amount far above the account's mean
pub fn amount_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    let tx = ctx.transaction;
    let mut risk = 0.0;

    if tx.amount > HIGH_AMOUNT_THRESHOLD {
        risk += HIGH_AMOUNT_WEIGHT;
        factors.push("High transaction amount".to_string());
    }

    let history = ctx.store.history(&tx.account_id);
    if let Some(mean) = mean_amount(&history) {
        // A limit past Decimal::MAX is above every representable amount
        let unusual = mean
            .checked_mul(UNUSUAL_AMOUNT_MULTIPLIER)
            .map_or(false, |limit| tx.amount > limit);

        if unusual {
            debug!(account_id = %tx.account_id, %mean, "Amount exceeds history mean");
            risk += UNUSUAL_AMOUNT_WEIGHT;
            factors.push("Unusual amount compared to account history".to_string());
        }
    }

    risk
}

/// Mean of the recorded amounts, `None` for an empty history.
///
/// Falls back to summing per-entry shares when the plain total would
/// overflow `Decimal`.
fn mean_amount(history: &[Transaction]) -> Option<Decimal> {
    if history.is_empty() {
        return None;
    }
    let count = Decimal::from(history.len());

    let total = history
        .iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.amount));

    match total {
        Some(total) => Some(total / count),
        None => Some(history.iter().map(|t| t.amount / count).sum()),
    }
}

/// Daily count and short-window burst for the account.
///
/// The daily counter is incremented here, so every validated transaction
/// counts toward its own day. The short window only sees prior entries.
pub fn velocity_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    let tx = ctx.transaction;
    let mut risk = 0.0;

    let day = tx.transaction_timestamp.date_naive();
    let daily_count = ctx.store.increment_daily_count(&tx.account_id, day);
    if daily_count > MAX_DAILY_TRANSACTIONS {
        debug!(account_id = %tx.account_id, daily_count, "Daily velocity exceeded");
        risk += DAILY_VELOCITY_WEIGHT;
        factors.push("High daily transaction count".to_string());
    }

    let recent = ctx
        .store
        .recent_history(&tx.account_id, SUSPICIOUS_VELOCITY_MINUTES);
    if recent.len() >= SUSPICIOUS_VELOCITY_COUNT {
        debug!(
            account_id = %tx.account_id,
            recent = recent.len(),
            "Short-window velocity exceeded"
        );
        risk += SHORT_WINDOW_VELOCITY_WEIGHT;
        factors.push("Multiple transactions within short time frame".to_string());
    }

    risk
}

/// Denylisted country and geo inconsistency signal
pub fn geographic_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    let tx = ctx.transaction;
    let mut risk = 0.0;

    if let Some(country) = tx.location_country.as_deref() {
        if HIGH_RISK_COUNTRIES.contains(&country) {
            risk += HIGH_RISK_COUNTRY_WEIGHT;
            factors.push(format!("Transaction from high-risk country: {}", country));
        }
    }

    if ctx.signals.has_geographic_inconsistency(tx) {
        risk += GEO_INCONSISTENCY_WEIGHT;
        factors.push("Geographic inconsistency detected".to_string());
    }

    risk
}

/// Transactions in the early hours of their own local day
pub fn time_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    // hour() is 0..=23, so only the early-morning side can fire
    let hour = ctx.transaction.transaction_timestamp.hour();
    if hour < 6 || hour > 23 {
        factors.push("Transaction during unusual hours".to_string());
        return UNUSUAL_HOUR_WEIGHT;
    }
    0.0
}

/// Unknown device and IP reputation
pub fn device_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    let tx = ctx.transaction;
    let mut risk = 0.0;

    if let Some(fingerprint) = tx.device_fingerprint.as_deref().filter(|f| !f.is_empty()) {
        if !ctx.signals.is_known_device(&tx.account_id, fingerprint) {
            risk += NEW_DEVICE_WEIGHT;
            factors.push("Transaction from new device".to_string());
        }
    }

    if let Some(ip) = tx.ip_address.as_deref() {
        if ctx.signals.is_suspicious_ip(ip) {
            risk += SUSPICIOUS_IP_WEIGHT;
            factors.push("Transaction from suspicious IP address".to_string());
        }
    }

    risk
}

/// Denylisted merchant category
pub fn merchant_risk(ctx: &RuleContext<'_>, factors: &mut Vec<String>) -> f64 {
    match ctx.transaction.merchant_category.as_deref() {
        Some(category) if HIGH_RISK_MERCHANT_CATEGORIES.contains(&category) => {
            factors.push(format!("High-risk merchant category: {}", category));
            HIGH_RISK_MERCHANT_WEIGHT
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PlaceholderSignals;
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};

    fn at_hour(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 28, hour, 15, 0)
            .unwrap()
    }

    fn tx(amount: i64) -> Transaction {
        Transaction::new("TXN", "ACC001", Decimal::from(amount), "USD", "MERCH", at_hour(14))
    }

    fn run<F>(rule: F, tx: &Transaction, store: &AccountHistoryStore) -> (f64, Vec<String>)
    where
        F: Fn(&RuleContext<'_>, &mut Vec<String>) -> f64,
    {
        let ctx = RuleContext {
            transaction: tx,
            store,
            signals: &PlaceholderSignals,
        };
        let mut factors = Vec::new();
        let risk = rule(&ctx, &mut factors);
        (risk, factors)
    }

    #[test]
    fn test_high_amount_is_strict() {
        let store = AccountHistoryStore::new();
        assert_eq!(run(amount_risk, &tx(10_000), &store).0, 0.0);

        let (risk, factors) = run(amount_risk, &tx(10_001), &store);
        assert_eq!(risk, 0.3);
        assert_eq!(factors, vec!["High transaction amount"]);
    }

    #[test]
    fn test_unusual_amount_against_mean() {
        let store = AccountHistoryStore::new();
        store.append("ACC001", tx(100));
        store.append("ACC001", tx(300));

        // mean 200, threshold 1000
        assert_eq!(run(amount_risk, &tx(1_000), &store).0, 0.0);
        let (risk, factors) = run(amount_risk, &tx(1_001), &store);
        assert_eq!(risk, 0.2);
        assert_eq!(factors, vec!["Unusual amount compared to account history"]);
    }

    #[test]
    fn test_amount_rules_stack_in_order() {
        let store = AccountHistoryStore::new();
        store.append("ACC001", tx(50));
        let (risk, factors) = run(amount_risk, &tx(20_000), &store);
        assert!((risk - 0.5).abs() < 1e-9);
        assert_eq!(
            factors,
            vec![
                "High transaction amount",
                "Unusual amount compared to account history"
            ]
        );
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let store = AccountHistoryStore::new();
        let huge = Decimal::from_str_exact("20000000000000000000000000000").unwrap();
        let mut first = tx(0);
        first.amount = huge;
        store.append("ACC001", first.clone());

        // 5 * mean is past Decimal::MAX, so nothing can exceed it
        let (risk, factors) = run(amount_risk, &first, &store);
        assert_eq!(risk, 0.3);
        assert_eq!(factors, vec!["High transaction amount"]);
    }

    #[test]
    fn test_mean_survives_total_overflow() {
        let big = Decimal::from_str_exact("60000000000000000000000000000").unwrap();
        let history: Vec<Transaction> = (0..3)
            .map(|_| {
                let mut t = tx(0);
                t.amount = big;
                t
            })
            .collect();

        let mean = mean_amount(&history).unwrap();
        assert!((mean - big).abs() < Decimal::ONE);
        assert_eq!(mean_amount(&[]), None);
    }

    #[test]
    fn test_daily_velocity_after_ten() {
        let store = AccountHistoryStore::new();
        let day = NaiveDate::from_ymd_opt(2024, 7, 28).unwrap();
        for _ in 0..9 {
            store.increment_daily_count("ACC001", day);
        }

        // 10th of the day
        let (risk, _) = run(velocity_risk, &tx(100), &store);
        assert_eq!(risk, 0.0);

        // 11th of the day
        let (risk, factors) = run(velocity_risk, &tx(100), &store);
        assert_eq!(risk, 0.2);
        assert_eq!(factors, vec!["High daily transaction count"]);
    }

    #[test]
    fn test_short_window_boundary() {
        let store = AccountHistoryStore::new();
        let recent = Utc::now().fixed_offset() - Duration::minutes(1);
        let mut current = tx(100);
        current.transaction_timestamp = recent;

        store.append("ACC001", current.clone());
        store.append("ACC001", current.clone());
        let (risk, _) = run(velocity_risk, &current, &store);
        assert_eq!(risk, 0.0);

        store.append("ACC001", current.clone());
        let (risk, factors) = run(velocity_risk, &current, &store);
        assert_eq!(risk, 0.25);
        assert_eq!(factors, vec!["Multiple transactions within short time frame"]);
    }

    #[test]
    fn test_high_risk_country() {
        let store = AccountHistoryStore::new();
        let (risk, factors) = run(geographic_risk, &tx(100).with_location_country("XX"), &store);
        assert_eq!(risk, 0.4);
        assert_eq!(factors, vec!["Transaction from high-risk country: XX"]);

        let (risk, factors) = run(geographic_risk, &tx(100).with_location_country("US"), &store);
        assert_eq!(risk, 0.0);
        assert!(factors.is_empty());
    }

    #[test]
    fn test_unusual_hours() {
        let store = AccountHistoryStore::new();
        let mut early = tx(100);
        early.transaction_timestamp = at_hour(5);
        assert_eq!(run(time_risk, &early, &store).0, 0.1);

        let mut morning = tx(100);
        morning.transaction_timestamp = at_hour(6);
        assert_eq!(run(time_risk, &morning, &store).0, 0.0);

        let mut late = tx(100);
        late.transaction_timestamp = at_hour(23);
        assert_eq!(run(time_risk, &late, &store).0, 0.0);
    }

    #[test]
    fn test_unusual_hours_uses_local_offset() {
        let store = AccountHistoryStore::new();
        // 22:00 UTC is 03:00 in UTC+5
        let mut tx = tx(100);
        tx.transaction_timestamp = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 29, 3, 0, 0)
            .unwrap();
        assert_eq!(run(time_risk, &tx, &store).0, 0.1);
    }

    #[test]
    fn test_device_and_ip() {
        let store = AccountHistoryStore::new();
        let (risk, factors) = run(
            device_risk,
            &tx(100)
                .with_device_fingerprint("device-123")
                .with_ip_address("10.0.0.7"),
            &store,
        );
        assert!((risk - 0.35).abs() < 1e-9);
        assert_eq!(
            factors,
            vec![
                "Transaction from new device",
                "Transaction from suspicious IP address"
            ]
        );

        let (risk, _) = run(
            device_risk,
            &tx(100).with_device_fingerprint("").with_ip_address("8.8.8.8"),
            &store,
        );
        assert_eq!(risk, 0.0);
    }

    #[test]
    fn test_merchant_category() {
        let store = AccountHistoryStore::new();
        for category in HIGH_RISK_MERCHANT_CATEGORIES {
            let (risk, factors) =
                run(merchant_risk, &tx(100).with_merchant_category(category), &store);
            assert_eq!(risk, 0.15);
            assert_eq!(factors, vec![format!("High-risk merchant category: {}", category)]);
        }

        let (risk, _) = run(merchant_risk, &tx(100).with_merchant_category("Gambling"), &store);
        assert_eq!(risk, 0.0);
    }

    struct AlwaysInconsistent;

    impl RiskSignals for AlwaysInconsistent {
        fn is_known_device(&self, _: &str, _: &str) -> bool {
            true
        }
        fn has_geographic_inconsistency(&self, _: &Transaction) -> bool {
            true
        }
        fn is_suspicious_ip(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_signals_are_replaceable() {
        let store = AccountHistoryStore::new();
        let tx = tx(100)
            .with_device_fingerprint("device-123")
            .with_ip_address("10.0.0.1");
        let ctx = RuleContext {
            transaction: &tx,
            store: &store,
            signals: &AlwaysInconsistent,
        };
        let mut factors = Vec::new();
        assert_eq!(geographic_risk(&ctx, &mut factors), 0.3);
        assert_eq!(device_risk(&ctx, &mut factors), 0.0);
        assert_eq!(factors, vec!["Geographic inconsistency detected"]);
    }
}
