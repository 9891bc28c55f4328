//! Per-account transaction history and daily counters

use crate::types::Transaction;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use dashmap::DashMap;

/// Account history store shared by concurrent analyses.
///
/// Both maps are sharded by key. A read holds the shard read lock while it
/// copies the account's entries, and an append or increment holds the shard
/// write lock, so readers see either the state before or after a write.
/// Entries are never evicted.
pub struct AccountHistoryStore {
    // Map: account_id -> transactions in analysis order
    histories: DashMap<String, Vec<Transaction>>,
    // Map: (account_id, local calendar day) -> transactions analyzed that day
    daily_counts: DashMap<(String, NaiveDate), u32>,
}

impl AccountHistoryStore {
    /// Create empty store
    pub fn new() -> Self {
        Self {
            histories: DashMap::new(),
            daily_counts: DashMap::new(),
        }
    }

    /// Create empty store with explicit sharding.
    ///
    /// `shard_amount` must be a power of two greater than 1.
    pub fn with_capacity_and_shard_amount(capacity: usize, shard_amount: usize) -> Self {
        Self {
            histories: DashMap::with_capacity_and_shard_amount(capacity, shard_amount),
            daily_counts: DashMap::with_capacity_and_shard_amount(capacity, shard_amount),
        }
    }

    /// Full recorded history for an account, empty if none
    pub fn history(&self, account_id: &str) -> Vec<Transaction> {
        self.histories
            .get(account_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// History entries with a timestamp after `now - window_minutes`.
    ///
    /// `now` is wall-clock time at the call, not the timestamp of the
    /// transaction being analyzed.
    pub fn recent_history(&self, account_id: &str, window_minutes: i64) -> Vec<Transaction> {
        let cutoff = Utc::now() - Duration::minutes(window_minutes);
        self.recent_history_since(account_id, cutoff)
    }

    /// History entries with a timestamp strictly after `cutoff`
    pub fn recent_history_since(&self, account_id: &str, cutoff: DateTime<Utc>) -> Vec<Transaction> {
        self.histories
            .get(account_id)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|tx| tx.transaction_timestamp.with_timezone(&Utc) > cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Increment and return the number of transactions seen for the account
    /// on `date`
    pub fn increment_daily_count(&self, account_id: &str, date: NaiveDate) -> u32 {
        let mut count = self
            .daily_counts
            .entry((account_id.to_string(), date))
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Current daily count without incrementing
    pub fn daily_count(&self, account_id: &str, date: NaiveDate) -> u32 {
        self.daily_counts
            .get(&(account_id.to_string(), date))
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Append an analyzed transaction to its account's history
    pub fn append(&self, account_id: &str, transaction: Transaction) {
        self.histories
            .entry(account_id.to_string())
            .or_default()
            .push(transaction);
    }

    /// Clear history and daily counters for an account (e.g., for testing or manual reset)
    pub fn reset_account(&self, account_id: &str) {
        self.histories.remove(account_id);
        self.daily_counts.retain(|(account, _), _| account != account_id);
    }

    /// Get total number of accounts with recorded history
    pub fn tracked_accounts(&self) -> usize {
        self.histories.len()
    }
}

impl Default for AccountHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
