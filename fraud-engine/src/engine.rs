//! Analysis orchestrator

use crate::config::Config;
use crate::error::Result;
use crate::history::AccountHistoryStore;
use crate::metrics::EngineMetrics;
use crate::rules::{self, RuleContext};
use crate::scoring;
use crate::signals::{PlaceholderSignals, RiskSignals};
use crate::types::{Decision, FraudAnalysisResult, Transaction, MODEL_VERSION};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Fraud engine
///
/// Holds no per-call state; the history store is the only shared mutable
/// resource and is injected so callers control its lifetime.
pub struct FraudEngine {
    store: Arc<AccountHistoryStore>,
    signals: Arc<dyn RiskSignals>,
    metrics: Option<EngineMetrics>,
}

impl FraudEngine {
    /// Create new engine over an existing store, with placeholder signals
    pub fn new(store: Arc<AccountHistoryStore>) -> Self {
        Self {
            store,
            signals: Arc::new(PlaceholderSignals),
            metrics: None,
        }
    }

    /// Create engine with a fresh store sized from configuration
    pub fn from_config(config: &Config) -> Self {
        let store = AccountHistoryStore::with_capacity_and_shard_amount(
            config.history.initial_capacity,
            config.history.shard_amount,
        );
        Self::new(Arc::new(store))
    }

    /// Replace the external signal provider
    pub fn with_signals(mut self, signals: Arc<dyn RiskSignals>) -> Self {
        self.signals = signals;
        self
    }

    /// Attach metrics collection
    pub fn with_metrics(mut self, metrics: EngineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Shared history store
    pub fn store(&self) -> &Arc<AccountHistoryStore> {
        &self.store
    }

    /// Attached metrics, if any
    pub fn metrics(&self) -> Option<&EngineMetrics> {
        self.metrics.as_ref()
    }

    /// Analyze a transaction.
    ///
    /// Validation failure returns before any rule runs or the store is
    /// touched. Otherwise the transaction is scored against the history as
    /// it stood before this call, then appended to it whatever the decision.
    pub fn analyze(&self, transaction: Transaction) -> Result<FraudAnalysisResult> {
        let started = Instant::now();
        let analysis_timestamp = Utc::now();

        if let Err(e) = transaction.validate() {
            warn!(
                transaction_id = %transaction.transaction_id,
                field = %e.field,
                "Transaction rejected: {}",
                e.message
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_validation_failure();
            }
            return Err(e.into());
        }

        let mut risk_factors = Vec::new();
        let contributions = {
            let ctx = RuleContext {
                transaction: &transaction,
                store: self.store.as_ref(),
                signals: self.signals.as_ref(),
            };
            rules::evaluate_all(&ctx, &mut risk_factors)
        };

        let risk_score = scoring::aggregate(&contributions);
        let risk_level = scoring::level_of(risk_score);
        let decision = scoring::decide(risk_score);
        let recommendations = scoring::recommendations(risk_level);

        let transaction_id = transaction.transaction_id.clone();
        let account_id = transaction.account_id.clone();
        self.store.append(&account_id, transaction);

        if decision == Decision::Decline {
            warn!(
                transaction_id = %transaction_id,
                account_id = %account_id,
                risk_score,
                factors = risk_factors.len(),
                "Transaction declined"
            );
        } else {
            info!(
                transaction_id = %transaction_id,
                account_id = %account_id,
                risk_score,
                decision = %decision,
                "Risk score calculated"
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_analysis(decision, risk_score, started.elapsed().as_secs_f64());
        }

        Ok(FraudAnalysisResult {
            transaction_id,
            risk_score,
            risk_level,
            decision,
            risk_factors,
            recommendations,
            analysis_timestamp,
            model_version: MODEL_VERSION.to_string(),
        })
    }
}

impl Default for FraudEngine {
    fn default() -> Self {
        Self::new(Arc::new(AccountHistoryStore::new()))
    }
}
