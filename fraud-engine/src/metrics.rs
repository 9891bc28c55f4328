//! Metrics collection for observability
//!
//! Prometheus collectors for the analysis pipeline, registered on a registry
//! owned by each engine so independent engines (and tests) do not collide.
//!
//! # Metrics
//!
//! - `fraud_analyses_total{decision}` - Completed analyses by decision
//! - `fraud_validation_failures_total` - Transactions rejected by validation
//! - `fraud_risk_score` - Histogram of final risk scores
//! - `fraud_analysis_duration_seconds` - Histogram of analysis latencies

use crate::types::Decision;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct EngineMetrics {
    /// Completed analyses, labelled by decision
    pub analyses_total: IntCounterVec,

    /// Validation rejections
    pub validation_failures: IntCounter,

    /// Final score distribution
    pub risk_score: Histogram,

    /// Analysis latency
    pub analysis_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl EngineMetrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let analyses_total = IntCounterVec::new(
            Opts::new("fraud_analyses_total", "Completed fraud analyses by decision"),
            &["decision"],
        )?;
        registry.register(Box::new(analyses_total.clone()))?;

        let validation_failures = IntCounter::new(
            "fraud_validation_failures_total",
            "Transactions rejected by validation",
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let risk_score = Histogram::with_opts(
            HistogramOpts::new("fraud_risk_score", "Histogram of final risk scores")
                .buckets(vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]),
        )?;
        registry.register(Box::new(risk_score.clone()))?;

        let analysis_duration = Histogram::with_opts(
            HistogramOpts::new(
                "fraud_analysis_duration_seconds",
                "Histogram of analysis latencies",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;
        registry.register(Box::new(analysis_duration.clone()))?;

        Ok(Self {
            analyses_total,
            validation_failures,
            risk_score,
            analysis_duration,
            registry,
        })
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, decision: Decision, score: f64, duration_secs: f64) {
        self.analyses_total
            .with_label_values(&[decision.as_str()])
            .inc();
        self.risk_score.observe(score);
        self.analysis_duration.observe(duration_secs);
    }

    /// Record a validation rejection
    pub fn record_validation_failure(&self) {
        self.validation_failures.inc();
    }

    /// Completed analyses with the given decision
    pub fn analyses(&self, decision: Decision) -> u64 {
        self.analyses_total
            .with_label_values(&[decision.as_str()])
            .get()
    }

    /// Render the registry in the Prometheus text format
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = EngineMetrics::new().unwrap();
        metrics.record_analysis(Decision::Approve, 0.1, 0.0001);
        metrics.record_analysis(Decision::Decline, 0.9, 0.0002);
        metrics.record_validation_failure();

        assert_eq!(metrics.analyses(Decision::Approve), 1);
        assert_eq!(metrics.analyses(Decision::Review), 0);
        assert_eq!(metrics.validation_failures.get(), 1);
        assert_eq!(metrics.risk_score.get_sample_count(), 2);
    }

    #[test]
    fn test_independent_registries() {
        let a = EngineMetrics::new().unwrap();
        let b = EngineMetrics::new().unwrap();
        a.record_validation_failure();
        assert_eq!(b.validation_failures.get(), 0);
        assert!(a.gather_text().contains("fraud_validation_failures_total 1"));
    }
}
