//! Fraud Engine for DelTran
//!
//! Heuristic fraud-risk scoring for individual card and account transactions.
//! A [`FraudEngine`] validates a [`Transaction`], runs the rule set against
//! the account's recorded history, and returns a [`FraudAnalysisResult`] with
//! the clamped score, risk level, decision, factors and recommendations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod rules;
pub mod scoring;
pub mod signals;
pub mod types;

pub use config::Config;
pub use engine::FraudEngine;
pub use error::{Error, Result, ValidationError};
pub use history::AccountHistoryStore;
pub use metrics::EngineMetrics;
pub use signals::{PlaceholderSignals, RiskSignals};
pub use types::*;
