//! Error types for stockfolio
//!
//! This module defines domain-specific error types that provide clear,
//! actionable error messages to users.

use thiserror::Error;

/// Failures surfaced by the core pipeline.
///
/// `Load` and `InvalidTransaction` are fatal: there is nothing meaningful to
/// render without a valid transaction log. `EmptyPortfolio` is fatal for
/// aggregation. `QuoteSource` is recoverable — the caller may fall back to
/// cost-basis pricing and render anyway. A quote missing for a single symbol
/// is not an error at all; the aggregator substitutes that symbol's average
/// cost.
#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Could not load transaction log: {0}")]
    Load(String),

    #[error("Transaction {index}: {reason}")]
    InvalidTransaction { index: usize, reason: String },

    #[error("The transaction log contains no transactions")]
    EmptyPortfolio,

    #[error("Quote source request failed: {0}")]
    QuoteSource(String),
}

impl PortfolioError {
    pub(crate) fn load(reason: impl ToString) -> Self {
        PortfolioError::Load(reason.to_string())
    }

    pub(crate) fn invalid_transaction(index: usize, reason: impl ToString) -> Self {
        PortfolioError::InvalidTransaction {
            index,
            reason: reason.to_string(),
        }
    }
}
