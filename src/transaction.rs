use crate::error::PortfolioError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::Path;

/// One recorded buy event from the transaction log.
///
/// The log is a JSON array of records with `Symbol`, `Date`, `Quantity` and
/// `Cost` fields, where `Cost` is the price paid per unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    symbol: String,
    date: NaiveDate,
    quantity: f64,
    cost: f64,
}

impl Transaction {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Price paid per unit.
    pub fn unit_cost(&self) -> f64 {
        self.cost
    }

    /// Total amount paid for this buy: quantity times unit cost.
    pub fn cost_total(&self) -> f64 {
        self.quantity * self.cost
    }
}

/// The full transaction log, loaded once per run and immutable afterwards.
#[derive(Debug)]
pub struct TransactionSet {
    transactions: Vec<Transaction>,
}

impl TransactionSet {
    /// Load and validate the transaction log at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<TransactionSet, PortfolioError> {
        let data = read_to_string(path).map_err(PortfolioError::load)?;
        Self::from_string(&data)
    }

    /// Parse and validate a JSON transaction log.
    pub fn from_string(data: &str) -> Result<TransactionSet, PortfolioError> {
        let transactions =
            serde_json::from_str::<Vec<Transaction>>(data).map_err(PortfolioError::load)?;
        Self::from_records(transactions)
    }

    /// Validate already-deserialized records and build the set.
    ///
    /// Symbols are normalized to uppercase so that `aapl` and `AAPL` land in
    /// the same holding.
    pub fn from_records(
        mut transactions: Vec<Transaction>,
    ) -> Result<TransactionSet, PortfolioError> {
        for (index, tx) in transactions.iter_mut().enumerate() {
            if tx.symbol.trim().is_empty() {
                return Err(PortfolioError::invalid_transaction(
                    index,
                    "symbol must not be empty",
                ));
            }
            if tx.quantity <= 0.0 || !tx.quantity.is_finite() {
                return Err(PortfolioError::invalid_transaction(
                    index,
                    format!("quantity must be positive, got {}", tx.quantity),
                ));
            }
            if tx.cost < 0.0 || !tx.cost.is_finite() {
                return Err(PortfolioError::invalid_transaction(
                    index,
                    format!("cost cannot be negative, got {}", tx.cost),
                ));
            }
            tx.symbol = tx.symbol.trim().to_uppercase();
        }
        Ok(TransactionSet { transactions })
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All transactions in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// The "recent transactions" view: sorted by date descending, ties kept
    /// in input order. Truncating to the N most recent is the caller's job.
    pub fn records(&self) -> Vec<&Transaction> {
        let mut records: Vec<&Transaction> = self.transactions.iter().collect();
        // Vec::sort_by is stable, so same-date rows keep their input order.
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }

    /// Distinct symbols, in order of first appearance. Used to build the
    /// batched quote request.
    pub fn unique_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for tx in &self.transactions {
            if !symbols.iter().any(|s| s == &tx.symbol) {
                symbols.push(tx.symbol.clone());
            }
        }
        symbols
    }
}
