use crate::error::PortfolioError;
use crate::quotes::QuoteMap;
use crate::transaction::TransactionSet;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Per-symbol cost basis, before any live price is known.
#[derive(Debug, Clone)]
pub struct CostBasis {
    symbol: String,
    total_quantity: f64,
    total_cost: f64,
}

impl CostBasis {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_quantity(&self) -> f64 {
        self.total_quantity
    }

    /// Book cost of the holding: everything paid to acquire it.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    // total_quantity > 0 is guaranteed by load-time validation.
    pub fn average_cost(&self) -> f64 {
        self.total_cost / self.total_quantity
    }
}

/// One fully valued row of the portfolio overview.
#[derive(Debug, Clone)]
pub struct HoldingSummary {
    pub symbol: String,
    pub total_quantity: f64,
    pub average_cost: f64,
    pub book_cost: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub pct_change: f64,
    pub unrealized_gain_loss: f64,
}

/// Scalar rollups across all holdings. Values carry full precision;
/// rounding happens at display time only.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioTotals {
    pub book_cost: f64,
    pub market_value: f64,
    pub unrealized_gain_loss: f64,
}

/// Group transactions by symbol and accumulate quantity and cost.
///
/// Produces exactly one entry per distinct symbol; the accumulation is
/// independent of input order. An empty transaction set has no meaningful
/// portfolio and is rejected.
pub fn aggregate(
    transactions: &TransactionSet,
) -> Result<HashMap<String, CostBasis>, PortfolioError> {
    if transactions.is_empty() {
        return Err(PortfolioError::EmptyPortfolio);
    }

    let mut basis: HashMap<String, CostBasis> = HashMap::new();
    for tx in transactions.iter() {
        let entry = basis
            .entry(tx.symbol().to_string())
            .or_insert_with(|| CostBasis {
                symbol: tx.symbol().to_string(),
                total_quantity: 0.0,
                total_cost: 0.0,
            });
        entry.total_quantity += tx.quantity();
        entry.total_cost += tx.cost_total();
    }
    Ok(basis)
}

/// Merge live prices into the cost-basis rows and compute valuations.
///
/// A symbol that is missing from the quote map, or whose price does not
/// parse as a number, is priced at its own average cost. That makes its
/// unrealized gain/loss read as zero rather than dropping the row or
/// failing the whole batch.
pub fn apply_quotes(basis: HashMap<String, CostBasis>, quotes: &QuoteMap) -> Holdings {
    let summaries = basis
        .into_values()
        .map(|cb| {
            let current_price = quotes
                .get(cb.symbol())
                .and_then(|q| q.parsed_price())
                .unwrap_or_else(|| cb.average_cost());
            let market_value = current_price * cb.total_quantity();
            HoldingSummary {
                market_value,
                pct_change: (market_value / cb.total_cost() - 1.0) * 100.0,
                unrealized_gain_loss: market_value - cb.total_cost(),
                current_price,
                average_cost: cb.average_cost(),
                book_cost: cb.total_cost(),
                total_quantity: cb.total_quantity(),
                symbol: cb.symbol,
            }
        })
        .collect();
    Holdings { summaries }
}

/// The valued portfolio: one `HoldingSummary` per symbol.
#[derive(Debug)]
pub struct Holdings {
    summaries: Vec<HoldingSummary>,
}

impl Holdings {
    /// Overview rows sorted by market value descending. Equal market values
    /// fall back to symbol order so the display is deterministic. With
    /// `top_n`, only the first N rows are returned.
    pub fn overview(&self, top_n: Option<usize>) -> Vec<&HoldingSummary> {
        let mut rows: Vec<&HoldingSummary> = self.summaries.iter().collect();
        rows.sort_by(|a, b| {
            b.market_value
                .partial_cmp(&a.market_value)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        if let Some(n) = top_n {
            rows.truncate(n);
        }
        rows
    }

    pub fn totals(&self) -> PortfolioTotals {
        let book_cost: f64 = self.summaries.iter().map(|h| h.book_cost).sum();
        let market_value: f64 = self.summaries.iter().map(|h| h.market_value).sum();
        PortfolioTotals {
            book_cost,
            market_value,
            unrealized_gain_loss: market_value - book_cost,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}
