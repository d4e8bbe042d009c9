//! Transaction list management: undo, storno and the admin search.

use tracing::info;

use crate::error::{PosError, PosResult};
use crate::models::{Transaction, TxStatus};
use crate::money::Money;
use crate::state::PosState;

/// Search criteria of the transaction manager. Every `None` field matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Case-insensitive match against the team name or any item name.
    pub search: Option<String>,
    pub status: Option<TxStatus>,
    pub method_id: Option<String>,
    pub min_total: Option<Money>,
    pub max_total: Option<Money>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let in_name = tx.team_name.to_lowercase().contains(&term);
            let in_items = tx
                .items
                .iter()
                .any(|i| i.name.to_lowercase().contains(&term));
            if !in_name && !in_items {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != tx.status) {
            return false;
        }
        if self
            .method_id
            .as_deref()
            .is_some_and(|m| m != tx.method_id)
        {
            return false;
        }
        if self.min_total.is_some_and(|min| tx.total < min) {
            return false;
        }
        if self.max_total.is_some_and(|max| tx.total > max) {
            return false;
        }
        true
    }
}

/// Remove the most recent transaction.
pub fn undo_last(state: &mut PosState) -> PosResult<Transaction> {
    let tx = state.transactions.pop().ok_or(PosError::NothingToUndo)?;
    info!(tx_id = %tx.id, total_cents = tx.total.cents(), "Last transaction undone");
    Ok(tx)
}

/// Cancel a specific transaction (storno).
pub fn delete_transaction(state: &mut PosState, id: &str) -> PosResult<Transaction> {
    let idx = state
        .transactions
        .iter()
        .position(|tx| tx.id == id)
        .ok_or_else(|| PosError::TransactionNotFound(id.to_string()))?;
    let tx = state.transactions.remove(idx);
    info!(tx_id = %tx.id, total_cents = tx.total.cents(), "Transaction cancelled");
    Ok(tx)
}

/// Matching transactions, newest first.
pub fn filter_transactions<'a>(
    state: &'a PosState,
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    state
        .transactions
        .iter()
        .rev()
        .filter(|tx| filter.matches(tx))
        .collect()
}

/// The `n` most recent transactions, newest first.
pub fn recent(state: &PosState, n: usize) -> Vec<&Transaction> {
    state.transactions.iter().rev().take(n).collect()
}
