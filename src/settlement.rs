//! Team tabs ("Tribut"): what each team owes and settling it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PosError, PosResult};
use crate::models::{Transaction, TxStatus, DIRECT_SALE_TEAM_ID};
use crate::money::Money;
use crate::state::PosState;

pub const DIRECT_SALE_LABEL: &str = "Direktverkauf (Bar)";
const UNKNOWN_TEAM_LABEL: &str = "Unbekanntes Team";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team_id: String,
    pub name: String,
    /// Sum of open transactions.
    pub total_debt: Money,
    /// Sum of all transactions regardless of status.
    pub total_volume: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInvoice {
    pub team_id: String,
    pub name: String,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub open_balance: Money,
}

/// Display name for a team id on the tab views.
pub fn team_label(state: &PosState, team_id: &str) -> String {
    if team_id == DIRECT_SALE_TEAM_ID {
        return DIRECT_SALE_LABEL.to_string();
    }
    state
        .team(team_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| UNKNOWN_TEAM_LABEL.to_string())
}

/// One summary per team that has booked anything, biggest debt first, then
/// biggest volume.
pub fn team_summaries(state: &PosState) -> Vec<TeamSummary> {
    let mut map: HashMap<&str, TeamSummary> = HashMap::new();
    for tx in &state.transactions {
        let entry = map.entry(tx.team_id.as_str()).or_insert_with(|| TeamSummary {
            team_id: tx.team_id.clone(),
            name: team_label(state, &tx.team_id),
            total_debt: Money::ZERO,
            total_volume: Money::ZERO,
            count: 0,
        });
        entry.total_volume += tx.total;
        entry.count += 1;
        if tx.status == TxStatus::Open {
            entry.total_debt += tx.total;
        }
    }

    let mut summaries: Vec<TeamSummary> = map.into_values().collect();
    summaries.sort_by(|a, b| {
        b.total_debt
            .cmp(&a.total_debt)
            .then_with(|| b.total_volume.cmp(&a.total_volume))
            .then_with(|| a.name.cmp(&b.name))
    });
    summaries
}

/// Everything still owed across all teams.
pub fn total_outstanding(state: &PosState) -> Money {
    state
        .transactions
        .iter()
        .filter(|tx| tx.status == TxStatus::Open)
        .map(|tx| tx.total)
        .sum()
}

pub fn open_balance(state: &PosState, team_id: &str) -> Money {
    state
        .transactions
        .iter()
        .filter(|tx| tx.team_id == team_id && tx.status == TxStatus::Open)
        .map(|tx| tx.total)
        .sum()
}

/// Mark every open transaction of the team as settled and return the amount
/// collected.
pub fn settle_team(state: &mut PosState, team_id: &str) -> PosResult<Money> {
    let mut settled = Money::ZERO;
    let mut count = 0usize;
    for tx in state
        .transactions
        .iter_mut()
        .filter(|tx| tx.team_id == team_id && tx.status == TxStatus::Open)
    {
        tx.status = TxStatus::Settled;
        settled += tx.total;
        count += 1;
    }
    if count == 0 {
        return Err(PosError::NothingToSettle(team_label(state, team_id)));
    }
    info!(
        team_id = %team_id,
        transactions = count,
        amount_cents = settled.cents(),
        "Team tab settled"
    );
    Ok(settled)
}

/// The team's statement: all its transactions, newest first, plus what is
/// still open.
pub fn team_invoice(state: &PosState, team_id: &str) -> TeamInvoice {
    let transactions: Vec<Transaction> = state
        .transactions
        .iter()
        .rev()
        .filter(|tx| tx.team_id == team_id)
        .cloned()
        .collect();
    TeamInvoice {
        team_id: team_id.to_string(),
        name: team_label(state, team_id),
        open_balance: open_balance(state, team_id),
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{checkout, Cart, CheckoutRequest};

    fn book(state: &mut PosState, product: &str, count: u32, request: CheckoutRequest) {
        let mut cart = Cart::new();
        cart.add_many(state, product, count).unwrap();
        checkout(state, &mut cart, &request).unwrap();
    }

    fn seeded() -> PosState {
        let mut state = PosState::default();
        book(&mut state, "p1", 1, CheckoutRequest::new("acc").team("t3"));
        book(&mut state, "p3", 2, CheckoutRequest::new("acc").team("t3"));
        book(&mut state, "p1", 2, CheckoutRequest::new("acc").team("t4"));
        book(&mut state, "p2", 1, CheckoutRequest::new("cash").team("t4"));
        book(&mut state, "p4", 10, CheckoutRequest::new("cash"));
        state
    }

    #[test]
    fn test_summaries_sorted_by_debt_then_volume() {
        let state = seeded();
        let summaries = team_summaries(&state);
        assert_eq!(summaries.len(), 3);

        assert_eq!(summaries[0].team_id, "t4");
        assert_eq!(summaries[0].total_debt.cents(), 9000);
        assert_eq!(summaries[0].total_volume.cents(), 9250);
        assert_eq!(summaries[0].count, 2);

        assert_eq!(summaries[1].team_id, "t3");
        assert_eq!(summaries[1].total_debt.cents(), 5000);

        assert_eq!(summaries[2].team_id, "bar");
        assert_eq!(summaries[2].name, DIRECT_SALE_LABEL);
        assert_eq!(summaries[2].total_debt, Money::ZERO);
    }

    #[test]
    fn test_settle_team_moves_open_to_settled() {
        let mut state = seeded();
        assert_eq!(total_outstanding(&state).cents(), 14_000);

        let collected = settle_team(&mut state, "t3").unwrap();
        assert_eq!(collected.cents(), 5000);
        assert_eq!(open_balance(&state, "t3"), Money::ZERO);
        assert_eq!(total_outstanding(&state).cents(), 9000);
        assert!(state
            .transactions
            .iter()
            .filter(|tx| tx.team_id == "t3")
            .all(|tx| tx.status == TxStatus::Settled));

        // Paid cash sales of t4 are untouched by settling t4.
        settle_team(&mut state, "t4").unwrap();
        let cash_tx = state
            .transactions
            .iter()
            .find(|tx| tx.team_id == "t4" && tx.method_id == "cash")
            .unwrap();
        assert_eq!(cash_tx.status, TxStatus::Paid);
    }

    #[test]
    fn test_settle_without_debt_is_error() {
        let mut state = seeded();
        assert!(matches!(
            settle_team(&mut state, "t7"),
            Err(PosError::NothingToSettle(_))
        ));
    }

    #[test]
    fn test_invoice_lists_newest_first() {
        let state = seeded();
        let invoice = team_invoice(&state, "t4");
        assert_eq!(invoice.name, "Rock Bottom Regensburg");
        assert_eq!(invoice.transactions.len(), 2);
        assert_eq!(invoice.transactions[0].method_id, "cash");
        assert_eq!(invoice.open_balance.cents(), 9000);
    }

    #[test]
    fn test_deleted_team_shows_unknown_label() {
        let mut state = seeded();
        state.teams.retain(|t| t.id != "t3");
        let summaries = team_summaries(&state);
        let t3 = summaries.iter().find(|s| s.team_id == "t3").unwrap();
        assert_eq!(t3.name, "Unbekanntes Team");
    }
}
