//! Report engine: folds the transaction list and the cash log into the
//! figures on the statistics screen.
//!
//! Profit:
//!   gross revenue - manual expenses - internal consumption - paint cost
//!   - food cost - rent (unless already booked as an expense) - custom cost
//!
//! War chest (cash that should be in the box):
//!   cash revenue + deposits - manual expenses - withdrawals
//!
//! where cash revenue counts cash sales that were paid at the counter and
//! every settled tab.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CashLogEntry, CashLogType, Transaction, TxStatus, FILTER_ALL};
use crate::money::Money;
use crate::settlement::team_label;
use crate::state::PosState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub transaction_count: usize,
    pub gross_revenue: Money,
    pub manual_expenses: Money,
    pub internal_consumption: Money,
    pub paint_boxes_sold: u32,
    pub paint_cost: Money,
    pub food_cost: Money,
    pub custom_cost_name: String,
    pub custom_cost: Money,
    /// Rent still to be covered: zero once it has been booked as an expense.
    pub rent_for_balance: Money,
    pub net_profit: Money,
    pub cash_revenue: Money,
    pub deposits: Money,
    pub withdrawals: Money,
    pub war_chest: Money,
}

impl FinancialSummary {
    /// Everything that left the business: cash expenses plus internal
    /// consumption at sales value.
    pub fn total_outflow(&self) -> Money {
        self.manual_expenses + self.internal_consumption
    }
}

pub fn gross_revenue(transactions: &[Transaction]) -> Money {
    transactions.iter().map(|tx| tx.total).sum()
}

pub fn cash_log_total(entries: &[CashLogEntry], kind: CashLogType) -> Money {
    entries
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.amount)
        .sum()
}

pub fn is_internal_consumption(state: &PosState, tx: &Transaction) -> bool {
    tx.is_internal_method() || state.is_internal_team(&tx.team_id)
}

pub fn internal_consumption(state: &PosState) -> Money {
    state
        .transactions
        .iter()
        .filter(|tx| is_internal_consumption(state, tx))
        .map(|tx| tx.total)
        .sum()
}

pub fn paint_boxes_sold(state: &PosState) -> u32 {
    let paint = state.settings.paint_category.as_str();
    state
        .transactions
        .iter()
        .flat_map(|tx| tx.items.iter())
        .filter(|item| item.in_category(paint))
        .map(|item| item.count)
        .sum()
}

pub fn cash_revenue(transactions: &[Transaction]) -> Money {
    transactions
        .iter()
        .filter(|tx| tx.is_cash_inflow())
        .map(|tx| tx.total)
        .sum()
}

pub fn war_chest(state: &PosState) -> Money {
    cash_revenue(&state.transactions) + cash_log_total(&state.cash_log, CashLogType::Deposit)
        - cash_log_total(&state.cash_log, CashLogType::Expense)
        - cash_log_total(&state.cash_log, CashLogType::Withdraw)
}

pub fn summarize(state: &PosState) -> FinancialSummary {
    let costs = &state.costs;

    let gross_revenue = gross_revenue(&state.transactions);
    let manual_expenses = cash_log_total(&state.cash_log, CashLogType::Expense);
    let internal_consumption = internal_consumption(state);

    let paint_boxes_sold = paint_boxes_sold(state);
    let paint_cost = costs.paint_cost_per_box.times(paint_boxes_sold);
    let rent_for_balance = if costs.rent_paid {
        Money::ZERO
    } else {
        costs.rent_cost
    };

    let net_profit = gross_revenue
        - manual_expenses
        - internal_consumption
        - paint_cost
        - costs.food_cost
        - rent_for_balance
        - costs.custom_cost_amount;

    let cash_revenue = cash_revenue(&state.transactions);
    let deposits = cash_log_total(&state.cash_log, CashLogType::Deposit);
    let withdrawals = cash_log_total(&state.cash_log, CashLogType::Withdraw);
    let war_chest = cash_revenue + deposits - manual_expenses - withdrawals;

    FinancialSummary {
        transaction_count: state.transactions.len(),
        gross_revenue,
        manual_expenses,
        internal_consumption,
        paint_boxes_sold,
        paint_cost,
        food_cost: costs.food_cost,
        custom_cost_name: costs.custom_cost_label().to_string(),
        custom_cost: costs.custom_cost_amount,
        rent_for_balance,
        net_profit,
        cash_revenue,
        deposits,
        withdrawals,
        war_chest,
    }
}

// ---------------------------------------------------------------------------
// Team statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TeamStatsFilter {
    /// Category name, `None` or `ALLE` for all.
    pub category: Option<String>,
    /// Product id, `None` or `ALLE` for all.
    pub product_id: Option<String>,
}

impl TeamStatsFilter {
    fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(FILTER_ALL))
    }

    fn product_id(&self) -> Option<&str> {
        self.product_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(FILTER_ALL))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category().is_none() && self.product_id().is_none()
    }

    /// The part of the transaction's value that passes the filter.
    fn value_of(&self, tx: &Transaction) -> Money {
        if self.is_unfiltered() {
            return tx.total;
        }
        let category = self.category();
        let product = self.product_id();
        tx.items
            .iter()
            .filter(|item| category.map_or(true, |c| item.in_category(c)))
            .filter(|item| product.map_or(true, |p| item.id == p))
            .map(|item| item.line_total())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStat {
    pub team_id: String,
    pub name: String,
    pub value: Money,
    /// Transactions that contributed a non-zero value.
    pub count: usize,
}

/// Revenue per team under the filter, best team first. Teams without any
/// matching value are left out.
pub fn team_stats(state: &PosState, filter: &TeamStatsFilter) -> Vec<TeamStat> {
    let mut by_team: HashMap<&str, TeamStat> = HashMap::new();
    for tx in &state.transactions {
        let value = filter.value_of(tx);
        if !value.is_positive() {
            continue;
        }
        let stat = by_team.entry(tx.team_id.as_str()).or_insert_with(|| TeamStat {
            team_id: tx.team_id.clone(),
            name: team_label(state, &tx.team_id),
            value: Money::ZERO,
            count: 0,
        });
        stat.value += value;
        stat.count += 1;
    }
    let mut stats: Vec<TeamStat> = by_team.into_values().collect();
    stats.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    stats
}

// ---------------------------------------------------------------------------
// Journal and expense timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalKind {
    Sale,
    OpenInvoice,
    Internal,
    Expense,
    Deposit,
    Withdrawal,
}

impl JournalKind {
    pub fn label(self) -> &'static str {
        match self {
            JournalKind::Sale => "VERKAUF",
            JournalKind::OpenInvoice => "RECHNUNG (OFFEN)",
            JournalKind::Internal => "INTERN",
            JournalKind::Expense => "AUSGABE",
            JournalKind::Deposit => "EINLAGE",
            JournalKind::Withdrawal => "ENTNAHME",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: JournalKind,
    pub description: String,
    pub amount: Money,
    /// Inflow (`+`) or outflow (`-`).
    pub inflow: bool,
}

impl JournalEntry {
    pub fn signed_amount(&self) -> Money {
        if self.inflow {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journal {
    /// Newest first.
    pub entries: Vec<JournalEntry>,
    pub total_in: Money,
    pub total_out: Money,
    pub net: Money,
}

fn transaction_entry(tx: &Transaction) -> JournalEntry {
    let kind = if tx.is_internal_method() {
        JournalKind::Internal
    } else if tx.status == TxStatus::Open {
        JournalKind::OpenInvoice
    } else {
        JournalKind::Sale
    };
    JournalEntry {
        id: tx.id.clone(),
        timestamp: tx.timestamp,
        kind,
        description: format!("{} ({} Pos.)", tx.team_name, tx.items.len()),
        amount: tx.total,
        inflow: true,
    }
}

fn cash_log_entry(entry: &CashLogEntry) -> JournalEntry {
    let (kind, inflow) = match entry.kind {
        CashLogType::Expense => (JournalKind::Expense, false),
        CashLogType::Deposit => (JournalKind::Deposit, true),
        CashLogType::Withdraw => (JournalKind::Withdrawal, false),
    };
    JournalEntry {
        id: entry.id.clone(),
        timestamp: entry.timestamp,
        kind,
        description: entry.description.clone(),
        amount: entry.amount,
        inflow,
    }
}

/// The complete event journal: every transaction and every cash-log entry.
pub fn journal(state: &PosState) -> Journal {
    let mut entries: Vec<JournalEntry> = state
        .transactions
        .iter()
        .map(transaction_entry)
        .chain(state.cash_log.iter().map(cash_log_entry))
        .collect();
    entries.sort_by_key(|e| Reverse(e.timestamp));

    let total_in: Money = entries.iter().filter(|e| e.inflow).map(|e| e.amount).sum();
    let total_out: Money = entries.iter().filter(|e| !e.inflow).map(|e| e.amount).sum();
    Journal {
        entries,
        total_in,
        total_out,
        net: total_in - total_out,
    }
}

/// Expense detail view: cash expenses, internal consumption, deposits and
/// withdrawals, newest first.
pub fn expense_timeline(state: &PosState) -> Vec<JournalEntry> {
    let mut entries: Vec<JournalEntry> = state
        .cash_log
        .iter()
        .map(cash_log_entry)
        .chain(
            state
                .transactions
                .iter()
                .filter(|tx| is_internal_consumption(state, tx))
                .map(|tx| JournalEntry {
                    kind: JournalKind::Internal,
                    description: tx.team_name.clone(),
                    inflow: false,
                    ..transaction_entry(tx)
                }),
        )
        .collect();
    entries.sort_by_key(|e| Reverse(e.timestamp));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, CASH_METHOD_ID, INTERNAL_METHOD_ID};
    use chrono::TimeZone;

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 12, 10, minute, 0).unwrap()
    }

    fn item(id: &str, cents: i64, count: u32, category: &str) -> LineItem {
        LineItem {
            id: id.into(),
            name: id.into(),
            price: Money::from_cents(cents),
            category: Some(category.into()),
            count,
        }
    }

    fn tx(
        id: &str,
        method: &str,
        team: &str,
        status: TxStatus,
        items: Vec<LineItem>,
        minute: u32,
    ) -> Transaction {
        let total = items.iter().map(LineItem::line_total).sum();
        Transaction {
            id: id.into(),
            items,
            total,
            method_id: method.into(),
            team_id: team.into(),
            team_name: team.into(),
            status,
            timestamp: ts(minute),
        }
    }

    fn log(id: &str, kind: CashLogType, cents: i64, minute: u32) -> CashLogEntry {
        CashLogEntry {
            id: id.into(),
            amount: Money::from_cents(cents),
            description: id.into(),
            timestamp: ts(minute),
            kind,
        }
    }

    /// Two paint boxes cash, one paint box on account (later settled), one
    /// beer on account still open, internal coffee for t1, cash log with an
    /// expense, a deposit and a withdrawal.
    fn event() -> PosState {
        let mut state = PosState::default();
        state.transactions = vec![
            tx("a", CASH_METHOD_ID, "bar", TxStatus::Paid, vec![item("p1", 4500, 2, "PAINT")], 1),
            tx("b", "acc", "t3", TxStatus::Settled, vec![item("p1", 4500, 1, "PAINT")], 2),
            tx("c", "acc", "t4", TxStatus::Open, vec![item("p3", 250, 4, "ALKOHOLISCHE GETRÄNKE")], 3),
            tx("d", INTERNAL_METHOD_ID, "t1", TxStatus::Paid, vec![item("p4", 100, 3, "GETRÄNKE ALKOHLOFREI")], 4),
        ];
        state.cash_log = vec![
            log("dep", CashLogType::Deposit, 10_000, 0),
            log("exp", CashLogType::Expense, 2_000, 5),
            log("wd", CashLogType::Withdraw, 5_000, 6),
        ];
        state.costs.paint_cost_per_box = Money::from_cents(3_000);
        state.costs.food_cost = Money::from_cents(1_500);
        state.costs.rent_cost = Money::from_cents(10_000);
        state.costs.custom_cost_name = "Strom".into();
        state.costs.custom_cost_amount = Money::from_cents(500);
        state
    }

    #[test]
    fn test_summary_figures() {
        let state = event();
        let s = summarize(&state);

        // 9000 + 4500 + 1000 + 300
        assert_eq!(s.gross_revenue.cents(), 14_800);
        assert_eq!(s.manual_expenses.cents(), 2_000);
        assert_eq!(s.internal_consumption.cents(), 300);
        assert_eq!(s.paint_boxes_sold, 3);
        assert_eq!(s.paint_cost.cents(), 9_000);
        assert_eq!(s.rent_for_balance.cents(), 10_000);
        assert_eq!(s.custom_cost_name, "Strom");
        // 14800 - 2000 - 300 - 9000 - 1500 - 10000 - 500
        assert_eq!(s.net_profit.cents(), -8_500);

        // cash sale + settled tab
        assert_eq!(s.cash_revenue.cents(), 13_500);
        assert_eq!(s.deposits.cents(), 10_000);
        assert_eq!(s.withdrawals.cents(), 5_000);
        // 13500 + 10000 - 2000 - 5000
        assert_eq!(s.war_chest.cents(), 16_500);
        assert_eq!(war_chest(&state), s.war_chest);
        assert_eq!(s.total_outflow().cents(), 2_300);
    }

    #[test]
    fn test_paid_rent_is_not_counted_twice() {
        let mut state = event();
        state.costs.rent_paid = true;
        state
            .cash_log
            .push(log("rent", CashLogType::Expense, 10_000, 7));
        let s = summarize(&state);
        assert_eq!(s.rent_for_balance, Money::ZERO);
        assert_eq!(s.manual_expenses.cents(), 12_000);
        // Same profit as before: the rent moved from the calculated line into
        // the booked expenses.
        assert_eq!(s.net_profit.cents(), -8_500);
    }

    #[test]
    fn test_internal_team_counts_even_with_other_method() {
        let mut state = event();
        state.transactions.push(tx(
            "e",
            CASH_METHOD_ID,
            "t2",
            TxStatus::Paid,
            vec![item("p9", 50, 2, "ESSEN")],
            8,
        ));
        assert_eq!(internal_consumption(&state).cents(), 400);
    }

    #[test]
    fn test_paint_category_is_configurable() {
        let mut state = event();
        state.settings.paint_category = "ALKOHOLISCHE GETRÄNKE".into();
        assert_eq!(paint_boxes_sold(&state), 4);
    }

    #[test]
    fn test_empty_event_is_all_zero() {
        let state = PosState::default();
        let s = summarize(&state);
        assert_eq!(s.gross_revenue, Money::ZERO);
        assert_eq!(s.war_chest, Money::ZERO);
        assert_eq!(s.net_profit, Money::ZERO);
        assert!(journal(&state).entries.is_empty());
    }

    #[test]
    fn test_team_stats_unfiltered_and_filtered() {
        let state = event();
        let all = team_stats(&state, &TeamStatsFilter::default());
        assert_eq!(all[0].team_id, "bar");
        assert_eq!(all[0].value.cents(), 9_000);
        assert_eq!(all.len(), 4);

        let paint = team_stats(
            &state,
            &TeamStatsFilter {
                category: Some("paint".into()),
                product_id: Some("ALLE".into()),
            },
        );
        assert_eq!(paint.len(), 2);
        assert_eq!(paint[1].team_id, "t3");
        assert_eq!(paint[1].name, "EP Brothers Dornbirn");

        let beer = team_stats(
            &state,
            &TeamStatsFilter {
                category: None,
                product_id: Some("p3".into()),
            },
        );
        assert_eq!(beer.len(), 1);
        assert_eq!(beer[0].value.cents(), 1_000);
        assert_eq!(beer[0].count, 1);
    }

    #[test]
    fn test_journal_order_and_totals() {
        let state = event();
        let j = journal(&state);
        assert_eq!(j.entries.len(), 7);
        assert_eq!(j.entries[0].id, "wd");
        assert_eq!(j.entries[6].id, "dep");
        assert_eq!(j.entries[2].kind, JournalKind::Internal);
        assert_eq!(j.entries[3].kind, JournalKind::OpenInvoice);
        // Transaction entries carry the transaction id unchanged.
        assert_eq!(j.entries[2].id, "d");
        assert_eq!(j.entries[3].id, "c");

        // all four transactions + deposit
        assert_eq!(j.total_in.cents(), 24_800);
        // expense + withdrawal
        assert_eq!(j.total_out.cents(), 7_000);
        assert_eq!(j.net.cents(), 17_800);
        assert_eq!(j.entries[0].signed_amount().cents(), -5_000);
    }

    #[test]
    fn test_expense_timeline() {
        let state = event();
        let timeline = expense_timeline(&state);
        let ids: Vec<&str> = timeline.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["wd", "exp", "tx-d", "dep"]);
        assert!(!timeline[2].inflow);
        assert_eq!(timeline[2].description, "t1");
    }
}
