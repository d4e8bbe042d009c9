//! Persisted record types.
//!
//! Field names serialize in camelCase so that snapshots and config exports
//! keep the shape the handheld app has always written.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Payment method id for cash sales.
pub const CASH_METHOD_ID: &str = "cash";
/// Payment method id for the default "on account" method.
pub const ACCOUNT_METHOD_ID: &str = "acc";
/// Reserved method id for internal-team consumption. Never stored as a method.
pub const INTERNAL_METHOD_ID: &str = "internal";
/// Pseudo team id for anonymous direct sales.
pub const DIRECT_SALE_TEAM_ID: &str = "bar";
/// Team name written on anonymous direct sales.
pub const DIRECT_SALE_NAME: &str = "DIREKTVERKAUF (BAR)";
/// Team name of a direct sale paid with anything but cash.
pub const DIRECT_SALE_OTHER_NAME: &str = "DIREKTVERKAUF";
/// Category products fall back to when theirs is deleted.
pub const FALLBACK_CATEGORY: &str = "ALLGEMEIN";
/// Filter value meaning "no filter".
pub const FILTER_ALL: &str = "ALLE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Product {
    /// Case-insensitive category match, as categories are stored upper-case
    /// but older products may carry mixed case.
    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(category))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Money received at the counter.
    Paid,
    /// Booked on the team's tab.
    Open,
    /// Tab entry paid later.
    Settled,
}

impl TxStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TxStatus::Paid => "paid",
            TxStatus::Open => "open",
            TxStatus::Settled => "settled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => Some(TxStatus::Paid),
            "open" => Some(TxStatus::Open),
            "settled" => Some(TxStatus::Settled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub requires_team: bool,
    pub initial_status: TxStatus,
}

/// A cart line: the product as it was at sale time plus a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub count: u32,
}

impl LineItem {
    pub fn from_product(product: &Product, count: u32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            category: product.category.clone(),
            count,
        }
    }

    pub fn line_total(&self) -> Money {
        self.price.times(self.count)
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category
            .as_deref()
            .map(|c| c.eq_ignore_ascii_case(category))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub items: Vec<LineItem>,
    pub total: Money,
    /// Payment method id, or [`INTERNAL_METHOD_ID`].
    #[serde(rename = "type")]
    pub method_id: String,
    pub team_id: String,
    pub team_name: String,
    pub status: TxStatus,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn is_cash(&self) -> bool {
        self.method_id == CASH_METHOD_ID
    }

    pub fn is_internal_method(&self) -> bool {
        self.method_id == INTERNAL_METHOD_ID
    }

    /// Counts towards the physical cash box: paid in cash at the counter, or
    /// a tab that was settled (tabs are settled in cash).
    pub fn is_cash_inflow(&self) -> bool {
        (self.status == TxStatus::Paid && self.is_cash()) || self.status == TxStatus::Settled
    }

    pub fn date_str(&self) -> String {
        local_date_str(self.timestamp)
    }

    pub fn time_str(&self) -> String {
        local_time_str(self.timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashLogType {
    /// Money spent out of the cash box (counts as a cost).
    #[default]
    Expense,
    /// Change money put into the cash box by the owner.
    Deposit,
    /// Change money returned to the owner.
    Withdraw,
}

impl CashLogType {
    pub fn as_str(self) -> &'static str {
        match self {
            CashLogType::Expense => "expense",
            CashLogType::Deposit => "deposit",
            CashLogType::Withdraw => "withdraw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashLogEntry {
    pub id: String,
    pub amount: Money,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, rename = "type")]
    pub kind: CashLogType,
}

impl CashLogEntry {
    pub fn time_str(&self) -> String {
        local_time_str(self.timestamp)
    }
}

/// Cost side of the profit calculation plus the rent booking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostConfig {
    /// Automatic rent booking: offer to book the rent once the cash box
    /// can cover it.
    pub active: bool,
    pub paint_cost_per_box: Money,
    pub rent_cost: Money,
    pub food_cost: Money,
    pub rent_paid: bool,
    pub custom_cost_name: String,
    pub custom_cost_amount: Money,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            active: false,
            paint_cost_per_box: Money::ZERO,
            rent_cost: Money::ZERO,
            food_cost: Money::ZERO,
            rent_paid: false,
            custom_cost_name: String::new(),
            custom_cost_amount: Money::ZERO,
        }
    }
}

impl CostConfig {
    pub fn custom_cost_label(&self) -> &str {
        let name = self.custom_cost_name.trim();
        if name.is_empty() {
            "Sonstiges"
        } else {
            name
        }
    }
}

/// Event-level settings that used to be hard-wired into the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventSettings {
    /// Teams whose consumption is booked at zero payment (organisers, staff).
    pub internal_team_ids: Vec<String>,
    /// Category whose item counts drive the paint cost of goods.
    pub paint_category: String,
    /// Cash the box must hold on top of the rent before rent booking is offered.
    pub rent_buffer: Money,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            internal_team_ids: vec!["t1".to_string(), "t2".to_string()],
            paint_category: "PAINT".to_string(),
            rent_buffer: Money::from_cents(5_000),
        }
    }
}

impl EventSettings {
    pub fn is_internal_team(&self, team_id: &str) -> bool {
        self.internal_team_ids.iter().any(|id| id == team_id)
    }
}

fn default_true() -> bool {
    true
}

pub(crate) fn local_date_str(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d.%m.%Y").to_string()
}

pub(crate) fn local_time_str(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cash_log_entry_without_type_is_expense() {
        let entry: CashLogEntry = serde_json::from_value(json!({
            "id": "ex1",
            "amount": 12.5,
            "description": "Grillkohle",
            "timestamp": "2026-01-12T10:00:00Z",
        }))
        .unwrap();
        assert_eq!(entry.kind, CashLogType::Expense);
        assert_eq!(entry.amount.cents(), 1250);
    }

    #[test]
    fn test_cost_config_fills_missing_fields() {
        let cfg: CostConfig = serde_json::from_value(json!({ "rentCost": 300 })).unwrap();
        assert_eq!(cfg.rent_cost.cents(), 30_000);
        assert!(!cfg.rent_paid);
        assert_eq!(cfg.custom_cost_label(), "Sonstiges");
    }

    #[test]
    fn test_transaction_serializes_method_as_type() {
        let tx = Transaction {
            id: "tx-1".into(),
            items: vec![],
            total: Money::from_cents(250),
            method_id: CASH_METHOD_ID.into(),
            team_id: DIRECT_SALE_TEAM_ID.into(),
            team_name: DIRECT_SALE_NAME.into(),
            status: TxStatus::Paid,
            timestamp: "2026-01-12T10:00:00Z".parse().unwrap(),
        };
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["type"], "cash");
        assert_eq!(v["teamId"], "bar");
        assert_eq!(v["status"], "paid");
        assert!(tx.is_cash_inflow());
    }

    #[test]
    fn test_settled_tab_counts_as_cash_inflow() {
        let mut tx = Transaction {
            id: "tx-2".into(),
            items: vec![],
            total: Money::from_cents(900),
            method_id: ACCOUNT_METHOD_ID.into(),
            team_id: "t3".into(),
            team_name: "EP Brothers Dornbirn".into(),
            status: TxStatus::Open,
            timestamp: Utc::now(),
        };
        assert!(!tx.is_cash_inflow());
        tx.status = TxStatus::Settled;
        assert!(tx.is_cash_inflow());
    }
}
