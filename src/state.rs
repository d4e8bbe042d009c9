//! Root state container shared by the checkout, settlement, statistics and
//! admin operations.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::models::{
    CashLogEntry, CostConfig, EventSettings, PaymentMethod, Product, Team, Transaction,
    DIRECT_SALE_TEAM_ID,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosState {
    pub products: Vec<Product>,
    pub teams: Vec<Team>,
    pub payment_methods: Vec<PaymentMethod>,
    pub categories: Vec<String>,
    /// Booking order: the last element is the most recent transaction.
    pub transactions: Vec<Transaction>,
    /// Booking order: the last element is the most recent entry.
    pub cash_log: Vec<CashLogEntry>,
    pub costs: CostConfig,
    pub settings: EventSettings,
}

impl Default for PosState {
    fn default() -> Self {
        Self {
            products: defaults::default_products(),
            teams: defaults::default_teams(),
            payment_methods: defaults::default_payment_methods(),
            categories: defaults::default_categories(),
            transactions: Vec::new(),
            cash_log: Vec::new(),
            costs: CostConfig::default(),
            settings: EventSettings::default(),
        }
    }
}

impl PosState {
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn team(&self, id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn payment_method(&self, id: &str) -> Option<&PaymentMethod> {
        self.payment_methods.iter().find(|m| m.id == id)
    }

    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    pub fn active_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|t| t.active)
    }

    pub fn active_payment_methods(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.payment_methods.iter().filter(|m| m.active)
    }

    pub fn is_internal_team(&self, team_id: &str) -> bool {
        self.settings.is_internal_team(team_id)
    }

    /// Resolve a user-supplied team reference: exact id first, then a
    /// case-insensitive name match. `bar` resolves to the direct-sale id.
    pub fn resolve_team_id(&self, reference: &str) -> Option<String> {
        let needle = reference.trim();
        if needle.eq_ignore_ascii_case(DIRECT_SALE_TEAM_ID) {
            return Some(DIRECT_SALE_TEAM_ID.to_string());
        }
        if let Some(team) = self.team(needle) {
            return Some(team.id.clone());
        }
        self.teams
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(needle))
            .map(|t| t.id.clone())
    }

    /// Resolve a product by id or case-insensitive name.
    pub fn resolve_product_id(&self, reference: &str) -> Option<String> {
        let needle = reference.trim();
        if let Some(p) = self.product(needle) {
            return Some(p.id.clone());
        }
        self.products
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(needle))
            .map(|p| p.id.clone())
    }

    /// Clear the event ledger ("Kasse nullen"): transactions, cash log and the
    /// rent booking flag. Catalog, teams and cost settings stay.
    pub fn reset_event(&mut self) {
        self.transactions.clear();
        self.cash_log.clear();
        self.costs.rent_paid = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CashLogType;
    use crate::money::Money;
    use chrono::Utc;

    #[test]
    fn test_resolve_team_by_id_name_and_bar() {
        let state = PosState::default();
        assert_eq!(state.resolve_team_id("t3").as_deref(), Some("t3"));
        assert_eq!(
            state.resolve_team_id("raptors landshut").as_deref(),
            Some("t5")
        );
        assert_eq!(state.resolve_team_id("BAR").as_deref(), Some("bar"));
        assert!(state.resolve_team_id("nobody").is_none());
    }

    #[test]
    fn test_reset_event_keeps_catalog() {
        let mut state = PosState::default();
        state.costs.rent_paid = true;
        state.cash_log.push(CashLogEntry {
            id: "ex1".into(),
            amount: Money::from_cents(100),
            description: "Eis".into(),
            timestamp: Utc::now(),
            kind: CashLogType::Expense,
        });
        state.reset_event();
        assert!(state.cash_log.is_empty());
        assert!(!state.costs.rent_paid);
        assert_eq!(state.products.len(), 12);
    }
}
