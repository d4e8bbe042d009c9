//! Cart and checkout: turns a cart into a booked transaction.
//!
//! Booking rules, in the order they are checked:
//! 1. an empty cart is rejected;
//! 2. the payment method must exist and be active (`internal` is reserved
//!    for internal-team consumption and always available to those teams);
//! 3. internal teams book only internal consumption, and internal
//!    consumption is only for internal teams;
//! 4. cash without a team becomes an anonymous direct sale;
//! 5. methods that require a team refuse a missing team or a direct sale;
//! 6. the team must exist;
//! 7. internal consumption is `paid`, everything else starts in the
//!    method's initial status;
//! 8. cash tendered must cover the total, the difference is the change.

use chrono::Utc;
use tracing::{info, warn};

use crate::catalog;
use crate::error::{PosError, PosResult};
use crate::models::{
    LineItem, Transaction, TxStatus, CASH_METHOD_ID, DIRECT_SALE_NAME, DIRECT_SALE_OTHER_NAME,
    DIRECT_SALE_TEAM_ID, INTERNAL_METHOD_ID,
};
use crate::money::Money;
use crate::new_id;
use crate::state::PosState;

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an active product.
    pub fn add(&mut self, state: &PosState, product_id: &str) -> PosResult<()> {
        self.add_many(state, product_id, 1)
    }

    pub fn add_many(&mut self, state: &PosState, product_id: &str, count: u32) -> PosResult<()> {
        let product = state
            .product(product_id)
            .ok_or_else(|| PosError::UnknownProduct(product_id.to_string()))?;
        if !product.active {
            return Err(PosError::InactiveProduct(product.name.clone()));
        }
        if count == 0 {
            return Ok(());
        }
        let too_large = || PosError::QuantityTooLarge(product.name.clone());
        let new_count = self
            .count_of(&product.id)
            .checked_add(count)
            .ok_or_else(too_large)?;
        // The cart total must stay representable once the line grows.
        let line_total = product.price.checked_times(new_count).ok_or_else(too_large)?;
        self.items
            .iter()
            .filter(|i| i.id != product.id)
            .try_fold(line_total, |acc, i| {
                i.price.checked_times(i.count).and_then(|t| acc.checked_add(t))
            })
            .ok_or_else(too_large)?;

        match self.items.iter_mut().find(|i| i.id == product.id) {
            Some(line) => line.count = new_count,
            None => self.items.push(LineItem::from_product(product, count)),
        }
        Ok(())
    }

    /// Remove one unit; the line disappears when its count reaches zero.
    pub fn remove_one(&mut self, product_id: &str) {
        if let Some(idx) = self.items.iter().position(|i| i.id == product_id) {
            if self.items[idx].count > 1 {
                self.items[idx].count -= 1;
            } else {
                self.items.remove(idx);
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn count_of(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .find(|i| i.id == product_id)
            .map(|i| i.count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Stored payment method id, or `internal`.
    pub method_id: String,
    /// Team id, `bar` for an explicit direct sale, `None` for no selection.
    pub team_id: Option<String>,
    /// Cash handed over by the customer, for the change calculation.
    pub tendered: Option<Money>,
}

impl CheckoutRequest {
    pub fn new(method_id: impl Into<String>) -> Self {
        Self {
            method_id: method_id.into(),
            team_id: None,
            tendered: None,
        }
    }

    pub fn team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn tendered(mut self, amount: Money) -> Self {
        self.tendered = Some(amount);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub transaction: Transaction,
    /// Change to hand back when cash was tendered.
    pub change: Option<Money>,
    /// Confirmation line for the operator ("BAR GEBUCHT!").
    pub message: String,
}

/// Change for a cash sale. Negative means the customer is short.
pub fn change_due(total: Money, tendered: Money) -> Money {
    tendered - total
}

/// Book the cart. On success the transaction is appended to the state and
/// the cart is emptied; on error neither is touched.
pub fn checkout(
    state: &mut PosState,
    cart: &mut Cart,
    request: &CheckoutRequest,
) -> PosResult<Receipt> {
    if cart.is_empty() {
        return Err(PosError::EmptyCart);
    }

    let method_id = request.method_id.trim();
    let is_internal = method_id == INTERNAL_METHOD_ID;
    let method = if is_internal {
        None
    } else {
        let m = state
            .payment_method(method_id)
            .ok_or_else(|| PosError::UnknownPaymentMethod(method_id.to_string()))?;
        if !m.active {
            return Err(PosError::InactivePaymentMethod(m.name.clone()));
        }
        Some(m.clone())
    };

    let selected = request
        .team_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match selected {
        Some(team) if state.is_internal_team(team) && !is_internal => {
            warn!(team_id = %team, method_id = %method_id, "Internal team tried a paid checkout");
            return Err(PosError::InternalOnly(team.to_string()));
        }
        Some(team) if is_internal && !state.is_internal_team(team) => {
            return Err(PosError::NotAnInternalTeam);
        }
        None if is_internal => return Err(PosError::NotAnInternalTeam),
        _ => {}
    }

    if let Some(m) = &method {
        if m.requires_team && selected.map_or(true, |t| t == DIRECT_SALE_TEAM_ID) {
            return Err(PosError::TeamRequired(m.name.clone()));
        }
    }

    let (team_id, team_name) = match selected {
        None | Some(DIRECT_SALE_TEAM_ID) => {
            let name = if method_id == CASH_METHOD_ID {
                DIRECT_SALE_NAME
            } else {
                DIRECT_SALE_OTHER_NAME
            };
            (DIRECT_SALE_TEAM_ID.to_string(), name.to_string())
        }
        Some(id) => {
            let team = state
                .team(id)
                .ok_or_else(|| PosError::UnknownTeam(id.to_string()))?;
            (team.id.clone(), team.name.clone())
        }
    };

    let status = match &method {
        None => TxStatus::Paid,
        Some(m) => m.initial_status,
    };

    let total = cart.total();
    let change = match (method_id, request.tendered) {
        (CASH_METHOD_ID, Some(given)) => {
            let change = change_due(total, given);
            if change.is_negative() {
                return Err(PosError::InsufficientCash {
                    total: total.to_string(),
                    given: given.to_string(),
                });
            }
            Some(change)
        }
        _ => None,
    };

    let tx = Transaction {
        id: new_id("tx"),
        items: cart.items().to_vec(),
        total,
        method_id: method_id.to_string(),
        team_id,
        team_name,
        status,
        timestamp: Utc::now(),
    };

    let message = match &method {
        Some(m) => format!("{} GEBUCHT!", m.name),
        None => "INTERN GEBUCHT!".to_string(),
    };

    info!(
        tx_id = %tx.id,
        method_id = %tx.method_id,
        team_id = %tx.team_id,
        status = tx.status.as_str(),
        total_cents = tx.total.cents(),
        "Transaction booked"
    );

    state.transactions.push(tx.clone());
    cart.clear();

    Ok(Receipt {
        transaction: tx,
        change,
        message,
    })
}

/// Register a new team straight from the checkout flow and return its id so
/// it can be selected for the pending sale.
pub fn create_team_inline(state: &mut PosState, name: &str) -> PosResult<String> {
    if name.trim().is_empty() {
        return Err(PosError::EmptyName);
    }
    Ok(catalog::add_team(state, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ACCOUNT_METHOD_ID;

    fn cart_with(state: &PosState, lines: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (id, count) in lines {
            cart.add_many(state, id, *count).unwrap();
        }
        cart
    }

    #[test]
    fn test_cart_add_remove_total() {
        let state = PosState::default();
        let mut cart = Cart::new();
        cart.add(&state, "p3").unwrap();
        cart.add(&state, "p3").unwrap();
        cart.add(&state, "p9").unwrap();
        assert_eq!(cart.count_of("p3"), 2);
        assert_eq!(cart.total().cents(), 550);

        cart.remove_one("p9");
        assert_eq!(cart.items().len(), 1);
        cart.remove_one("p3");
        assert_eq!(cart.count_of("p3"), 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_rejects_counts_and_totals_that_overflow() {
        let mut state = PosState::default();
        let mut cart = Cart::new();
        cart.add_many(&state, "p9", u32::MAX).unwrap();
        assert!(matches!(
            cart.add_many(&state, "p9", 1),
            Err(PosError::QuantityTooLarge(_))
        ));
        assert_eq!(cart.count_of("p9"), u32::MAX);

        state.products[0].price = Money::from_cents(i64::MAX / 2);
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_many(&state, "p1", 3),
            Err(PosError::QuantityTooLarge(_))
        ));
        assert!(cart.is_empty());

        // Each line fits on its own, the sum does not.
        cart.add_many(&state, "p1", 1).unwrap();
        state.products[1].price = Money::from_cents(i64::MAX / 2 + 10);
        assert!(matches!(
            cart.add_many(&state, "p2", 1),
            Err(PosError::QuantityTooLarge(_))
        ));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_cart_rejects_inactive_and_unknown() {
        let state = PosState::default();
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(&state, "p10"),
            Err(PosError::InactiveProduct(_))
        ));
        assert!(matches!(
            cart.add(&state, "nope"),
            Err(PosError::UnknownProduct(_))
        ));
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut state = PosState::default();
        let mut cart = Cart::new();
        let err = checkout(&mut state, &mut cart, &CheckoutRequest::new("cash")).unwrap_err();
        assert!(matches!(err, PosError::EmptyCart));
    }

    #[test]
    fn test_direct_sale_label_names_cash_only_for_cash() {
        let mut state = PosState::default();
        catalog::add_payment_method(&mut state, "card", "Karte", false, TxStatus::Paid).unwrap();
        let mut cart = cart_with(&state, &[("p2", 1)]);
        let receipt = checkout(&mut state, &mut cart, &CheckoutRequest::new("card")).unwrap();
        assert_eq!(receipt.transaction.team_id, DIRECT_SALE_TEAM_ID);
        assert_eq!(receipt.transaction.team_name, DIRECT_SALE_OTHER_NAME);

        let mut cart = cart_with(&state, &[("p2", 1)]);
        let receipt = checkout(
            &mut state,
            &mut cart,
            &CheckoutRequest::new("card").team(DIRECT_SALE_TEAM_ID),
        )
        .unwrap();
        assert_eq!(receipt.transaction.team_name, DIRECT_SALE_OTHER_NAME);
    }

    #[test]
    fn test_cash_without_team_is_direct_sale() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p3", 2)]);
        let receipt = checkout(
            &mut state,
            &mut cart,
            &CheckoutRequest::new("cash").tendered(Money::from_cents(1000)),
        )
        .unwrap();

        assert_eq!(receipt.transaction.team_id, DIRECT_SALE_TEAM_ID);
        assert_eq!(receipt.transaction.team_name, DIRECT_SALE_NAME);
        assert_eq!(receipt.transaction.status, TxStatus::Paid);
        assert_eq!(receipt.transaction.total.cents(), 500);
        assert_eq!(receipt.change, Some(Money::from_cents(500)));
        assert_eq!(receipt.message, "BAR GEBUCHT!");
        assert!(cart.is_empty());
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn test_cash_shortfall_rejected_and_nothing_booked() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p1", 1)]);
        let err = checkout(
            &mut state,
            &mut cart,
            &CheckoutRequest::new("cash").tendered(Money::from_cents(4000)),
        )
        .unwrap_err();
        assert!(matches!(err, PosError::InsufficientCash { .. }));
        assert!(state.transactions.is_empty());
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_account_requires_real_team() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p1", 1)]);
        for request in [
            CheckoutRequest::new(ACCOUNT_METHOD_ID),
            CheckoutRequest::new(ACCOUNT_METHOD_ID).team("bar"),
        ] {
            let err = checkout(&mut state, &mut cart, &request).unwrap_err();
            assert!(matches!(err, PosError::TeamRequired(_)));
        }

        let receipt = checkout(
            &mut state,
            &mut cart,
            &CheckoutRequest::new(ACCOUNT_METHOD_ID).team("t4"),
        )
        .unwrap();
        assert_eq!(receipt.transaction.status, TxStatus::Open);
        assert_eq!(receipt.transaction.team_name, "Rock Bottom Regensburg");
        assert_eq!(receipt.change, None);
    }

    #[test]
    fn test_internal_team_only_books_internal() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p4", 3)]);
        let err = checkout(&mut state, &mut cart, &CheckoutRequest::new("cash").team("t1"))
            .unwrap_err();
        assert!(matches!(err, PosError::InternalOnly(_)));

        let receipt = checkout(
            &mut state,
            &mut cart,
            &CheckoutRequest::new(INTERNAL_METHOD_ID).team("t1"),
        )
        .unwrap();
        assert_eq!(receipt.transaction.status, TxStatus::Paid);
        assert_eq!(receipt.transaction.method_id, INTERNAL_METHOD_ID);
        assert_eq!(receipt.message, "INTERN GEBUCHT!");
    }

    #[test]
    fn test_internal_method_needs_internal_team() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p4", 1)]);
        for request in [
            CheckoutRequest::new(INTERNAL_METHOD_ID),
            CheckoutRequest::new(INTERNAL_METHOD_ID).team("t5"),
        ] {
            let err = checkout(&mut state, &mut cart, &request).unwrap_err();
            assert!(matches!(err, PosError::NotAnInternalTeam));
        }
    }

    #[test]
    fn test_inactive_method_and_unknown_team() {
        let mut state = PosState::default();
        catalog::set_payment_method_active(&mut state, "acc", false).unwrap();
        let mut cart = cart_with(&state, &[("p2", 1)]);
        assert!(matches!(
            checkout(&mut state, &mut cart, &CheckoutRequest::new("acc").team("t3")),
            Err(PosError::InactivePaymentMethod(_))
        ));
        assert!(matches!(
            checkout(&mut state, &mut cart, &CheckoutRequest::new("cash").team("t99")),
            Err(PosError::UnknownTeam(_))
        ));
        assert!(matches!(
            checkout(&mut state, &mut cart, &CheckoutRequest::new("card")),
            Err(PosError::UnknownPaymentMethod(_))
        ));
    }

    #[test]
    fn test_transaction_snapshots_prices() {
        let mut state = PosState::default();
        let mut cart = cart_with(&state, &[("p1", 1)]);
        checkout(&mut state, &mut cart, &CheckoutRequest::new("cash")).unwrap();
        state.products[0].price = Money::from_cents(9900);
        assert_eq!(state.transactions[0].items[0].price.cents(), 4500);
        assert_eq!(state.transactions[0].total.cents(), 4500);
    }

    #[test]
    fn test_create_team_inline() {
        let mut state = PosState::default();
        assert!(create_team_inline(&mut state, " ").is_err());
        let id = create_team_inline(&mut state, "Bavarian Bulls").unwrap();
        let mut cart = cart_with(&state, &[("p1", 2)]);
        let receipt = checkout(&mut state, &mut cart, &CheckoutRequest::new("acc").team(&id))
            .unwrap();
        assert_eq!(receipt.transaction.team_name, "Bavarian Bulls");
        assert_eq!(receipt.transaction.total.cents(), 9000);
    }

    #[test]
    fn test_change_due() {
        assert_eq!(
            change_due(Money::from_cents(450), Money::from_cents(500)).cents(),
            50
        );
        assert!(change_due(Money::from_cents(450), Money::from_cents(400)).is_negative());
    }
}
