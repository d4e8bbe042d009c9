//! Catalog administration: products, categories, teams and payment methods.

use tracing::info;

use crate::error::{PosError, PosResult};
use crate::models::{
    PaymentMethod, Product, Team, TxStatus, FALLBACK_CATEGORY, FILTER_ALL, INTERNAL_METHOD_ID,
};
use crate::money::Money;
use crate::new_id;
use crate::state::PosState;

const NEW_PRODUCT_NAME: &str = "Neuer Artikel";
const NEW_TEAM_NAME: &str = "Neues Team";

/// Partial product update. `None` leaves the field untouched; for the
/// category, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub active: Option<bool>,
    pub category: Option<Option<String>>,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Append a placeholder product. It lands in `category_hint` when given (and
/// not `ALLE`), otherwise in the first known category.
pub fn add_product(state: &mut PosState, category_hint: Option<&str>) -> String {
    let category = category_hint
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty() && c != FILTER_ALL)
        .or_else(|| state.categories.first().cloned())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());
    ensure_category(state, &category);

    let id = new_id("p");
    state.products.push(Product {
        id: id.clone(),
        name: NEW_PRODUCT_NAME.to_string(),
        price: Money::ZERO,
        active: true,
        category: Some(category.clone()),
    });
    info!(product_id = %id, category = %category, "Product added");
    id
}

pub fn update_product(state: &mut PosState, id: &str, patch: ProductPatch) -> PosResult<()> {
    let product = state
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| PosError::UnknownProduct(id.to_string()))?;

    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(PosError::EmptyName);
        }
        product.name = name.to_string();
    }
    if let Some(price) = patch.price {
        if price.is_negative() {
            return Err(PosError::InvalidAmount(price.to_string()));
        }
        product.price = price;
    }
    if let Some(active) = patch.active {
        product.active = active;
    }
    if let Some(category) = patch.category {
        product.category = category
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
    }
    info!(product_id = %id, "Product updated");
    Ok(())
}

pub fn delete_product(state: &mut PosState, id: &str) -> PosResult<Product> {
    let idx = state
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| PosError::UnknownProduct(id.to_string()))?;
    let removed = state.products.remove(idx);
    info!(product_id = %id, name = %removed.name, "Product deleted");
    Ok(removed)
}

/// Move a product so that it sits where `target_id` currently is.
pub fn move_product(state: &mut PosState, id: &str, target_id: &str) -> PosResult<()> {
    if id == target_id {
        return Ok(());
    }
    let from = state
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| PosError::UnknownProduct(id.to_string()))?;
    let to = state
        .products
        .iter()
        .position(|p| p.id == target_id)
        .ok_or_else(|| PosError::UnknownProduct(target_id.to_string()))?;
    let product = state.products.remove(from);
    state.products.insert(to, product);
    Ok(())
}

/// Products in a category (`ALLE` = all), in catalog order.
pub fn products_in_category<'a>(state: &'a PosState, category: &str) -> Vec<&'a Product> {
    if category.eq_ignore_ascii_case(FILTER_ALL) {
        return state.products.iter().collect();
    }
    state
        .products
        .iter()
        .filter(|p| p.in_category(category))
        .collect()
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub fn add_category(state: &mut PosState, name: &str) -> PosResult<String> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return Err(PosError::EmptyName);
    }
    if state.categories.contains(&upper) {
        return Err(PosError::DuplicateCategory(upper));
    }
    state.categories.push(upper.clone());
    state.categories.sort();
    info!(category = %upper, "Category added");
    Ok(upper)
}

/// Rename a category and carry every product along with it.
pub fn rename_category(state: &mut PosState, old: &str, new: &str) -> PosResult<usize> {
    let old_upper = old.trim().to_uppercase();
    let new_upper = new.trim().to_uppercase();
    if new_upper.is_empty() {
        return Err(PosError::EmptyName);
    }
    if !state.categories.contains(&old_upper) {
        return Err(PosError::UnknownCategory(old_upper));
    }
    if old_upper != new_upper && state.categories.contains(&new_upper) {
        return Err(PosError::DuplicateCategory(new_upper));
    }

    for c in state.categories.iter_mut() {
        if *c == old_upper {
            *c = new_upper.clone();
        }
    }
    state.categories.sort();

    let mut moved = 0;
    for p in state.products.iter_mut() {
        if p.in_category(&old_upper) {
            p.category = Some(new_upper.clone());
            moved += 1;
        }
    }
    info!(from = %old_upper, to = %new_upper, products = moved, "Category renamed");
    Ok(moved)
}

/// Remove a category; its products fall back to `ALLGEMEIN`, which itself
/// cannot be deleted.
pub fn delete_category(state: &mut PosState, name: &str) -> PosResult<usize> {
    let upper = name.trim().to_uppercase();
    if upper == FALLBACK_CATEGORY {
        return Err(PosError::ProtectedCategory(upper));
    }
    let before = state.categories.len();
    state.categories.retain(|c| *c != upper);
    if state.categories.len() == before {
        return Err(PosError::UnknownCategory(upper));
    }

    let mut moved = 0;
    for p in state.products.iter_mut() {
        if p.in_category(&upper) {
            p.category = Some(FALLBACK_CATEGORY.to_string());
            moved += 1;
        }
    }
    if moved > 0 {
        ensure_category(state, FALLBACK_CATEGORY);
    }
    info!(category = %upper, products = moved, "Category deleted");
    Ok(moved)
}

/// Keep a category a product points at in the sorted list.
fn ensure_category(state: &mut PosState, name: &str) {
    if !state.categories.iter().any(|c| c == name) {
        state.categories.push(name.to_string());
        state.categories.sort();
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// Register a team. An empty name gives the "Neues Team" placeholder.
pub fn add_team(state: &mut PosState, name: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() { NEW_TEAM_NAME } else { name };
    let id = new_id("t");
    state.teams.push(Team {
        id: id.clone(),
        name: name.to_string(),
        active: true,
    });
    info!(team_id = %id, name = %name, "Team added");
    id
}

pub fn rename_team(state: &mut PosState, id: &str, name: &str) -> PosResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PosError::EmptyName);
    }
    let team = team_mut(state, id)?;
    team.name = name.to_string();
    Ok(())
}

pub fn set_team_active(state: &mut PosState, id: &str, active: bool) -> PosResult<()> {
    team_mut(state, id)?.active = active;
    info!(team_id = %id, active, "Team activation changed");
    Ok(())
}

/// Remove a team from the roster. Its past transactions keep the team name
/// they were booked under.
pub fn delete_team(state: &mut PosState, id: &str) -> PosResult<Team> {
    let idx = state
        .teams
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| PosError::UnknownTeam(id.to_string()))?;
    let removed = state.teams.remove(idx);
    info!(team_id = %id, name = %removed.name, "Team deleted");
    Ok(removed)
}

fn team_mut<'a>(state: &'a mut PosState, id: &str) -> PosResult<&'a mut Team> {
    state
        .teams
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| PosError::UnknownTeam(id.to_string()))
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

pub fn add_payment_method(
    state: &mut PosState,
    id: &str,
    name: &str,
    requires_team: bool,
    initial_status: TxStatus,
) -> PosResult<()> {
    let id = id.trim().to_lowercase();
    let name = name.trim();
    if id.is_empty() || name.is_empty() {
        return Err(PosError::EmptyName);
    }
    if id == INTERNAL_METHOD_ID || state.payment_method(&id).is_some() {
        return Err(PosError::DuplicatePaymentMethod(id));
    }
    if initial_status == TxStatus::Settled {
        return Err(PosError::InvalidConfig(
            "a payment method starts either paid or open".into(),
        ));
    }
    state.payment_methods.push(PaymentMethod {
        id: id.clone(),
        name: name.to_uppercase(),
        active: true,
        requires_team,
        initial_status,
    });
    info!(method_id = %id, "Payment method added");
    Ok(())
}

pub fn set_payment_method_active(state: &mut PosState, id: &str, active: bool) -> PosResult<()> {
    let method = state
        .payment_methods
        .iter_mut()
        .find(|m| m.id == id)
        .ok_or_else(|| PosError::UnknownPaymentMethod(id.to_string()))?;
    method.active = active;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_product_uses_hint_or_first_category() {
        let mut state = PosState::default();
        let id = add_product(&mut state, Some("essen"));
        assert_eq!(state.product(&id).unwrap().category.as_deref(), Some("ESSEN"));

        let id = add_product(&mut state, Some("ALLE"));
        assert_eq!(
            state.product(&id).unwrap().category.as_deref(),
            Some("ALKOHOLISCHE GETRÄNKE")
        );

        state.categories.clear();
        let id = add_product(&mut state, None);
        assert_eq!(state.product(&id).unwrap().category.as_deref(), Some("ALLGEMEIN"));
        assert_eq!(state.categories, vec![FALLBACK_CATEGORY.to_string()]);
    }

    #[test]
    fn test_update_product_rejects_empty_name_and_negative_price() {
        let mut state = PosState::default();
        let err = update_product(
            &mut state,
            "p1",
            ProductPatch {
                name: Some("  ".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, PosError::EmptyName));

        let err = update_product(
            &mut state,
            "p1",
            ProductPatch {
                price: Some(Money::from_cents(-1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, PosError::InvalidAmount(_)));

        update_product(
            &mut state,
            "p1",
            ProductPatch {
                price: Some(Money::from_cents(5000)),
                active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        let p = state.product("p1").unwrap();
        assert_eq!(p.price.cents(), 5000);
        assert!(!p.active);
    }

    #[test]
    fn test_move_product_reorders() {
        let mut state = PosState::default();
        move_product(&mut state, "p3", "p1").unwrap();
        let ids: Vec<&str> = state.products.iter().take(3).map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn test_category_add_rejects_duplicates_and_sorts() {
        let mut state = PosState::default();
        assert_eq!(add_category(&mut state, " merch ").unwrap(), "MERCH");
        assert!(matches!(
            add_category(&mut state, "Merch"),
            Err(PosError::DuplicateCategory(_))
        ));
        let mut sorted = state.categories.clone();
        sorted.sort();
        assert_eq!(state.categories, sorted);
    }

    #[test]
    fn test_rename_category_moves_products() {
        let mut state = PosState::default();
        let moved = rename_category(&mut state, "ESSEN", "Grill").unwrap();
        assert_eq!(moved, 5);
        assert!(state.categories.contains(&"GRILL".to_string()));
        assert!(!state.categories.contains(&"ESSEN".to_string()));
        assert_eq!(state.product("p6").unwrap().category.as_deref(), Some("GRILL"));
    }

    #[test]
    fn test_delete_category_falls_back_to_allgemein() {
        let mut state = PosState::default();
        let moved = delete_category(&mut state, "paint").unwrap();
        assert_eq!(moved, 1);
        assert_eq!(
            state.product("p1").unwrap().category.as_deref(),
            Some(FALLBACK_CATEGORY)
        );
        assert!(matches!(
            delete_category(&mut state, "PAINT"),
            Err(PosError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_fallback_category_is_listed_and_protected() {
        let mut state = PosState::default();
        assert!(!state.categories.iter().any(|c| c == FALLBACK_CATEGORY));

        delete_category(&mut state, "ESSEN").unwrap();
        assert!(state.categories.iter().any(|c| c == FALLBACK_CATEGORY));
        let mut sorted = state.categories.clone();
        sorted.sort();
        assert_eq!(state.categories, sorted);

        assert!(matches!(
            delete_category(&mut state, "allgemein"),
            Err(PosError::ProtectedCategory(_))
        ));
        assert!(state.categories.iter().any(|c| c == FALLBACK_CATEGORY));
        assert!(state
            .products
            .iter()
            .filter_map(|p| p.category.as_deref())
            .all(|c| state.categories.iter().any(|k| k == c)));
    }

    #[test]
    fn test_team_lifecycle() {
        let mut state = PosState::default();
        let id = add_team(&mut state, "");
        assert_eq!(state.team(&id).unwrap().name, "Neues Team");
        rename_team(&mut state, &id, "Wolfpack").unwrap();
        set_team_active(&mut state, &id, false).unwrap();
        assert!(state.active_teams().all(|t| t.id != id));
        delete_team(&mut state, &id).unwrap();
        assert!(state.team(&id).is_none());
    }

    #[test]
    fn test_add_payment_method_rejects_reserved_and_settled() {
        let mut state = PosState::default();
        assert!(matches!(
            add_payment_method(&mut state, "internal", "Intern", false, TxStatus::Paid),
            Err(PosError::DuplicatePaymentMethod(_))
        ));
        assert!(add_payment_method(&mut state, "card", "Karte", false, TxStatus::Settled).is_err());
        add_payment_method(&mut state, "card", "Karte", false, TxStatus::Paid).unwrap();
        assert_eq!(state.payment_method("card").unwrap().name, "KARTE");
    }

    #[test]
    fn test_products_in_category_filter() {
        let state = PosState::default();
        assert_eq!(products_in_category(&state, "ALLE").len(), 12);
        assert_eq!(products_in_category(&state, "essen").len(), 5);
    }
}
