//! Whole-state snapshot persistence: one JSON document per collection.

use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::data_helpers::{read_local_json, write_local_json, STATE_CATEGORY};
use crate::db::{self, DbState};
use crate::defaults;
use crate::error::PosResult;
use crate::models::{CostConfig, EventSettings};
use crate::state::PosState;

const KEY_PRODUCTS: &str = "products";
const KEY_TEAMS: &str = "teams";
const KEY_PAYMENT_METHODS: &str = "paymentMethods";
const KEY_CATEGORIES: &str = "categories";
const KEY_TRANSACTIONS: &str = "transactions";
const KEY_CASH_LOG: &str = "cashLog";
const KEY_COSTS: &str = "lootConfig";
const KEY_SETTINGS: &str = "eventSettings";

/// Load the state. A missing document falls back to its seed value on its
/// own, so a partially written store still loads. A document that is present
/// but unreadable fails the load: saving seed data over it would erase the
/// ledger it holds.
pub fn load(db: &DbState) -> PosResult<PosState> {
    let conn = db.lock()?;

    let products = read_local_json(&conn, KEY_PRODUCTS)?.unwrap_or_else(defaults::default_products);
    let categories = read_local_json(&conn, KEY_CATEGORIES)?
        .unwrap_or_else(|| defaults::categories_from_products(&products));

    let state = PosState {
        teams: read_local_json(&conn, KEY_TEAMS)?.unwrap_or_else(defaults::default_teams),
        payment_methods: read_local_json(&conn, KEY_PAYMENT_METHODS)?
            .unwrap_or_else(defaults::default_payment_methods),
        transactions: read_local_json(&conn, KEY_TRANSACTIONS)?.unwrap_or_default(),
        cash_log: read_local_json(&conn, KEY_CASH_LOG)?.unwrap_or_default(),
        costs: read_local_json::<CostConfig>(&conn, KEY_COSTS)?.unwrap_or_default(),
        settings: read_local_json::<EventSettings>(&conn, KEY_SETTINGS)?.unwrap_or_default(),
        products,
        categories,
    };

    debug!(
        products = state.products.len(),
        teams = state.teams.len(),
        transactions = state.transactions.len(),
        cash_log = state.cash_log.len(),
        "State loaded"
    );
    Ok(state)
}

/// Write every document in one transaction.
pub fn save(db: &DbState, state: &PosState) -> PosResult<()> {
    let conn = db.lock()?;
    conn.execute_batch("BEGIN IMMEDIATE")?;

    let result = write_documents(&conn, state);

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "State save failed, rolling back");
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

/// Write every document on an open connection. The caller owns the
/// surrounding transaction.
pub(crate) fn write_documents(conn: &Connection, state: &PosState) -> PosResult<()> {
    write_local_json(conn, KEY_PRODUCTS, &state.products)?;
    write_local_json(conn, KEY_TEAMS, &state.teams)?;
    write_local_json(conn, KEY_PAYMENT_METHODS, &state.payment_methods)?;
    write_local_json(conn, KEY_CATEGORIES, &state.categories)?;
    write_local_json(conn, KEY_TRANSACTIONS, &state.transactions)?;
    write_local_json(conn, KEY_CASH_LOG, &state.cash_log)?;
    write_local_json(conn, KEY_COSTS, &state.costs)?;
    write_local_json(conn, KEY_SETTINGS, &state.settings)?;
    Ok(())
}

/// Clear the event ledger and persist ("Kasse nullen").
pub fn reset_event(db: &DbState, state: &mut PosState) -> PosResult<()> {
    state.reset_event();
    save(db, state)?;
    info!("Event ledger reset");
    Ok(())
}

/// Drop every stored document. The next load yields seed data. Archived
/// event reports are kept.
pub fn factory_reset(db: &DbState) -> PosResult<PosState> {
    let removed = {
        let conn = db.lock()?;
        db::delete_all_settings(&conn, STATE_CATEGORY)?
    };
    info!(documents = removed, "Factory reset");
    load(db)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashbook::{add_deposit, add_expense};
    use crate::error::PosError;
    use crate::checkout::{checkout, Cart, CheckoutRequest};
    use crate::money::Money;

    #[test]
    fn test_empty_store_loads_seed_data() {
        let db = db::test_state();
        let state = load(&db).unwrap();
        assert_eq!(state, PosState::default());
    }

    #[test]
    fn test_save_then_load_restores_everything() {
        let db = db::test_state();
        let mut state = load(&db).unwrap();

        let mut cart = Cart::new();
        cart.add_many(&state, "p1", 2).unwrap();
        checkout(&mut state, &mut cart, &CheckoutRequest::new("acc").team("t5")).unwrap();
        add_expense(&mut state, Money::from_cents(1999), "Gaskartusche").unwrap();
        state.costs.rent_cost = Money::from_cents(25_000);
        state.settings.internal_team_ids = vec!["t8".into()];
        state.categories.push("MERCH".into());

        save(&db, &state).unwrap();
        let loaded = load(&db).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_missing_categories_are_derived_from_products() {
        let db = db::test_state();
        {
            let conn = db.lock().unwrap();
            write_local_json(
                &conn,
                KEY_PRODUCTS,
                &serde_json::json!([
                    { "id": "x1", "name": "Shirt", "price": 20, "category": "merch" }
                ]),
            )
            .unwrap();
        }
        let state = load(&db).unwrap();
        assert_eq!(state.products.len(), 1);
        assert_eq!(state.categories, vec!["MERCH".to_string()]);
        assert!(state.transactions.is_empty());
    }

    #[test]
    fn test_unreadable_ledger_fails_load_and_is_never_overwritten() {
        let db = db::test_state();
        let mut state = load(&db).unwrap();
        for team in ["t3", "t4", "t5"] {
            let mut cart = Cart::new();
            cart.add(&state, "p1").unwrap();
            checkout(&mut state, &mut cart, &CheckoutRequest::new("acc").team(team)).unwrap();
        }
        save(&db, &state).unwrap();

        // One entry with a status the model does not know.
        let mut raw = serde_json::to_value(&state.transactions).unwrap();
        raw[0]["status"] = serde_json::json!("void");
        {
            let conn = db.lock().unwrap();
            write_local_json(&conn, KEY_TRANSACTIONS, &raw).unwrap();
        }

        match load(&db) {
            Err(PosError::CorruptDocument { key, .. }) => assert_eq!(key, KEY_TRANSACTIONS),
            other => panic!("expected CorruptDocument, got {other:?}"),
        }

        // A command goes through load before it saves, so the document stays.
        let stored = {
            let conn = db.lock().unwrap();
            db::get_setting(&conn, STATE_CATEGORY, KEY_TRANSACTIONS)
                .unwrap()
                .unwrap()
        };
        let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert_eq!(stored.as_array().map(Vec::len), Some(3));

        // Repairing the entry brings all three tabs back.
        raw[0]["status"] = serde_json::json!("open");
        {
            let conn = db.lock().unwrap();
            write_local_json(&conn, KEY_TRANSACTIONS, &raw).unwrap();
        }
        let mut repaired = load(&db).unwrap();
        assert_eq!(repaired.transactions.len(), 3);
        add_deposit(&mut repaired, Money::from_cents(1000)).unwrap();
        save(&db, &repaired).unwrap();
        assert_eq!(load(&db).unwrap().transactions.len(), 3);
    }

    #[test]
    fn test_unreadable_cost_config_fails_load() {
        let db = db::test_state();
        {
            let conn = db.lock().unwrap();
            db::set_setting(&conn, STATE_CATEGORY, KEY_COSTS, "[]").unwrap();
        }
        assert!(matches!(
            load(&db),
            Err(PosError::CorruptDocument { .. })
        ));
    }

    #[test]
    fn test_reset_event_and_factory_reset() {
        let db = db::test_state();
        let mut state = load(&db).unwrap();
        let mut cart = Cart::new();
        cart.add(&state, "p2").unwrap();
        checkout(&mut state, &mut cart, &CheckoutRequest::new("cash")).unwrap();
        state.costs.rent_paid = true;
        state.teams.truncate(2);
        save(&db, &state).unwrap();

        reset_event(&db, &mut state).unwrap();
        let loaded = load(&db).unwrap();
        assert!(loaded.transactions.is_empty());
        assert!(!loaded.costs.rent_paid);
        assert_eq!(loaded.teams.len(), 2);

        let fresh = factory_reset(&db).unwrap();
        assert_eq!(fresh, PosState::default());
    }
}
