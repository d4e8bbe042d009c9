//! Seed data used on first start and after a factory reset.

use std::collections::BTreeSet;

use crate::models::{PaymentMethod, Product, Team, TxStatus, ACCOUNT_METHOD_ID, CASH_METHOD_ID};
use crate::money::Money;

fn product(id: &str, name: &str, cents: i64, active: bool, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(cents),
        active,
        category: Some(category.to_string()),
    }
}

fn team(id: &str, name: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
        active: true,
    }
}

pub fn default_products() -> Vec<Product> {
    vec![
        product("p1", "Paint, Kiste", 4500, true, "PAINT"),
        product("p2", "Softdrinks, flasche", 250, true, "GETRÄNKE ALKOHLOFREI"),
        product("p3", "Bier, flasche", 250, true, "ALKOHOLISCHE GETRÄNKE"),
        product("p4", "Kaffee, becher", 100, true, "GETRÄNKE ALKOHLOFREI"),
        product("p5", "Kuchen hausgemacht", 150, true, "ESSEN"),
        product("p6", "gegrilltes + Semmel", 450, true, "ESSEN"),
        product("p7", "Wiener, paar + Semmel", 250, true, "ESSEN"),
        product("p8", "Debreziner, paar + Semmel", 350, true, "ESSEN"),
        product("p9", "Semmel, einzeln", 50, true, "ESSEN"),
        product("p10", "Eventkosten", 0, false, "EVENTKOSTEN"),
        product("p11", "Glühwein, Becher", 200, true, "ALKOHOLISCHE GETRÄNKE"),
        product("p12", "Wasser, Flasche", 100, true, "GETRÄNKE ALKOHLOFREI"),
    ]
}

pub fn default_teams() -> Vec<Team> {
    vec![
        team("t1", "Green Hornets Landshut + Friends"),
        team("t2", "Referee Team / Fotograf / Josef"),
        team("t3", "EP Brothers Dornbirn"),
        team("t4", "Rock Bottom Regensburg"),
        team("t5", "Raptors Landshut"),
        team("t6", "Scopes Bad Tölz"),
        team("t7", "Hydras Hauzenberg"),
        team("t8", "paintball fichtheim"),
    ]
}

pub fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: CASH_METHOD_ID.to_string(),
            name: "BAR".to_string(),
            active: true,
            requires_team: false,
            initial_status: TxStatus::Paid,
        },
        PaymentMethod {
            id: ACCOUNT_METHOD_ID.to_string(),
            name: "RECHNUNG".to_string(),
            active: true,
            requires_team: true,
            initial_status: TxStatus::Open,
        },
    ]
}

/// Sorted, upper-cased, de-duplicated categories of the given products.
/// Falls back to a generic set when no product carries a category.
pub fn categories_from_products(products: &[Product]) -> Vec<String> {
    let set: BTreeSet<String> = products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    if set.is_empty() {
        return ["ALLGEMEIN", "ESSEN", "GETRÄNKE", "PAINT"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    }
    set.into_iter().collect()
}

pub fn default_categories() -> Vec<String> {
    categories_from_products(&default_products())
}
