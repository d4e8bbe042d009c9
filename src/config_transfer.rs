//! Admin configuration export/import: catalog, teams, payment methods,
//! categories and cost settings as one portable JSON file. Transactions and
//! the cash log never leave the device this way.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{PosError, PosResult};
use crate::models::{CostConfig, EventSettings, PaymentMethod, Product, Team};
use crate::state::PosState;

pub const CONFIG_TYPE: &str = "POCKET_HORNET_CONFIG";
pub const CONFIG_VERSION: &str = "2.4";
const EXPORTED_BY: &str = "IMPERIAL_ADMIN_DROID";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMeta {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub version: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub exported_by: String,
}

/// Every field is optional on import: only present collections replace the
/// current ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<Team>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<PaymentMethod>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loot_config: Option<CostConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_settings: Option<EventSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub meta: ConfigMeta,
    pub payload: ConfigPayload,
}

pub fn export_config(state: &PosState) -> ConfigDocument {
    ConfigDocument {
        meta: ConfigMeta {
            kind: CONFIG_TYPE.to_string(),
            version: CONFIG_VERSION.to_string(),
            date: Some(Utc::now()),
            exported_by: EXPORTED_BY.to_string(),
        },
        payload: ConfigPayload {
            products: Some(state.products.clone()),
            teams: Some(state.teams.clone()),
            payment_methods: Some(state.payment_methods.clone()),
            categories: Some(state.categories.clone()),
            loot_config: Some(state.costs.clone()),
            event_settings: Some(state.settings.clone()),
        },
    }
}

/// `HORNET_CONFIG_2026-06-14.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("HORNET_CONFIG_{}.json", date.format("%Y-%m-%d"))
}

/// Parse and validate an exported file.
pub fn parse_config(raw: &str) -> PosResult<ConfigDocument> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| PosError::InvalidConfig(format!("not valid JSON: {e}")))?;

    let kind = value
        .get("meta")
        .and_then(|m| m.get("type"))
        .and_then(Value::as_str);
    if kind != Some(CONFIG_TYPE) {
        return Err(PosError::InvalidConfig(format!(
            "missing or wrong meta.type (expected {CONFIG_TYPE})"
        )));
    }
    if !value.get("payload").is_some_and(Value::is_object) {
        return Err(PosError::InvalidConfig("missing payload".into()));
    }

    serde_json::from_value(value).map_err(|e| PosError::InvalidConfig(e.to_string()))
}

/// Replace every collection present in the payload. Returns the names of the
/// replaced collections.
pub fn apply_import(state: &mut PosState, payload: ConfigPayload) -> Vec<&'static str> {
    let mut replaced = Vec::new();
    if let Some(products) = payload.products {
        state.products = products;
        replaced.push("products");
    }
    if let Some(teams) = payload.teams {
        state.teams = teams;
        replaced.push("teams");
    }
    if let Some(methods) = payload.payment_methods {
        state.payment_methods = methods;
        replaced.push("paymentMethods");
    }
    if let Some(categories) = payload.categories {
        state.categories = categories;
        replaced.push("categories");
    }
    if let Some(mut costs) = payload.loot_config {
        // Whether this event already paid its rent is ledger state, not config.
        costs.rent_paid = state.costs.rent_paid;
        state.costs = costs;
        replaced.push("lootConfig");
    }
    if let Some(settings) = payload.event_settings {
        state.settings = settings;
        replaced.push("eventSettings");
    }
    info!(replaced = ?replaced, "Config imported");
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use serde_json::json;

    #[test]
    fn test_export_import_restores_config_not_ledger() {
        let mut source = PosState::default();
        source.products.truncate(3);
        source.categories = vec!["PAINT".into()];
        source.costs.rent_cost = Money::from_cents(30_000);
        let raw = serde_json::to_string_pretty(&export_config(&source)).unwrap();

        let mut target = PosState::default();
        target.costs.rent_paid = true;
        let doc = parse_config(&raw).unwrap();
        assert_eq!(doc.meta.version, CONFIG_VERSION);

        let replaced = apply_import(&mut target, doc.payload);
        assert_eq!(replaced.len(), 6);
        assert_eq!(target.products, source.products);
        assert_eq!(target.categories, vec!["PAINT".to_string()]);
        assert_eq!(target.costs.rent_cost.cents(), 30_000);
        assert!(target.costs.rent_paid);
    }

    #[test]
    fn test_partial_payload_replaces_only_present_fields() {
        let raw = json!({
            "meta": { "type": "POCKET_HORNET_CONFIG", "date": "2025-05-01T10:00:00Z" },
            "payload": {
                "teams": [ { "id": "x", "name": "Gäste", "active": true } ]
            }
        })
        .to_string();
        let mut state = PosState::default();
        let products_before = state.products.clone();

        let doc = parse_config(&raw).unwrap();
        let replaced = apply_import(&mut state, doc.payload);
        assert_eq!(replaced, vec!["teams"]);
        assert_eq!(state.teams.len(), 1);
        assert_eq!(state.products, products_before);
    }

    #[test]
    fn test_rejects_foreign_files() {
        assert!(matches!(
            parse_config("{ nope"),
            Err(PosError::InvalidConfig(_))
        ));
        let wrong_type = json!({ "meta": { "type": "OTHER" }, "payload": {} }).to_string();
        assert!(matches!(
            parse_config(&wrong_type),
            Err(PosError::InvalidConfig(_))
        ));
        let no_payload = json!({ "meta": { "type": "POCKET_HORNET_CONFIG" } }).to_string();
        assert!(matches!(
            parse_config(&no_payload),
            Err(PosError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        assert_eq!(export_file_name(date), "HORNET_CONFIG_2026-06-14.json");
    }
}
