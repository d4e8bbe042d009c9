//! Checkout commands: sell, undo, void.

use anyhow::{bail, Result};
use clap::Args;

use super::{parse_money, resolve_product, resolve_team, Context};
use crate::cashbook::rent_due;
use crate::checkout::{checkout, create_team_inline, Cart, CheckoutRequest};
use crate::ledger::{delete_transaction, undo_last};
use crate::models::CASH_METHOD_ID;
use crate::money::Money;
use crate::output;

#[derive(Args)]
pub struct SellArgs {
    /// Items as ID or ID:COUNT (product id or exact name), e.g. p1:2 p3
    #[arg(required = true)]
    pub items: Vec<String>,

    /// Payment method id (cash, acc, internal, ...)
    #[arg(short, long, default_value = CASH_METHOD_ID)]
    pub method: String,

    /// Team id or name; `bar` for a direct sale
    #[arg(short, long, conflicts_with = "new_team")]
    pub team: Option<String>,

    /// Register a new team and book the sale on it
    #[arg(long)]
    pub new_team: Option<String>,

    /// Cash handed over, to compute the change
    #[arg(short, long, value_parser = parse_money)]
    pub given: Option<Money>,
}

#[derive(Args)]
pub struct VoidArgs {
    /// Transaction id
    pub id: String,
}

/// `p1:3` -> (`p1`, 3); a bare reference counts once.
pub fn parse_item_spec(raw: &str) -> Result<(String, u32)> {
    let raw = raw.trim();
    let (reference, count) = match raw.rsplit_once(':') {
        Some((reference, count)) => {
            let count: u32 = count
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid count in item '{raw}'"))?;
            (reference.trim(), count)
        }
        None => (raw, 1),
    };
    if reference.is_empty() {
        bail!("empty item reference");
    }
    if count == 0 {
        bail!("item count must be at least 1: '{raw}'");
    }
    Ok((reference.to_string(), count))
}

pub fn sell(ctx: &Context, args: SellArgs) -> Result<()> {
    let (state, receipt) = ctx.mutate(|state| {
        let mut cart = Cart::new();
        for spec in &args.items {
            let (reference, count) = parse_item_spec(spec)?;
            let product_id = resolve_product(state, &reference)?;
            cart.add_many(state, &product_id, count)?;
        }

        let team_id = match (&args.team, &args.new_team) {
            (Some(team), _) => Some(resolve_team(state, team)?),
            (None, Some(name)) => Some(create_team_inline(state, name)?),
            (None, None) => None,
        };

        let mut request = CheckoutRequest::new(args.method.trim());
        request.team_id = team_id;
        request.tendered = args.given;
        Ok(checkout(state, &mut cart, &request)?)
    })?;

    if ctx.json {
        return output::print_json(&serde_json::json!({
            "message": receipt.message,
            "transaction": receipt.transaction,
            "change": receipt.change,
        }));
    }
    output::print_receipt(&receipt);
    if rent_due(&state) {
        output::hint(&format!(
            "Die Kasse deckt jetzt die Miete ({}). Buchen mit: pocket-hornet rent pay",
            state.costs.rent_cost
        ));
    }
    Ok(())
}

pub fn undo(ctx: &Context) -> Result<()> {
    let (_, tx) = ctx.mutate(|state| Ok(undo_last(state)?))?;
    if ctx.json {
        return output::print_json(&tx);
    }
    output::ok(&format!(
        "Rückgängig: {} {} ({})",
        tx.team_name, tx.total, tx.id
    ));
    Ok(())
}

pub fn void(ctx: &Context, args: VoidArgs) -> Result<()> {
    let (_, tx) = ctx.mutate(|state| Ok(delete_transaction(state, args.id.trim())?))?;
    if ctx.json {
        return output::print_json(&tx);
    }
    output::ok(&format!("Storniert: {} {} ({})", tx.team_name, tx.total, tx.id));
    Ok(())
}
