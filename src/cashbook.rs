//! Cash log ("Kriegskasse"): expenses paid out of the box, change-money
//! deposits and their withdrawal, and the automatic rent booking.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{PosError, PosResult};
use crate::models::{CashLogEntry, CashLogType};
use crate::money::Money;
use crate::state::PosState;
use crate::stats::war_chest;

pub const DEPOSIT_DESCRIPTION: &str = "Bareinlage";
pub const WITHDRAW_DESCRIPTION: &str = "Rückzahlung Bareinlage";
pub const RENT_DESCRIPTION: &str = "MIETE HALLE (AUTO-ZAHLUNG)";

fn push_entry(
    state: &mut PosState,
    kind: CashLogType,
    amount: Money,
    description: &str,
) -> PosResult<CashLogEntry> {
    if !amount.is_positive() {
        return Err(PosError::NonPositiveAmount);
    }
    let entry = CashLogEntry {
        id: crate::new_id("log"),
        amount,
        description: description.to_string(),
        timestamp: Utc::now(),
        kind,
    };
    state.cash_log.push(entry.clone());
    info!(
        entry_id = %entry.id,
        kind = kind.as_str(),
        amount_cents = amount.cents(),
        "Cash log entry booked"
    );
    Ok(entry)
}

pub fn add_expense(
    state: &mut PosState,
    amount: Money,
    description: &str,
) -> PosResult<CashLogEntry> {
    let description = description.trim();
    if description.is_empty() {
        return Err(PosError::MissingDescription);
    }
    push_entry(state, CashLogType::Expense, amount, description)
}

/// Owner puts change money into the box.
pub fn add_deposit(state: &mut PosState, amount: Money) -> PosResult<CashLogEntry> {
    push_entry(state, CashLogType::Deposit, amount, DEPOSIT_DESCRIPTION)
}

/// Owner takes change money back out.
pub fn withdraw_deposit(state: &mut PosState, amount: Money) -> PosResult<CashLogEntry> {
    let available = war_chest(state);
    if amount > available {
        // Allowed, the box is counted by hand anyway.
        warn!(
            amount_cents = amount.cents(),
            war_chest_cents = available.cents(),
            "Withdrawal exceeds the calculated war chest"
        );
    }
    push_entry(state, CashLogType::Withdraw, amount, WITHDRAW_DESCRIPTION)
}

/// Whether the rent reminder should fire: booking is switched on, rent is
/// configured and unpaid, and the box holds the rent plus the buffer.
pub fn rent_due(state: &PosState) -> bool {
    let costs = &state.costs;
    costs.active
        && !costs.rent_paid
        && costs.rent_cost.is_positive()
        && war_chest(state) >= costs.rent_cost + state.settings.rent_buffer
}

/// Book the hall rent as a cash expense and mark it paid.
pub fn pay_rent(state: &mut PosState) -> PosResult<CashLogEntry> {
    if state.costs.rent_paid {
        return Err(PosError::RentAlreadyPaid);
    }
    let rent = state.costs.rent_cost;
    if !rent.is_positive() {
        return Err(PosError::RentNotConfigured);
    }
    let entry = push_entry(state, CashLogType::Expense, rent, RENT_DESCRIPTION)?;
    state.costs.rent_paid = true;
    info!(amount_cents = rent.cents(), "Rent paid from cash box");
    Ok(entry)
}

/// Cash log, newest first.
pub fn entries_newest_first(state: &PosState) -> Vec<&CashLogEntry> {
    state.cash_log.iter().rev().collect()
}
