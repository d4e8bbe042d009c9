//! Cash box, rent and cost settings commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::{parse_money, resolve_team, Context};
use crate::cashbook::{
    add_deposit, add_expense, entries_newest_first, pay_rent, rent_due, withdraw_deposit,
};
use crate::money::Money;
use crate::output;
use crate::stats::war_chest;

#[derive(Subcommand)]
pub enum CashCommands {
    /// Current war chest and cash log
    Status,

    /// Pay an expense out of the cash box
    Expense(ExpenseArgs),

    /// Put change money into the box
    Deposit(AmountArg),

    /// Take change money back out
    Withdraw(AmountArg),
}

#[derive(Args)]
pub struct ExpenseArgs {
    /// Amount in euros
    #[arg(value_parser = parse_money)]
    pub amount: Money,

    /// What the money was spent on
    #[arg(required = true, num_args = 1..)]
    pub description: Vec<String>,
}

#[derive(Args)]
pub struct AmountArg {
    /// Amount in euros
    #[arg(value_parser = parse_money)]
    pub amount: Money,
}

#[derive(Subcommand)]
pub enum RentCommands {
    /// Whether the box can cover the rent
    Status,

    /// Book the rent as a cash expense
    Pay,
}

#[derive(Subcommand)]
pub enum CostsCommands {
    /// Show cost and event settings
    Show,

    /// Change cost and event settings
    Set(CostsSetArgs),
}

#[derive(Args, Default)]
pub struct CostsSetArgs {
    /// Purchase cost per paint box
    #[arg(long, value_parser = parse_money)]
    pub paint_per_box: Option<Money>,

    /// Hall rent for the event
    #[arg(long, value_parser = parse_money)]
    pub rent: Option<Money>,

    /// Food purchase cost
    #[arg(long, value_parser = parse_money)]
    pub food: Option<Money>,

    /// Label of the free cost line
    #[arg(long)]
    pub custom_name: Option<String>,

    /// Amount of the free cost line
    #[arg(long, value_parser = parse_money)]
    pub custom_amount: Option<Money>,

    /// Offer automatic rent booking
    #[arg(long)]
    pub auto_rent: Option<bool>,

    /// Override the rent paid flag
    #[arg(long)]
    pub rent_paid: Option<bool>,

    /// Cash required on top of the rent before it is offered
    #[arg(long, value_parser = parse_money)]
    pub rent_buffer: Option<Money>,

    /// Category counted as paint boxes
    #[arg(long)]
    pub paint_category: Option<String>,

    /// Internal teams (ids or names), comma separated
    #[arg(long, value_delimiter = ',')]
    pub internal_teams: Option<Vec<String>>,
}

pub fn execute_cash(ctx: &Context, cmd: CashCommands) -> Result<()> {
    match cmd {
        CashCommands::Status => {
            let state = ctx.load()?;
            let chest = war_chest(&state);
            let entries = entries_newest_first(&state);
            if ctx.json {
                return output::print_json(&serde_json::json!({
                    "warChest": chest,
                    "cashLog": entries,
                }));
            }
            println!("Kriegskasse: {chest}");
            println!();
            output::print_cash_log(&entries);
        }
        CashCommands::Expense(args) => {
            let description = args.description.join(" ");
            let (_, entry) = ctx.mutate(|state| Ok(add_expense(state, args.amount, &description)?))?;
            if ctx.json {
                return output::print_json(&entry);
            }
            output::ok(&format!("Ausgabe gebucht: {} {}", entry.description, entry.amount));
        }
        CashCommands::Deposit(arg) => {
            let (state, entry) = ctx.mutate(|state| Ok(add_deposit(state, arg.amount)?))?;
            if ctx.json {
                return output::print_json(&entry);
            }
            output::ok(&format!(
                "{}: {} (Kasse {})",
                entry.description,
                entry.amount,
                war_chest(&state)
            ));
        }
        CashCommands::Withdraw(arg) => {
            let (state, entry) = ctx.mutate(|state| Ok(withdraw_deposit(state, arg.amount)?))?;
            if ctx.json {
                return output::print_json(&entry);
            }
            output::ok(&format!(
                "{}: {} (Kasse {})",
                entry.description,
                entry.amount,
                war_chest(&state)
            ));
        }
    }
    Ok(())
}

pub fn execute_rent(ctx: &Context, cmd: RentCommands) -> Result<()> {
    match cmd {
        RentCommands::Status => {
            let state = ctx.load()?;
            let due = rent_due(&state);
            if ctx.json {
                return output::print_json(&serde_json::json!({
                    "rentCost": state.costs.rent_cost,
                    "rentPaid": state.costs.rent_paid,
                    "autoRent": state.costs.active,
                    "warChest": war_chest(&state),
                    "due": due,
                }));
            }
            if state.costs.rent_paid {
                output::ok(&format!("Miete bezahlt ({})", state.costs.rent_cost));
            } else if due {
                output::hint(&format!(
                    "Miete fällig: {} (Kasse {})",
                    state.costs.rent_cost,
                    war_chest(&state)
                ));
            } else {
                println!(
                    "Miete offen: {} (Kasse {}, Puffer {})",
                    state.costs.rent_cost,
                    war_chest(&state),
                    state.settings.rent_buffer
                );
            }
        }
        RentCommands::Pay => {
            let (state, entry) = ctx.mutate(|state| Ok(pay_rent(state)?))?;
            if ctx.json {
                return output::print_json(&entry);
            }
            output::ok(&format!(
                "{}: {} (Kasse {})",
                entry.description,
                entry.amount,
                war_chest(&state)
            ));
        }
    }
    Ok(())
}

pub fn execute_costs(ctx: &Context, cmd: CostsCommands) -> Result<()> {
    let state = match cmd {
        CostsCommands::Show => ctx.load()?,
        CostsCommands::Set(args) => {
            let (state, ()) = ctx.mutate(|state| apply_costs(state, args))?;
            state
        }
    };
    if ctx.json {
        return output::print_json(&serde_json::json!({
            "lootConfig": state.costs,
            "eventSettings": state.settings,
        }));
    }
    let c = &state.costs;
    let s = &state.settings;
    println!("Paint / Kiste:      {}", c.paint_cost_per_box);
    println!("Miete:              {}", c.rent_cost);
    println!("Essen:              {}", c.food_cost);
    println!("{:<20}{}", format!("{}:", c.custom_cost_label()), c.custom_cost_amount);
    println!("Auto-Miete:         {}", if c.active { "an" } else { "aus" });
    println!("Miete bezahlt:      {}", if c.rent_paid { "ja" } else { "nein" });
    println!("Miet-Puffer:        {}", s.rent_buffer);
    println!("Paint-Kategorie:    {}", s.paint_category);
    println!("Interne Teams:      {}", s.internal_team_ids.join(", "));
    Ok(())
}

fn apply_costs(state: &mut crate::state::PosState, args: CostsSetArgs) -> Result<()> {
    let non_negative = |m: Money, what: &str| -> Result<Money> {
        if m.is_negative() {
            bail!("{what} must not be negative");
        }
        Ok(m)
    };

    if let Some(m) = args.paint_per_box {
        state.costs.paint_cost_per_box = non_negative(m, "paint cost")?;
    }
    if let Some(m) = args.rent {
        state.costs.rent_cost = non_negative(m, "rent")?;
    }
    if let Some(m) = args.food {
        state.costs.food_cost = non_negative(m, "food cost")?;
    }
    if let Some(name) = args.custom_name {
        state.costs.custom_cost_name = name.trim().to_string();
    }
    if let Some(m) = args.custom_amount {
        state.costs.custom_cost_amount = non_negative(m, "custom cost")?;
    }
    if let Some(on) = args.auto_rent {
        state.costs.active = on;
    }
    if let Some(paid) = args.rent_paid {
        state.costs.rent_paid = paid;
    }
    if let Some(m) = args.rent_buffer {
        state.settings.rent_buffer = non_negative(m, "rent buffer")?;
    }
    if let Some(category) = args.paint_category {
        let category = category.trim().to_uppercase();
        if category.is_empty() {
            bail!("paint category must not be empty");
        }
        state.settings.paint_category = category;
    }
    if let Some(teams) = args.internal_teams {
        let ids = teams
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| resolve_team(state, t))
            .collect::<Result<Vec<_>>>()?;
        state.settings.internal_team_ids = ids;
    }
    tracing::info!(
        rent_cents = state.costs.rent_cost.cents(),
        paint_cents = state.costs.paint_cost_per_box.cents(),
        "Cost settings updated"
    );
    Ok(())
}
