//! Team tab commands: overview, statement, settle.

use anyhow::Result;
use clap::Args;

use super::{resolve_team, Context};
use crate::output;
use crate::settlement::{settle_team, team_invoice, team_label, team_summaries, total_outstanding};

#[derive(Args)]
pub struct TeamArg {
    /// Team id or name; `bar` for direct sales
    pub team: String,
}

pub fn list(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let summaries = team_summaries(&state);
    let outstanding = total_outstanding(&state);
    if ctx.json {
        return output::print_json(&serde_json::json!({
            "teams": summaries,
            "totalOutstanding": outstanding,
        }));
    }
    output::print_tabs(&summaries, outstanding);
    Ok(())
}

pub fn show(ctx: &Context, arg: TeamArg) -> Result<()> {
    let state = ctx.load()?;
    let team_id = resolve_team(&state, &arg.team)?;
    let invoice = team_invoice(&state, &team_id);
    if ctx.json {
        return output::print_json(&invoice);
    }
    output::print_invoice(&invoice);
    Ok(())
}

pub fn settle(ctx: &Context, arg: TeamArg) -> Result<()> {
    let (state, (team_id, amount)) = ctx.mutate(|state| {
        let team_id = resolve_team(state, &arg.team)?;
        let amount = settle_team(state, &team_id)?;
        Ok((team_id, amount))
    })?;
    if ctx.json {
        return output::print_json(&serde_json::json!({
            "teamId": team_id,
            "settled": amount,
        }));
    }
    output::ok(&format!(
        "{} beglichen: {}",
        team_label(&state, &team_id),
        amount
    ));
    Ok(())
}
