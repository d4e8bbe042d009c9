//! Report commands: profit summary, team ranking, journal, transaction search.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use super::{parse_money, resolve_product, Context};
use crate::ledger::{filter_transactions, TransactionFilter};
use crate::models::{TxStatus, FILTER_ALL};
use crate::money::Money;
use crate::output;
use crate::settlement::total_outstanding;
use crate::stats::{expense_timeline, journal, summarize, team_stats, TeamStatsFilter};

#[derive(Subcommand)]
pub enum StatsCommands {
    /// Profit and loss plus war chest
    Summary,

    /// Revenue per team, optionally for one category or product
    Teams(TeamStatsArgs),

    /// Every booking and cash movement, newest first
    Journal,

    /// Expenses, internal consumption and cash movements
    Expenses,
}

#[derive(Args)]
pub struct TeamStatsArgs {
    /// Category name (ALLE for all)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Product id or name (ALLE for all)
    #[arg(short, long)]
    pub product: Option<String>,
}

#[derive(Args)]
pub struct TxArgs {
    /// Text in the team name or an item name
    #[arg(short, long)]
    pub search: Option<String>,

    /// paid, open or settled
    #[arg(long)]
    pub status: Option<String>,

    /// Payment method id
    #[arg(short, long)]
    pub method: Option<String>,

    /// Minimum total
    #[arg(long, value_parser = parse_money)]
    pub min: Option<Money>,

    /// Maximum total
    #[arg(long, value_parser = parse_money)]
    pub max: Option<Money>,

    /// Show at most this many transactions
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,
}

pub fn execute(ctx: &Context, cmd: StatsCommands) -> Result<()> {
    let state = ctx.load()?;
    match cmd {
        StatsCommands::Summary => {
            let summary = summarize(&state);
            let outstanding = total_outstanding(&state);
            if ctx.json {
                return output::print_json(&serde_json::json!({
                    "summary": summary,
                    "totalOutflow": summary.total_outflow(),
                    "totalOutstanding": outstanding,
                }));
            }
            output::print_summary(&summary, outstanding);
        }
        StatsCommands::Teams(args) => {
            let product_id = match args.product.as_deref() {
                Some(p) if !p.trim().eq_ignore_ascii_case(FILTER_ALL) => {
                    Some(resolve_product(&state, p)?)
                }
                other => other.map(str::to_string),
            };
            let filter = TeamStatsFilter {
                category: args.category,
                product_id,
            };
            let stats = team_stats(&state, &filter);
            if ctx.json {
                return output::print_json(&stats);
            }
            output::print_team_stats(&stats);
        }
        StatsCommands::Journal => {
            let journal = journal(&state);
            if ctx.json {
                return output::print_json(&journal);
            }
            output::print_journal(&journal.entries);
            println!();
            println!(
                "Einnahmen {}  Ausgaben {}  Saldo {}",
                journal.total_in, journal.total_out, journal.net
            );
        }
        StatsCommands::Expenses => {
            let timeline = expense_timeline(&state);
            let summary = summarize(&state);
            if ctx.json {
                return output::print_json(&serde_json::json!({
                    "entries": timeline,
                    "totalOutflow": summary.total_outflow(),
                }));
            }
            output::print_journal(&timeline);
            println!();
            println!("Abflüsse gesamt: {}", summary.total_outflow());
        }
    }
    Ok(())
}

pub fn transactions(ctx: &Context, args: TxArgs) -> Result<()> {
    let state = ctx.load()?;
    let status = args
        .status
        .as_deref()
        .map(|s| TxStatus::parse(s).ok_or_else(|| anyhow!("unknown status '{s}'")))
        .transpose()?;
    let filter = TransactionFilter {
        search: args.search,
        status,
        method_id: args.method,
        min_total: args.min,
        max_total: args.max,
    };
    let mut hits = filter_transactions(&state, &filter);
    hits.truncate(args.limit);
    if ctx.json {
        return output::print_json(&hits);
    }
    output::print_transactions(&hits);
    Ok(())
}
