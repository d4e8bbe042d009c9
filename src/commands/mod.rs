//! CLI command definitions and handlers.
//!
//! Every handler follows the same cycle: load the snapshot, run one ledger
//! operation, save, print.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::DATA_DIR_ENV;
use crate::db::{self, DbState};
use crate::error::PosError;
use crate::money::Money;
use crate::state::PosState;
use crate::store;

pub mod admin;
pub mod cash;
pub mod report;
pub mod sell;
pub mod stats;
pub mod tabs;

/// Pocket Hornet - point of sale for paintball events
#[derive(Parser)]
#[command(name = "pocket-hornet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (database, logs, reports)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    pub data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Show log output on the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write the log file as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Book a sale: items as ID or ID:COUNT
    Sell(sell::SellArgs),

    /// Remove the most recent transaction
    Undo,

    /// Cancel a transaction by id (storno)
    #[command(alias = "storno")]
    Void(sell::VoidArgs),

    /// Open tabs of all teams
    Tabs,

    /// Statement of one team
    Tab(tabs::TeamArg),

    /// Settle every open transaction of a team
    Settle(tabs::TeamArg),

    /// Cash box: expenses, deposits, withdrawals
    #[command(subcommand)]
    Cash(cash::CashCommands),

    /// Hall rent booking
    #[command(subcommand)]
    Rent(cash::RentCommands),

    /// Cost settings and event settings
    #[command(subcommand)]
    Costs(cash::CostsCommands),

    /// Profit report, team ranking, journal
    #[command(subcommand)]
    Stats(stats::StatsCommands),

    /// Search the transaction list
    Tx(stats::TxArgs),

    /// Products and categories
    #[command(subcommand)]
    Catalog(admin::CatalogCommands),

    /// Teams
    #[command(subcommand)]
    Teams(admin::TeamCommands),

    /// Payment methods
    #[command(subcommand)]
    Methods(admin::MethodCommands),

    /// Export or import the admin configuration
    #[command(subcommand)]
    Config(admin::ConfigCommands),

    /// Close the event and manage archived reports
    #[command(subcommand)]
    Report(report::ReportCommands),

    /// Clear the event ledger, or everything with --factory
    Reset(admin::ResetArgs),

    /// Version, build and storage information
    About,
}

/// Everything a handler needs: the open database and where files go.
pub struct Context {
    pub db: DbState,
    pub data_dir: PathBuf,
    pub json: bool,
}

impl Context {
    pub fn open(data_dir: &Path, json: bool) -> Result<Self> {
        let db = db::init(data_dir)
            .with_context(|| format!("opening database in {}", data_dir.display()))?;
        Ok(Self {
            db,
            data_dir: data_dir.to_path_buf(),
            json,
        })
    }

    pub fn load(&self) -> Result<PosState> {
        store::load(&self.db).context("loading state")
    }

    pub fn save(&self, state: &PosState) -> Result<()> {
        store::save(&self.db, state).context("saving state")
    }

    /// Load, apply `op`, save. The state is only written when `op` succeeds.
    pub fn mutate<T>(&self, op: impl FnOnce(&mut PosState) -> Result<T>) -> Result<(PosState, T)> {
        let mut state = self.load()?;
        let out = op(&mut state)?;
        self.save(&state)?;
        Ok((state, out))
    }
}

impl Cli {
    pub fn execute(self, data_dir: PathBuf) -> Result<()> {
        let ctx = Context::open(&data_dir, self.json)?;

        match self.command {
            Commands::Sell(args) => sell::sell(&ctx, args),
            Commands::Undo => sell::undo(&ctx),
            Commands::Void(args) => sell::void(&ctx, args),
            Commands::Tabs => tabs::list(&ctx),
            Commands::Tab(arg) => tabs::show(&ctx, arg),
            Commands::Settle(arg) => tabs::settle(&ctx, arg),
            Commands::Cash(cmd) => cash::execute_cash(&ctx, cmd),
            Commands::Rent(cmd) => cash::execute_rent(&ctx, cmd),
            Commands::Costs(cmd) => cash::execute_costs(&ctx, cmd),
            Commands::Stats(cmd) => stats::execute(&ctx, cmd),
            Commands::Tx(args) => stats::transactions(&ctx, args),
            Commands::Catalog(cmd) => admin::execute_catalog(&ctx, cmd),
            Commands::Teams(cmd) => admin::execute_teams(&ctx, cmd),
            Commands::Methods(cmd) => admin::execute_methods(&ctx, cmd),
            Commands::Config(cmd) => admin::execute_config(&ctx, cmd),
            Commands::Report(cmd) => report::execute(&ctx, cmd),
            Commands::Reset(args) => admin::reset(&ctx, args),
            Commands::About => about(&ctx),
        }
    }
}

fn about(ctx: &Context) -> Result<()> {
    let state = ctx.load()?;
    let about = crate::diagnostics::get_about_info();
    let health = crate::diagnostics::get_health(
        &ctx.db,
        &state,
        &crate::config::log_dir(&ctx.data_dir),
    )?;
    if ctx.json {
        return crate::output::print_json(&serde_json::json!({
            "about": about,
            "health": health,
        }));
    }
    crate::output::print_about(&about, &health);
    Ok(())
}

// ---------------------------------------------------------------------------
// Argument parsing helpers shared by the handlers
// ---------------------------------------------------------------------------

/// clap value parser for euro amounts ("12,50", "12.5", "3 €").
pub fn parse_money(raw: &str) -> std::result::Result<Money, String> {
    Money::parse(raw).map_err(|e| e.to_string())
}

/// Team reference (id, name or `bar`) to team id.
pub fn resolve_team(state: &PosState, reference: &str) -> Result<String> {
    state
        .resolve_team_id(reference)
        .ok_or_else(|| PosError::UnknownTeam(reference.to_string()).into())
}

/// Product reference (id or name) to product id.
pub fn resolve_product(state: &PosState, reference: &str) -> Result<String> {
    state
        .resolve_product_id(reference)
        .ok_or_else(|| PosError::UnknownProduct(reference.to_string()).into())
}
