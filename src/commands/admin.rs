//! Admin commands: catalog, teams, payment methods, config transfer, reset.

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::{parse_money, resolve_product, resolve_team, Context};
use crate::catalog::{
    add_category, add_payment_method, add_product, add_team, delete_category, delete_product,
    delete_team, move_product, products_in_category, rename_category, rename_team,
    set_payment_method_active, set_team_active, update_product, ProductPatch,
};
use crate::config_transfer::{apply_import, export_config, export_file_name, parse_config};
use crate::models::{TxStatus, FILTER_ALL};
use crate::money::Money;
use crate::output;
use crate::store;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List products
    List {
        /// Only this category
        #[arg(short, long, default_value = FILTER_ALL)]
        category: String,
    },

    /// Add a product
    Add(ProductAddArgs),

    /// Change a product
    Edit(ProductEditArgs),

    /// Delete a product
    Delete {
        /// Product id or name
        product: String,
    },

    /// Move a product to the position of another one
    Move {
        /// Product to move
        product: String,
        /// Product whose position it takes
        target: String,
    },

    /// List categories
    Categories,

    /// Add a category
    AddCategory { name: String },

    /// Rename a category, products follow
    RenameCategory { old: String, new: String },

    /// Delete a category, products fall back to ALLGEMEIN
    DeleteCategory { name: String },
}

#[derive(Args)]
pub struct ProductAddArgs {
    /// Product name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Price in euros
    #[arg(short, long, value_parser = parse_money)]
    pub price: Option<Money>,

    /// Category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ProductEditArgs {
    /// Product id or name
    pub product: String,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long, value_parser = parse_money)]
    pub price: Option<Money>,

    #[arg(short, long, conflicts_with = "no_category")]
    pub category: Option<String>,

    /// Remove the category
    #[arg(long)]
    pub no_category: bool,

    /// Show the product at the counter
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Hide the product at the counter
    #[arg(long)]
    pub inactive: bool,
}

pub fn execute_catalog(ctx: &Context, cmd: CatalogCommands) -> Result<()> {
    match cmd {
        CatalogCommands::List { category } => {
            let state = ctx.load()?;
            let products = products_in_category(&state, &category);
            if ctx.json {
                return output::print_json(&products);
            }
            output::print_products(&products);
        }
        CatalogCommands::Add(args) => {
            let (state, id) = ctx.mutate(|state| {
                let id = add_product(state, args.category.as_deref());
                if args.name.is_some() || args.price.is_some() {
                    update_product(
                        state,
                        &id,
                        ProductPatch {
                            name: args.name,
                            price: args.price,
                            ..Default::default()
                        },
                    )?;
                }
                Ok(id)
            })?;
            let product = state
                .product(&id)
                .ok_or_else(|| anyhow!("product {id} vanished"))?;
            if ctx.json {
                return output::print_json(product);
            }
            output::ok(&format!("Artikel angelegt: {} {} ({})", product.name, product.price, id));
        }
        CatalogCommands::Edit(args) => {
            let (state, id) = ctx.mutate(|state| {
                let id = resolve_product(state, &args.product)?;
                let category = if args.no_category {
                    Some(None)
                } else {
                    args.category.map(Some)
                };
                let active = match (args.active, args.inactive) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                update_product(
                    state,
                    &id,
                    ProductPatch {
                        name: args.name,
                        price: args.price,
                        active,
                        category,
                    },
                )?;
                Ok(id)
            })?;
            let product = state
                .product(&id)
                .ok_or_else(|| anyhow!("product {id} vanished"))?;
            if ctx.json {
                return output::print_json(product);
            }
            output::ok(&format!("Artikel geändert: {} {}", product.name, product.price));
        }
        CatalogCommands::Delete { product } => {
            let (_, removed) = ctx.mutate(|state| {
                let id = resolve_product(state, &product)?;
                Ok(delete_product(state, &id)?)
            })?;
            output::ok(&format!("Artikel gelöscht: {}", removed.name));
        }
        CatalogCommands::Move { product, target } => {
            ctx.mutate(|state| {
                let id = resolve_product(state, &product)?;
                let target_id = resolve_product(state, &target)?;
                Ok(move_product(state, &id, &target_id)?)
            })?;
            output::ok("Reihenfolge geändert");
        }
        CatalogCommands::Categories => {
            let state = ctx.load()?;
            if ctx.json {
                return output::print_json(&state.categories);
            }
            for c in &state.categories {
                let n = products_in_category(&state, c).len();
                println!("{c:<32} {n:>3}");
            }
        }
        CatalogCommands::AddCategory { name } => {
            let (_, name) = ctx.mutate(|state| Ok(add_category(state, &name)?))?;
            output::ok(&format!("Kategorie angelegt: {name}"));
        }
        CatalogCommands::RenameCategory { old, new } => {
            let (_, moved) = ctx.mutate(|state| Ok(rename_category(state, &old, &new)?))?;
            output::ok(&format!("Kategorie umbenannt ({moved} Artikel)"));
        }
        CatalogCommands::DeleteCategory { name } => {
            let (_, moved) = ctx.mutate(|state| Ok(delete_category(state, &name)?))?;
            output::ok(&format!("Kategorie gelöscht ({moved} Artikel verschoben)"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List teams
    List,

    /// Register a team
    Add { name: String },

    /// Rename a team
    Rename { team: String, name: String },

    /// Show the team at the counter again
    Enable { team: String },

    /// Hide the team at the counter
    Disable { team: String },

    /// Remove the team from the roster
    Delete { team: String },
}

pub fn execute_teams(ctx: &Context, cmd: TeamCommands) -> Result<()> {
    match cmd {
        TeamCommands::List => {
            let state = ctx.load()?;
            if ctx.json {
                return output::print_json(&state.teams);
            }
            output::print_teams(&state.teams, &state.settings.internal_team_ids);
        }
        TeamCommands::Add { name } => {
            let (_, id) = ctx.mutate(|state| Ok(add_team(state, &name)))?;
            output::ok(&format!("Team angelegt: {} ({id})", name.trim()));
        }
        TeamCommands::Rename { team, name } => {
            ctx.mutate(|state| {
                let id = resolve_team(state, &team)?;
                Ok(rename_team(state, &id, &name)?)
            })?;
            output::ok(&format!("Team umbenannt: {}", name.trim()));
        }
        TeamCommands::Enable { team } => {
            ctx.mutate(|state| {
                let id = resolve_team(state, &team)?;
                Ok(set_team_active(state, &id, true)?)
            })?;
            output::ok(&format!("Team aktiv: {team}"));
        }
        TeamCommands::Disable { team } => {
            ctx.mutate(|state| {
                let id = resolve_team(state, &team)?;
                Ok(set_team_active(state, &id, false)?)
            })?;
            output::ok(&format!("Team inaktiv: {team}"));
        }
        TeamCommands::Delete { team } => {
            let (_, removed) = ctx.mutate(|state| {
                let id = resolve_team(state, &team)?;
                Ok(delete_team(state, &id)?)
            })?;
            output::ok(&format!("Team gelöscht: {}", removed.name));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Payment methods
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum MethodCommands {
    /// List payment methods
    List,

    /// Add a payment method
    Add {
        /// Short id, e.g. `card`
        id: String,
        /// Display name
        name: String,
        /// Sales must be booked on a team
        #[arg(long)]
        requires_team: bool,
        /// Status of new transactions: paid or open
        #[arg(long, default_value = "paid")]
        status: String,
    },

    /// Allow the method at the counter
    Enable { id: String },

    /// Hide the method at the counter
    Disable { id: String },
}

pub fn execute_methods(ctx: &Context, cmd: MethodCommands) -> Result<()> {
    match cmd {
        MethodCommands::List => {
            let state = ctx.load()?;
            if ctx.json {
                return output::print_json(&state.payment_methods);
            }
            output::print_methods(&state.payment_methods);
        }
        MethodCommands::Add {
            id,
            name,
            requires_team,
            status,
        } => {
            let initial = TxStatus::parse(&status)
                .ok_or_else(|| anyhow!("unknown status '{status}' (paid or open)"))?;
            ctx.mutate(|state| Ok(add_payment_method(state, &id, &name, requires_team, initial)?))?;
            output::ok(&format!("Zahlungsart angelegt: {}", name.trim().to_uppercase()));
        }
        MethodCommands::Enable { id } => {
            ctx.mutate(|state| Ok(set_payment_method_active(state, &id, true)?))?;
            output::ok(&format!("Zahlungsart aktiv: {id}"));
        }
        MethodCommands::Disable { id } => {
            ctx.mutate(|state| Ok(set_payment_method_active(state, &id, false)?))?;
            output::ok(&format!("Zahlungsart inaktiv: {id}"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Config transfer
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the admin configuration to a JSON file
    Export {
        /// Output file (default: HORNET_CONFIG_<date>.json in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Replace the admin configuration from an exported file
    Import {
        /// Exported JSON file
        file: PathBuf,
    },
}

pub fn execute_config(ctx: &Context, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Export { out } => {
            let state = ctx.load()?;
            let doc = export_config(&state);
            let path = out.unwrap_or_else(|| {
                PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
            });
            let raw = serde_json::to_string_pretty(&doc)?;
            std::fs::write(&path, raw)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "Config exported");
            output::ok(&format!("Config exportiert: {}", path.display()));
        }
        ConfigCommands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let doc = parse_config(&raw)?;
            let (_, replaced) = ctx.mutate(|state| Ok(apply_import(state, doc.payload)))?;
            output::ok(&format!("Config geladen: {}", replaced.join(", ")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ResetArgs {
    /// Also drop catalog, teams and settings (back to seed data)
    #[arg(long)]
    pub factory: bool,

    /// Confirm the reset
    #[arg(long)]
    pub yes: bool,
}

pub fn reset(ctx: &Context, args: ResetArgs) -> Result<()> {
    if !args.yes {
        bail!("reset deletes data; run again with --yes to confirm");
    }
    if args.factory {
        store::factory_reset(&ctx.db)?;
        output::ok("Werkseinstellungen wiederhergestellt");
    } else {
        let mut state = ctx.load()?;
        store::reset_event(&ctx.db, &mut state)?;
        output::ok("Kasse genullt");
    }
    Ok(())
}
