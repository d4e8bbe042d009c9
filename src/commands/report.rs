//! Event close and report archive commands.

use anyhow::{bail, Result};
use clap::Subcommand;

use super::Context;
use crate::event_report::{
    build_report, close_event, generate_report_file, get_report, list_reports,
};
use crate::output;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Preview the report of the running event
    Preview,

    /// Archive the event and clear the ledger for the next one
    Close {
        /// Also write the HTML report
        #[arg(long)]
        html: bool,

        /// Confirm closing the event
        #[arg(long)]
        yes: bool,
    },

    /// List archived events
    List,

    /// Show an archived event
    Show { id: String },

    /// Write an archived event as HTML into the reports directory
    Html { id: String },
}

pub fn execute(ctx: &Context, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Preview => {
            let state = ctx.load()?;
            let report = build_report(&state);
            if ctx.json {
                return output::print_json(&report);
            }
            output::print_report(&report);
        }
        ReportCommands::Close { html, yes } => {
            if !yes {
                bail!("closing clears all transactions; run again with --yes to confirm");
            }
            let mut state = ctx.load()?;
            let report = close_event(&ctx.db, &mut state)?;
            let path = if html {
                Some(generate_report_file(&ctx.db, &report.id, &ctx.data_dir)?)
            } else {
                None
            };
            if ctx.json {
                return output::print_json(&serde_json::json!({
                    "report": report,
                    "htmlPath": path,
                }));
            }
            output::print_report(&report);
            println!();
            output::ok(&format!("Event archiviert: {}", report.id));
            if let Some(path) = path {
                output::ok(&format!("HTML: {}", path.display()));
            }
        }
        ReportCommands::List => {
            let rows = list_reports(&ctx.db)?;
            if ctx.json {
                return output::print_json(&rows);
            }
            output::print_report_rows(&rows);
        }
        ReportCommands::Show { id } => {
            let report = get_report(&ctx.db, &id)?;
            if ctx.json {
                return output::print_json(&report);
            }
            output::print_report(&report);
        }
        ReportCommands::Html { id } => {
            let path = generate_report_file(&ctx.db, &id, &ctx.data_dir)?;
            output::ok(&format!("HTML: {}", path.display()));
        }
    }
    Ok(())
}
