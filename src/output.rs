//! Terminal output formatting for the command line front end.

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::checkout::Receipt;
use crate::diagnostics::{AboutInfo, Health};
use crate::event_report::{EventReport, EventReportRow};
use crate::models::{CashLogEntry, CashLogType, PaymentMethod, Product, Team, Transaction, TxStatus};
use crate::money::Money;
use crate::settlement::{TeamInvoice, TeamSummary};
use crate::stats::{FinancialSummary, JournalEntry, TeamStat};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn ok(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn hint(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn amount(m: Money) -> ColoredString {
    let text = m.to_string();
    if m.is_negative() {
        text.red()
    } else {
        text.normal()
    }
}

fn status(s: TxStatus) -> ColoredString {
    match s {
        TxStatus::Paid => "paid".green(),
        TxStatus::Open => "open".yellow(),
        TxStatus::Settled => "settled".cyan(),
    }
}

pub fn print_receipt(receipt: &Receipt) {
    let tx = &receipt.transaction;
    println!("{}", receipt.message.green().bold());
    for item in &tx.items {
        println!(
            "  {:>3} x {:<28} {:>12}",
            item.count,
            truncate(&item.name, 28),
            item.line_total().to_string()
        );
    }
    println!("  {:<34} {:>12}", "SUMME".bold(), tx.total.to_string().bold());
    println!("  {} {}  {}", "Team:".dimmed(), tx.team_name, tx.id.dimmed());
    if let Some(change) = receipt.change {
        println!("  {} {}", "Rückgeld:".bold(), change.to_string().cyan().bold());
    }
}

pub fn print_transactions(txs: &[&Transaction]) {
    if txs.is_empty() {
        println!("{}", "No transactions found.".dimmed());
        return;
    }
    println!(
        "{:<16} {:<11} {:<6} {:<10} {:<8} {:<26} {:>12}",
        "ID", "Datum", "Zeit", "Methode", "Status", "Team", "Summe"
    );
    println!("{}", "─".repeat(95));
    for tx in txs {
        println!(
            "{:<16} {:<11} {:<6} {:<10} {:<8} {:<26} {:>12}",
            tx.id,
            tx.date_str(),
            tx.time_str(),
            truncate(&tx.method_id, 10),
            status(tx.status),
            truncate(&tx.team_name, 26),
            tx.total.to_string()
        );
    }
}

pub fn print_tabs(summaries: &[TeamSummary], outstanding: Money) {
    if summaries.is_empty() {
        println!("{}", "No bookings yet.".dimmed());
        return;
    }
    println!("{:<34} {:>12} {:>12} {:>6}", "Team", "Offen", "Umsatz", "Buch.");
    println!("{}", "─".repeat(68));
    for s in summaries {
        let debt = if s.total_debt.is_positive() {
            s.total_debt.to_string().yellow().bold()
        } else {
            s.total_debt.to_string().dimmed()
        };
        println!(
            "{:<34} {:>12} {:>12} {:>6}",
            truncate(&s.name, 34),
            debt,
            s.total_volume.to_string(),
            s.count
        );
    }
    println!("{}", "─".repeat(68));
    println!("{:<34} {:>12}", "Gesamt offen".bold(), outstanding.to_string().bold());
}

pub fn print_invoice(invoice: &TeamInvoice) {
    println!("{} {}", invoice.name.cyan().bold(), format!("({})", invoice.team_id).dimmed());
    println!();
    for tx in &invoice.transactions {
        println!(
            "{} {}  {:<8} {:>12}",
            tx.date_str().dimmed(),
            tx.time_str(),
            status(tx.status),
            tx.total.to_string()
        );
        for item in &tx.items {
            println!("      {} x {}", item.count, item.name);
        }
    }
    println!();
    println!("{}: {}", "Offen".bold(), invoice.open_balance.to_string().yellow().bold());
}

pub fn print_summary(s: &FinancialSummary, outstanding: Money) {
    println!("{}", "GEWINN / VERLUST".bold());
    println!("  {:<28} {:>12}", "Umsatz (brutto)", amount(s.gross_revenue));
    println!("  {:<28} {:>12}", "Ausgaben (Kasse)", amount(-s.manual_expenses));
    println!("  {:<28} {:>12}", "Eigenverbrauch", amount(-s.internal_consumption));
    println!(
        "  {:<28} {:>12}",
        format!("Paint ({} Kisten)", s.paint_boxes_sold),
        amount(-s.paint_cost)
    );
    println!("  {:<28} {:>12}", "Essen", amount(-s.food_cost));
    println!("  {:<28} {:>12}", "Miete", amount(-s.rent_for_balance));
    println!("  {:<28} {:>12}", truncate(&s.custom_cost_name, 28), amount(-s.custom_cost));
    let profit = if s.net_profit.is_negative() {
        s.net_profit.to_string().red().bold()
    } else {
        s.net_profit.to_string().green().bold()
    };
    println!("  {:<28} {:>12}", "Reingewinn".bold(), profit);
    println!();
    println!("{}", "KRIEGSKASSE".bold());
    println!("  {:<28} {:>12}", "Bareinnahmen", amount(s.cash_revenue));
    println!("  {:<28} {:>12}", "Einlagen", amount(s.deposits));
    println!("  {:<28} {:>12}", "Ausgaben", amount(-s.manual_expenses));
    println!("  {:<28} {:>12}", "Entnahmen", amount(-s.withdrawals));
    println!("  {:<28} {:>12}", "Soll-Bestand".bold(), s.war_chest.to_string().bold());
    println!("  {:<28} {:>12}", "Offene Rechnungen", outstanding.to_string().yellow());
}

pub fn print_team_stats(stats: &[TeamStat]) {
    if stats.is_empty() {
        println!("{}", "No matching sales.".dimmed());
        return;
    }
    let total: Money = stats.iter().map(|s| s.value).sum();
    for (i, s) in stats.iter().enumerate() {
        let share = if total.is_positive() {
            s.value.cents() as f64 * 100.0 / total.cents() as f64
        } else {
            0.0
        };
        println!(
            "{:>2}. {:<34} {:>12} {:>5.1}%",
            i + 1,
            truncate(&s.name, 34),
            s.value.to_string(),
            share
        );
    }
}

pub fn print_journal(entries: &[JournalEntry]) {
    if entries.is_empty() {
        println!("{}", "Journal is empty.".dimmed());
        return;
    }
    for e in entries {
        let signed = e.signed_amount();
        let value = if e.inflow {
            format!("+{}", e.amount).green()
        } else {
            signed.to_string().red()
        };
        println!(
            "{} {:<6} {:<17} {:<32} {:>13}",
            crate::models::local_date_str(e.timestamp).dimmed(),
            crate::models::local_time_str(e.timestamp),
            e.kind.label(),
            truncate(&e.description, 32),
            value
        );
    }
}

pub fn print_cash_log(entries: &[&CashLogEntry]) {
    if entries.is_empty() {
        println!("{}", "Cash log is empty.".dimmed());
        return;
    }
    for e in entries {
        let value = match e.kind {
            CashLogType::Deposit => format!("+{}", e.amount).green(),
            CashLogType::Expense | CashLogType::Withdraw => format!("-{}", e.amount).red(),
        };
        println!(
            "{:<16} {:<6} {:<9} {:<32} {:>13}",
            e.id.dimmed(),
            e.time_str(),
            e.kind.as_str(),
            truncate(&e.description, 32),
            value
        );
    }
}

pub fn print_products(products: &[&Product]) {
    if products.is_empty() {
        println!("{}", "No products.".dimmed());
        return;
    }
    println!("{:<16} {:<30} {:<24} {:>10}  {}", "ID", "Name", "Kategorie", "Preis", "Aktiv");
    println!("{}", "─".repeat(90));
    for p in products {
        let active = if p.active { "ja".green() } else { "nein".dimmed() };
        println!(
            "{:<16} {:<30} {:<24} {:>10}  {}",
            p.id,
            truncate(&p.name, 30),
            truncate(p.category.as_deref().unwrap_or("-"), 24),
            p.price.to_string(),
            active
        );
    }
}

pub fn print_teams(teams: &[Team], internal: &[String]) {
    for t in teams {
        let mut flags = Vec::new();
        if !t.active {
            flags.push("inaktiv".dimmed());
        }
        if internal.iter().any(|id| id == &t.id) {
            flags.push("intern".cyan());
        }
        let flags: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
        println!("{:<16} {:<40} {}", t.id, t.name, flags.join(" "));
    }
}

pub fn print_methods(methods: &[PaymentMethod]) {
    for m in methods {
        println!(
            "{:<12} {:<16} {:<8} {:<12} {}",
            m.id,
            m.name,
            status(m.initial_status),
            if m.requires_team { "team" } else { "-" },
            if m.active { "aktiv".green() } else { "inaktiv".dimmed() }
        );
    }
}

pub fn print_report_rows(rows: &[EventReportRow]) {
    if rows.is_empty() {
        println!("{}", "No archived events.".dimmed());
        return;
    }
    println!(
        "{:<17} {:<11} {:>6} {:>12} {:>12} {:>12}",
        "ID", "Datum", "Buch.", "Umsatz", "Gewinn", "Kasse"
    );
    println!("{}", "─".repeat(75));
    for r in rows {
        println!(
            "{:<17} {:<11} {:>6} {:>12} {:>12} {:>12}",
            r.id,
            r.event_date,
            r.transaction_count,
            r.gross_revenue.to_string(),
            amount(r.net_profit),
            r.war_chest.to_string()
        );
    }
}

pub fn print_report(report: &EventReport) {
    println!(
        "{} {} {}",
        "Event".cyan().bold(),
        report.event_date.cyan().bold(),
        format!("({})", report.id).dimmed()
    );
    println!();
    print_summary(&report.summary, report.outstanding);
    println!();
    print_tabs(&report.tabs, report.outstanding);
}

pub fn print_about(about: &AboutInfo, health: &Health) {
    println!("{} v{}", "Pocket Hornet".cyan().bold(), about.version);
    println!("  {:<14} {}", "Build:", about.build_timestamp);
    println!("  {:<14} {}", "Git:", about.git_sha);
    println!("  {:<14} {}/{}", "Platform:", about.platform, about.arch);
    println!("  {:<14} {}", "Database:", health.db_path);
    println!("  {:<14} v{} ({} bytes)", "Schema:", health.schema_version, health.db_size_bytes);
    println!("  {:<14} {}", "Transactions:", health.transactions);
    println!("  {:<14} {}", "Cash log:", health.cash_log_entries);
    println!("  {:<14} {}", "Reports:", health.archived_reports);
    println!("  {:<14} {}", "Log files:", health.log_files);
}
