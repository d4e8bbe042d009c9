//! End-of-event close: archive the figures of the event, then clear the
//! ledger for the next one. Archived reports can be rendered as a standalone
//! HTML page.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::db::DbState;
use crate::error::{PosError, PosResult};
use crate::models::local_date_str;
use crate::money::Money;
use crate::settlement::{team_summaries, total_outstanding, TeamSummary};
use crate::state::PosState;
use crate::stats::{journal, summarize, team_stats, FinancialSummary, Journal, TeamStat, TeamStatsFilter};
use crate::store;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReport {
    pub id: String,
    /// Local date of the first booking, `dd.mm.yyyy`.
    pub event_date: String,
    pub closed_at: DateTime<Utc>,
    pub summary: FinancialSummary,
    pub outstanding: Money,
    pub tabs: Vec<TeamSummary>,
    pub team_stats: Vec<TeamStat>,
    pub journal: Journal,
}

/// One line of the report archive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventReportRow {
    pub id: String,
    pub event_date: String,
    pub closed_at: String,
    pub transaction_count: i64,
    pub gross_revenue: Money,
    pub net_profit: Money,
    pub war_chest: Money,
    pub outstanding: Money,
    pub html_path: Option<String>,
}

/// Build the report for the current state without touching anything.
pub fn build_report(state: &PosState) -> EventReport {
    let closed_at = Utc::now();
    let first = state
        .transactions
        .iter()
        .map(|tx| tx.timestamp)
        .chain(state.cash_log.iter().map(|e| e.timestamp))
        .min()
        .unwrap_or(closed_at);

    EventReport {
        id: crate::new_id("evt"),
        event_date: local_date_str(first),
        closed_at,
        summary: summarize(state),
        outstanding: total_outstanding(state),
        tabs: team_summaries(state),
        team_stats: team_stats(state, &TeamStatsFilter::default()),
        journal: journal(state),
    }
}

/// Archive the event and reset the ledger in one database transaction. On
/// success `state` is the reset state.
pub fn close_event(db: &DbState, state: &mut PosState) -> PosResult<EventReport> {
    if state.transactions.is_empty() && state.cash_log.is_empty() {
        return Err(PosError::NothingToClose);
    }

    let report = build_report(state);
    let report_json = serde_json::to_string(&report)?;
    let mut next = state.clone();
    next.reset_event();

    let conn = db.lock()?;
    conn.execute_batch("BEGIN IMMEDIATE")?;

    let result = (|| -> PosResult<()> {
        conn.execute(
            "INSERT INTO event_reports (
                id, event_date, closed_at, transaction_count, gross_revenue,
                net_profit, war_chest, outstanding, report_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.id,
                report.event_date,
                report.closed_at.to_rfc3339(),
                report.summary.transaction_count as i64,
                report.summary.gross_revenue.to_euros(),
                report.summary.net_profit.to_euros(),
                report.summary.war_chest.to_euros(),
                report.outstanding.to_euros(),
                report_json,
            ],
        )?;
        store::write_documents(&conn, &next)?;
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
        }
        Err(e) => {
            error!(error = %e, "Event close failed, rolling back");
            let _ = conn.execute_batch("ROLLBACK");
            return Err(e);
        }
    }

    *state = next;
    info!(
        report_id = %report.id,
        transactions = report.summary.transaction_count,
        gross_cents = report.summary.gross_revenue.cents(),
        profit_cents = report.summary.net_profit.cents(),
        "Event closed and archived"
    );
    Ok(report)
}

fn map_report_row(row: &rusqlite::Row) -> rusqlite::Result<EventReportRow> {
    Ok(EventReportRow {
        id: row.get(0)?,
        event_date: row.get(1)?,
        closed_at: row.get(2)?,
        transaction_count: row.get(3)?,
        gross_revenue: Money::from_euros(row.get(4)?),
        net_profit: Money::from_euros(row.get(5)?),
        war_chest: Money::from_euros(row.get(6)?),
        outstanding: Money::from_euros(row.get(7)?),
        html_path: row.get(8)?,
    })
}

/// Archived reports, newest first.
pub fn list_reports(db: &DbState) -> PosResult<Vec<EventReportRow>> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare(
        "SELECT id, event_date, closed_at, transaction_count, gross_revenue,
                net_profit, war_chest, outstanding, html_path
         FROM event_reports ORDER BY closed_at DESC",
    )?;
    let rows = stmt
        .query_map([], map_report_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_report(db: &DbState, id: &str) -> PosResult<EventReport> {
    let conn = db.lock()?;
    let raw: Option<String> = conn
        .query_row(
            "SELECT report_json FROM event_reports WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    let raw = raw.ok_or_else(|| PosError::ReportNotFound(id.to_string()))?;
    Ok(serde_json::from_str(&raw)?)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn money_row(out: &mut String, label: &str, amount: Money) {
    let style = if amount.is_negative() {
        "text-align:right;color:#c00;"
    } else {
        "text-align:right;"
    };
    let _ = writeln!(
        out,
        r#"<tr><td>{}</td><td style="{style}">{amount}</td></tr>"#,
        escape_html(label)
    );
}

/// Render the report as a standalone HTML document.
pub fn render_html(report: &EventReport) -> String {
    let s = &report.summary;
    let mut body = String::new();

    let _ = writeln!(
        body,
        r#"<div style="text-align:center;font-size:14px;font-weight:bold;margin:8px 0;">
E V E N T - A B S C H L U S S</div>
<hr style="border:none;border-top:2px solid #000;"/>
<div style="margin:4px 0;">
Datum: {}<br/>
Abgeschlossen: {}<br/>
Buchungen: {}
</div>"#,
        report.event_date,
        report.closed_at.format("%d.%m.%Y %H:%M UTC"),
        s.transaction_count
    );

    body.push_str(r#"<hr style="border:none;border-top:1px dashed #000;"/>
<div style="margin:4px 0;"><strong>GEWINN / VERLUST</strong></div>
<table style="width:100%;font-family:monospace;font-size:10px;">
"#);
    money_row(&mut body, "Umsatz (brutto)", s.gross_revenue);
    money_row(&mut body, "Ausgaben (Kasse)", -s.manual_expenses);
    money_row(&mut body, "Eigenverbrauch", -s.internal_consumption);
    money_row(
        &mut body,
        &format!("Paint ({} Kisten)", s.paint_boxes_sold),
        -s.paint_cost,
    );
    money_row(&mut body, "Essen", -s.food_cost);
    money_row(&mut body, "Miete", -s.rent_for_balance);
    money_row(&mut body, &s.custom_cost_name, -s.custom_cost);
    money_row(&mut body, "Reingewinn", s.net_profit);
    body.push_str("</table>\n");

    body.push_str(r#"<hr style="border:none;border-top:1px dashed #000;"/>
<div style="margin:4px 0;"><strong>KRIEGSKASSE</strong></div>
<table style="width:100%;font-family:monospace;font-size:10px;">
"#);
    money_row(&mut body, "Bareinnahmen", s.cash_revenue);
    money_row(&mut body, "Einlagen", s.deposits);
    money_row(&mut body, "Ausgaben", -s.manual_expenses);
    money_row(&mut body, "Entnahmen", -s.withdrawals);
    money_row(&mut body, "Soll-Bestand", s.war_chest);
    money_row(&mut body, "Offene Rechnungen", report.outstanding);
    body.push_str("</table>\n");

    if !report.tabs.is_empty() {
        body.push_str(r#"<hr style="border:none;border-top:1px dashed #000;"/>
<div style="margin:4px 0;"><strong>TEAMS</strong></div>
<table style="width:100%;font-family:monospace;font-size:10px;">
<tr><th style="text-align:left;">Team</th><th style="text-align:right;">Umsatz</th><th style="text-align:right;">Offen</th></tr>
"#);
        for tab in &report.tabs {
            let _ = writeln!(
                body,
                r#"<tr><td>{}</td><td style="text-align:right;">{}</td><td style="text-align:right;">{}</td></tr>"#,
                escape_html(&tab.name),
                tab.total_volume,
                tab.total_debt
            );
        }
        body.push_str("</table>\n");
    }

    body.push_str(r#"<hr style="border:none;border-top:1px dashed #000;"/>
<div style="margin:4px 0;"><strong>JOURNAL</strong></div>
<table style="width:100%;font-family:monospace;font-size:10px;">
"#);
    for entry in &report.journal.entries {
        let _ = writeln!(
            body,
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td style="text-align:right;">{}</td></tr>"#,
            crate::models::local_time_str(entry.timestamp),
            entry.kind.label(),
            escape_html(&entry.description),
            entry.signed_amount()
        );
    }
    body.push_str("</table>\n");

    let _ = write!(
        body,
        r#"<hr style="border:none;border-top:2px solid #000;"/>
<div style="text-align:center;margin-top:8px;font-size:9px;">
Ende des Berichts<br/>
ID: {}
</div>"#,
        report.id
    );

    format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"/><title>Event-Abschluss {date}</title>
<style>
body {{ margin: 8px; padding: 0; font-family: monospace; font-size: 10px; }}
@media print {{ body {{ margin: 0; }} }}
</style></head><body>{body}</body></html>"#,
        date = report.event_date,
    )
}

/// Write the archived report to `{data_dir}/reports` and remember the path.
pub fn generate_report_file(db: &DbState, id: &str, data_dir: &Path) -> PosResult<PathBuf> {
    let report = get_report(db, id)?;
    let html = render_html(&report);

    let reports_dir = crate::config::reports_dir(data_dir);
    std::fs::create_dir_all(&reports_dir)?;
    let file_path = reports_dir.join(format!("event_{id}.html"));
    std::fs::write(&file_path, html)?;

    let conn = db.lock()?;
    conn.execute(
        "UPDATE event_reports SET html_path = ?1 WHERE id = ?2",
        params![file_path.to_string_lossy().into_owned(), id],
    )?;

    info!(report_id = %id, path = %file_path.display(), "Event report HTML generated");
    Ok(file_path)
}
