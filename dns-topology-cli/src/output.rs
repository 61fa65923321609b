//! Output formatting: table, JSON, plain.

use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use dns_topology_core::{Outcome, ResolveReport, SkipReason, WebsiteRow};

use crate::cli::OutputFormat;

// ── Resolve ──────────────────────────────────────────────────────────

#[derive(Tabled)]
struct WebsiteView {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Type")]
    record_type: String,
    #[tabled(rename = "Load balancer")]
    lb: String,
    #[tabled(rename = "Public IPs")]
    addresses: String,
    #[tabled(rename = "Scheme")]
    scheme: String,
    #[tabled(rename = "Target group")]
    target_group: String,
    #[tabled(rename = "Instance")]
    instance: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "TLS policy")]
    security_policy: String,
}

impl From<&WebsiteRow> for WebsiteView {
    fn from(row: &WebsiteRow) -> Self {
        let target_group = if row.has_ambiguous_target_group() {
            format!("{} (1 of {})", row.target_group_name, row.target_group_count)
        } else {
            row.target_group_name.clone()
        };
        Self {
            hostname: row.hostname.clone(),
            record_type: row.record_type.to_string(),
            lb: format!("{} ({})", row.lb_name, row.lb_kind.as_str()),
            addresses: row.addresses_display(),
            scheme: row.lb_scheme.clone(),
            target_group,
            instance: row.instance_summary.clone(),
            ports: join(row.target_ports.iter()),
            health: join(row.target_health.iter().map(|h| h.as_str())),
            security_policy: row.security_policy.clone(),
        }
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(",")
}

/// Render resolved rows in the chosen format.
pub fn render_report(format: OutputFormat, report: &ResolveReport) -> Result<String> {
    Ok(match format {
        OutputFormat::Table if report.rows.is_empty() => "No websites found".to_string(),
        OutputFormat::Table => {
            let views: Vec<WebsiteView> = report.rows.iter().map(WebsiteView::from).collect();
            Table::new(views).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(&report.rows)?,
        OutputFormat::Plain => report
            .rows
            .iter()
            .map(plain_row)
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// One tab-separated line per row.
pub fn plain_row(row: &WebsiteRow) -> String {
    let addresses = row.addresses_display();
    [
        row.hostname.as_str(),
        row.lb_dns_name.as_str(),
        addresses.as_str(),
        row.target_group_name.as_str(),
        row.instance_summary.as_str(),
        row.security_policy.as_str(),
    ]
    .join("\t")
}

/// Summary of skipped records for stderr; `None` when nothing was skipped.
pub fn skip_summary(report: &ResolveReport) -> Option<String> {
    if report.skipped.is_empty() {
        return None;
    }

    let plain = report
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::NotLoadBalancerTarget { .. }))
        .count();
    let mut lines = vec![format!(
        "Skipped {} record(s), {plain} not pointing at a load balancer",
        report.skip_count()
    )];
    lines.extend(report.notable_skips().map(|skip| {
        let subject = skip.record_name.as_deref().unwrap_or(&skip.domain);
        format!("  {subject}: {}", skip.reason)
    }));
    Some(lines.join("\n"))
}

// ── Reconcile ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct OutcomeView {
    #[tabled(rename = "Record")]
    record: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Change")]
    change_id: String,
    #[tabled(rename = "Polls")]
    polls: u32,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&Outcome> for OutcomeView {
    fn from(outcome: &Outcome) -> Self {
        Self {
            record: outcome.record_name.clone(),
            action: outcome
                .action
                .map_or_else(|| "-".to_string(), |a| a.to_string()),
            change_id: outcome.change_id.clone().unwrap_or_else(|| "-".to_string()),
            polls: outcome.polls,
            result: outcome_result(outcome),
        }
    }
}

fn outcome_result(outcome: &Outcome) -> String {
    match &outcome.error {
        None if outcome.applied => "applied".to_string(),
        None => "not applied".to_string(),
        Some(e) => format!("failed: {e}"),
    }
}

/// Render reconciliation outcomes in the chosen format.
pub fn render_outcomes(format: OutputFormat, outcomes: &[Outcome]) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => {
            let views: Vec<OutcomeView> = outcomes.iter().map(OutcomeView::from).collect();
            Table::new(views).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(outcomes)?,
        OutputFormat::Plain => outcomes
            .iter()
            .map(|o| {
                format!(
                    "{}\t{}\t{}\t{}",
                    o.record_name,
                    o.action.map_or("-", |a| a.as_str()),
                    o.change_id.as_deref().unwrap_or("-"),
                    outcome_result(o)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}
