//! Reviewer commands
//!
//! Lists cases, shows a case, records decisions, and finalizes cases on
//! behalf of a human reviewer. Credentials come from the command line or
//! the environment and are never stored.

use crate::api::{BackendApi, CaseRecord, HumanDecision};
use crate::chat::status::CaseStatus;
use crate::cli::CasesCommand;
use crate::commands::{build_backend, print_notices};
use crate::config::Config;
use crate::error::{EcomdeskError, Result};
use crate::reviewer::ReviewerDesk;
use colored::Colorize;
use prettytable::{row, Table};

/// Run a reviewer subcommand
///
/// # Arguments
///
/// * `config` - Global configuration
/// * `username` - Reviewer username
/// * `password` - Reviewer password
/// * `command` - Subcommand to execute
pub async fn run_cases(
    config: Config,
    username: Option<String>,
    password: Option<String>,
    command: CasesCommand,
) -> Result<()> {
    let api = build_backend(&config)?;
    let mut desk: ReviewerDesk<dyn BackendApi> = ReviewerDesk::new(api);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(EcomdeskError::NotSignedIn.into());
    };
    desk.sign_in(&username, &password)?;

    let result = execute(&mut desk, command).await;
    print_notices(&desk.take_notices());
    desk.sign_out();
    result
}

async fn execute(desk: &mut ReviewerDesk<dyn BackendApi>, command: CasesCommand) -> Result<()> {
    match command {
        CasesCommand::List { status, all, json } => {
            let filter = if all {
                None
            } else {
                Some(status.parse::<CaseStatus>()?)
            };
            tracing::debug!("cases::list flags - filter: {:?}, json: {}", filter, json);
            let cases = desk.list_cases(filter).await?;
            if json {
                output_json(&cases)?;
            } else {
                output_cases_table(&cases, filter);
            }
        }
        CasesCommand::Show { case_id, json } => {
            let case = desk.get_case(&case_id).await?;
            if json {
                output_json(&case)?;
            } else {
                output_case_detail(&case);
            }
        }
        CasesCommand::Decide {
            case_id,
            decision,
            notes,
        } => {
            let decision = decision.parse::<HumanDecision>()?;
            let status = desk
                .submit_decision(&case_id, decision, notes.as_deref())
                .await?;
            println!("Case {} is now {}", case_id, status.label().as_str().green());
        }
        CasesCommand::Finalize { case_id } => {
            let finalized = desk.finalize_case(&case_id).await?;
            println!("Case {} closed.\n", finalized.case_id);
            println!("{}\n{}\n", "Customer reply:".bold(), finalized.customer_reply);
            for action in &finalized.next_actions {
                println!("  - {}", action.action);
            }
        }
    }
    Ok(())
}

fn output_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(EcomdeskError::Serialization)?;
    println!("{}", json);
    Ok(())
}

/// AI recommendation summary, e.g. `approve (82%)`
fn ai_summary(case: &CaseRecord) -> String {
    let decision = case
        .ai_decision_json
        .get("decision")
        .and_then(|v| v.as_str())
        .unwrap_or("-");
    match case
        .ai_decision_json
        .get("confidence")
        .and_then(|v| v.as_f64())
    {
        Some(confidence) => format!("{} ({:.0}%)", decision, confidence * 100.0),
        None => decision.to_string(),
    }
}

fn output_cases_table(cases: &[CaseRecord], filter: Option<CaseStatus>) {
    let heading = match filter {
        Some(status) => format!("Cases with status {}", status.label()),
        None => "All cases".to_string(),
    };

    if cases.is_empty() {
        println!("\n{}: none\n", heading);
        return;
    }

    let mut table = Table::new();
    table.add_row(row!["Case", "Order", "Reason", "Status", "AI Decision", "Photos", "Created"]);

    for case in cases {
        table.add_row(row![
            case.case_id,
            case.order_id,
            case.reason,
            case.status.label(),
            ai_summary(case),
            case.photo_urls_json.len(),
            case.created_at
        ]);
    }

    println!("\n{}:\n", heading);
    table.printstd();
    println!();
}

fn output_case_detail(case: &CaseRecord) {
    let mut table = Table::new();
    table.add_row(row!["Case", case.case_id]);
    table.add_row(row!["Order", case.order_id]);
    table.add_row(row!["Reason", case.reason]);
    table.add_row(row!["Status", case.status.label()]);
    table.add_row(row!["Created", case.created_at]);
    table.add_row(row!["AI Decision", ai_summary(case)]);
    table.add_row(row![
        "Photos Required",
        if case.photos_required { "yes" } else { "no" }
    ]);
    if let Some(message) = &case.customer_message {
        table.add_row(row!["Customer Message", message]);
    }
    if let Some(decision) = &case.human_decision {
        table.add_row(row!["Human Decision", decision]);
    }
    if let Some(notes) = &case.human_notes {
        table.add_row(row!["Reviewer Notes", notes]);
    }
    if let Some(reply) = &case.final_customer_reply {
        table.add_row(row!["Customer Reply", reply]);
    }

    println!();
    table.printstd();

    if !case.policy_citations_json.is_empty() {
        println!("\n{}", "Policy citations:".bold());
        for citation in &case.policy_citations_json {
            match &citation.policy_id {
                Some(id) => println!("  - [{}] {}: {}", id, citation.source, citation.excerpt),
                None => println!("  - {}: {}", citation.source, citation.excerpt),
            }
        }
    }
    if !case.photo_urls_json.is_empty() {
        println!("\n{}", "Photos:".bold());
        for url in &case.photo_urls_json {
            println!("  - {}", url);
        }
    }
    println!();
}
