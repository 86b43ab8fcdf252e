//! Commands that move a ticket through its lifecycle

use super::base::{HandlerContext, parse_ticket_no};
use crate::cli::output::{OutputFormatter, paint_status};
use crate::core::{Caller, Status, StatusChange, Ticket};
use crate::error::Result;
use serde_json::json;

/// Parameters for `status`
pub struct StatusParams {
    pub ticket: String,
    pub status: String,
    pub comment: Option<String>,
    pub assign: Option<String>,
}

pub async fn handle_status(
    ctx: &HandlerContext,
    caller: &Caller,
    params: StatusParams,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ticket_no = parse_ticket_no(&params.ticket)?;
    let mut change = StatusChange::to(params.status.parse::<Status>()?);
    if let Some(comment) = params.comment {
        change = change.with_comment(comment);
    }
    if let Some(assignee) = params.assign {
        change = change.with_assignee(assignee);
    }

    let ticket = ctx.service.change_status(caller, &ticket_no, change).await?;
    report(formatter, &ticket, &format!(
        "{} is now {}",
        ticket.ticket_no,
        paint_status(ticket.status)
    ))
}

pub async fn handle_assign(
    ctx: &HandlerContext,
    caller: &Caller,
    ticket: &str,
    assignee: &str,
    comment: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ticket_no = parse_ticket_no(ticket)?;
    let ticket = ctx
        .service
        .assign_ticket(caller, &ticket_no, assignee, comment)
        .await?;
    report(formatter, &ticket, &format!(
        "{} assigned to {}",
        ticket.ticket_no,
        ticket.assigned_to.as_deref().unwrap_or(assignee)
    ))
}

pub async fn handle_comment(
    ctx: &HandlerContext,
    caller: &Caller,
    ticket: &str,
    message: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let ticket_no = parse_ticket_no(ticket)?;
    ctx.service.add_comment(caller, &ticket_no, message).await?;

    if formatter.is_json() {
        return formatter.print_json(&json!({
            "status": "success",
            "ticket_no": ticket_no,
        }));
    }
    formatter.success(&format!("Comment added to {ticket_no}"));
    Ok(())
}

pub async fn handle_freeze(
    ctx: &HandlerContext,
    caller: &Caller,
    formatter: &OutputFormatter,
) -> Result<()> {
    let frozen = ctx.service.freeze_sweep(caller).await?;
    if formatter.is_json() {
        return formatter.print_json(&json!({ "status": "success", "frozen": frozen }));
    }
    if frozen == 0 {
        formatter.info("No tickets to freeze");
    } else {
        formatter.success(&format!("{frozen} tickets frozen"));
    }
    Ok(())
}

fn report(formatter: &OutputFormatter, ticket: &Ticket, message: &str) -> Result<()> {
    if formatter.is_json() {
        return formatter.print_json(&json!({ "status": "success", "ticket": ticket }));
    }
    formatter.success(message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::OfficeTicketError;
    use crate::test_utils::{admin, employee, sample_intake};
    use tempfile::TempDir;

    async fn context_with_ticket(temp_dir: &TempDir) -> (HandlerContext, String) {
        let mut settings = Settings::default();
        settings.database.path = temp_dir.path().join("tickets.db");
        settings.uploads.dir = temp_dir.path().join("uploads");
        settings.notifications.enabled = false;
        let ctx = HandlerContext::from_settings(settings).await.unwrap();
        let ticket = ctx
            .service
            .create_ticket(sample_intake("dana@office.com", "Accounts"), vec![])
            .await
            .unwrap();
        (ctx, ticket.ticket_no.to_string())
    }

    #[tokio::test]
    async fn test_status_command_updates_ticket() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, ticket_no) = context_with_ticket(&temp_dir).await;
        let formatter = OutputFormatter::new(true, true);

        handle_status(
            &ctx,
            &admin(),
            StatusParams {
                ticket: ticket_no.clone(),
                status: "wip".to_string(),
                comment: Some("On it".to_string()),
                assign: Some("alex@office.com".to_string()),
            },
            &formatter,
        )
        .await
        .unwrap();

        let detail = ctx
            .service
            .ticket_detail(&parse_ticket_no(&ticket_no).unwrap())
            .await
            .unwrap();
        assert_eq!(detail.ticket.status, Status::WorkInProgress);
        assert_eq!(detail.ticket.assigned_to.as_deref(), Some("alex@office.com"));
        assert_eq!(detail.logs[0].comment.as_deref(), Some("On it"));
        ctx.close().await;
    }

    #[tokio::test]
    async fn test_employee_cannot_change_status() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, ticket_no) = context_with_ticket(&temp_dir).await;

        let err = handle_status(
            &ctx,
            &employee("dana@office.com"),
            StatusParams {
                ticket: ticket_no,
                status: "Resolved".to_string(),
                comment: None,
                assign: None,
            },
            &OutputFormatter::new(true, true),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OfficeTicketError::Forbidden { .. }));
        ctx.close().await;
    }

    #[tokio::test]
    async fn test_owner_can_comment() {
        let temp_dir = TempDir::new().unwrap();
        let (ctx, ticket_no) = context_with_ticket(&temp_dir).await;

        handle_comment(
            &ctx,
            &employee("dana@office.com"),
            &ticket_no,
            "Still broken",
            &OutputFormatter::new(true, true),
        )
        .await
        .unwrap();
        ctx.close().await;
    }
}
