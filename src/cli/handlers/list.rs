//! `list` and `show`

use super::base::{HandlerContext, parse_ticket_no};
use crate::cli::output::{OutputFormatter, paint_status};
use crate::core::{Caller, Status, TicketDetail, TicketFilter};
use crate::error::Result;
use colored::Colorize;

/// Filters accepted by `list`
#[derive(Debug, Default)]
pub struct ListParams {
    pub status: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub mine: bool,
}

impl ListParams {
    fn filter(self) -> Result<TicketFilter> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<Status>)
            .transpose()?;
        Ok(TicketFilter {
            status,
            department: self.department,
            location: self.location,
            category: self.category,
            employee_email: None,
        })
    }
}

pub async fn handle_list(
    ctx: &HandlerContext,
    caller: &Caller,
    params: ListParams,
    formatter: &OutputFormatter,
) -> Result<()> {
    let tickets = if params.mine {
        ctx.service.my_tickets(caller).await?
    } else {
        ctx.service.list_tickets(caller, params.filter()?).await?
    };

    if formatter.is_json() {
        return formatter.print_json(&tickets);
    }
    formatter.ticket_table(&tickets);
    if tickets.iter().any(|t| t.frozen) {
        formatter.info("* frozen");
    }
    Ok(())
}

/// Show one ticket; needs no login, like the public lookup page
pub async fn handle_show(
    ctx: &HandlerContext,
    ticket: &str,
    formatter: &OutputFormatter,
) -> Result<()> {
    let detail = ctx.service.ticket_detail(&parse_ticket_no(ticket)?).await?;
    if formatter.is_json() {
        return formatter.print_json(&detail);
    }
    print_detail(&detail);
    Ok(())
}

fn print_detail(detail: &TicketDetail) {
    let ticket = &detail.ticket;
    println!(
        "{} {}{}",
        ticket.ticket_no.to_string().bold(),
        paint_status(ticket.status),
        if ticket.frozen { " (frozen)".dimmed().to_string() } else { String::new() }
    );
    println!("  Reported by: {} <{}>", ticket.employee_name, ticket.employee_email);
    println!("  Department:  {}", ticket.department);
    println!("  Location:    {}", ticket.location);
    match &ticket.sub_category {
        Some(sub) => println!("  Category:    {} / {sub}", ticket.category),
        None => println!("  Category:    {}", ticket.category),
    }
    println!(
        "  Assigned to: {}",
        ticket.assigned_to.as_deref().unwrap_or("-")
    );
    println!("  Created:     {}", ticket.created_at.format("%Y-%m-%d %H:%M UTC"));
    if let Some(resolved_at) = ticket.resolved_at {
        println!("  Resolved:    {}", resolved_at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!();
    println!("{}", ticket.description);

    if !detail.attachments.is_empty() {
        println!();
        println!("{}", "Attachments".bold());
        for attachment in &detail.attachments {
            println!("  {} (/uploads/{})", attachment.file_name, attachment.file_path);
        }
    }

    println!();
    println!("{}", "History".bold());
    for entry in &detail.logs {
        println!(
            "  {}  {:<18} {:<22} {}",
            entry.updated_at.format("%Y-%m-%d %H:%M"),
            paint_status(entry.status),
            entry.updated_by,
            entry.comment.as_deref().unwrap_or("")
        );
    }
}
