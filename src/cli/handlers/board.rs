//! `stats`: dashboard counts in the terminal

use super::base::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::core::{Caller, DashboardStats};
use crate::error::Result;
use colored::Colorize;

pub async fn handle_stats(
    ctx: &HandlerContext,
    caller: &Caller,
    formatter: &OutputFormatter,
) -> Result<()> {
    let stats = ctx.service.dashboard(caller).await?;
    if formatter.is_json() {
        return formatter.print_json(&stats);
    }
    print_dashboard(formatter, &stats);
    Ok(())
}

fn print_dashboard(formatter: &OutputFormatter, stats: &DashboardStats) {
    let scope = stats.department.as_deref().unwrap_or("all departments");
    println!("{} ({scope})", "Ticket dashboard".bold());
    println!("Total tickets: {}", stats.total);
    println!();
    formatter.counts("By status", &stats.by_status);
    if stats.department.is_none() {
        formatter.counts("By department", &stats.by_department);
    }
    formatter.counts("By location", &stats.by_location);
    println!();
    println!("{}", "Recent tickets".bold());
    formatter.ticket_table(&stats.recent_tickets);
}
