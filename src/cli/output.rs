//! Terminal output
//!
//! Every handler prints through [`OutputFormatter`] so that `--json` and
//! `--no-color` behave the same way across commands.

use crate::core::{GroupCount, Status, Ticket};
use colored::Colorize;
use serde::Serialize;

/// Output formatter for CLI commands
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    pub fn new(json: bool, no_color: bool) -> Self {
        if no_color || std::env::var_os("NO_COLOR").is_some() {
            colored::control::set_override(false);
        }
        Self { json }
    }

    pub const fn is_json(&self) -> bool {
        self.json
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {}", "✓".green().bold(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.json {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.json {
            eprintln!("{} {}", "Warning:".yellow().bold(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    /// Pretty-print a value as JSON on stdout
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> crate::error::Result<()> {
        let rendered = serde_json::to_string_pretty(value).map_err(|e| {
            crate::error::OfficeTicketError::SerializationError(format!(
                "Failed to serialize output: {e}"
            ))
        })?;
        println!("{rendered}");
        Ok(())
    }

    /// One line per ticket, newest first as given
    pub fn ticket_table(&self, tickets: &[Ticket]) {
        if tickets.is_empty() {
            self.info("No tickets found");
            return;
        }
        println!(
            "{:<16} {:<18} {:<14} {:<14} {:<24} {}",
            "TICKET".bold(),
            "STATUS".bold(),
            "DEPARTMENT".bold(),
            "LOCATION".bold(),
            "EMPLOYEE".bold(),
            "CATEGORY".bold()
        );
        for ticket in tickets {
            let frozen = if ticket.frozen { " *" } else { "" };
            println!(
                "{:<16} {:<18} {:<14} {:<14} {:<24} {}",
                ticket.ticket_no.to_string(),
                format!("{}{frozen}", paint_status(ticket.status)),
                truncate(&ticket.department, 14),
                truncate(&ticket.location, 14),
                truncate(&ticket.employee_email, 24),
                ticket.category
            );
        }
    }

    /// Key/count pairs under a heading
    pub fn counts(&self, heading: &str, counts: &[GroupCount]) {
        println!("{}", heading.bold());
        if counts.is_empty() {
            println!("  (none)");
        }
        for bucket in counts {
            println!("  {:<24} {}", bucket.key, bucket.count);
        }
    }
}

/// Status name colored by how much attention it needs
pub fn paint_status(status: Status) -> String {
    let name = status.as_str();
    match status {
        Status::Open | Status::Reopened => name.yellow().to_string(),
        Status::WorkInProgress => name.cyan().to_string(),
        Status::Resolved => name.green().to_string(),
        Status::Closed => name.dimmed().to_string(),
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
