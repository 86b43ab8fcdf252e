//! `export`: visible tickets as CSV, JSON or YAML

use super::base::HandlerContext;
use crate::cli::ExportFormat;
use crate::cli::output::OutputFormatter;
use crate::core::{Caller, Ticket, TicketFilter};
use crate::error::{OfficeTicketError, Result};
use std::path::Path;

const CSV_HEADER: [&str; 14] = [
    "ticket_no",
    "employee_name",
    "employee_email",
    "department",
    "location",
    "category",
    "sub_category",
    "description",
    "status",
    "assigned_to",
    "created_at",
    "updated_at",
    "resolved_at",
    "frozen",
];

pub async fn handle_export(
    ctx: &HandlerContext,
    caller: &Caller,
    format: ExportFormat,
    output: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let tickets = ctx
        .service
        .list_tickets(caller, TicketFilter::default())
        .await?;
    let rendered = render(&tickets, format)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await?;
            formatter.success(&format!(
                "Exported {} tickets to {}",
                tickets.len(),
                path.display()
            ));
        },
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Serialize tickets in the requested format
pub fn render(tickets: &[Ticket], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => export_csv(tickets),
        ExportFormat::Json => serde_json::to_string_pretty(tickets)
            .map(|json| json + "\n")
            .map_err(|e| {
                OfficeTicketError::SerializationError(format!("Failed to serialize to JSON: {e}"))
            }),
        ExportFormat::Yaml => serde_yaml::to_string(tickets).map_err(|e| {
            OfficeTicketError::SerializationError(format!("Failed to serialize to YAML: {e}"))
        }),
    }
}

fn export_csv(tickets: &[Ticket]) -> Result<String> {
    let csv_error =
        |e: csv::Error| OfficeTicketError::SerializationError(format!("Failed to write CSV: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for ticket in tickets {
        writer
            .write_record([
                ticket.ticket_no.to_string(),
                ticket.employee_name.clone(),
                ticket.employee_email.clone(),
                ticket.department.clone(),
                ticket.location.clone(),
                ticket.category.clone(),
                ticket.sub_category.clone().unwrap_or_default(),
                ticket.description.clone(),
                ticket.status.to_string(),
                ticket.assigned_to.clone().unwrap_or_default(),
                ticket.created_at.to_rfc3339(),
                ticket.updated_at.to_rfc3339(),
                ticket.resolved_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
                ticket.frozen.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| {
        OfficeTicketError::SerializationError(format!("Failed to flush CSV: {e}"))
    })?;
    String::from_utf8(bytes)
        .map_err(|e| OfficeTicketError::SerializationError(format!("Invalid UTF-8 in CSV: {e}")))
}
