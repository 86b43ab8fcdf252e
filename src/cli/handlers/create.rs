//! `new` command
//!
//! Fields can come from flags, from prompts (`--interactive`), or a mix of
//! both: prompts only ask for what the flags left out.

use super::base::HandlerContext;
use crate::attachments::Upload;
use crate::cli::output::OutputFormatter;
use crate::core::{Caller, NewTicketBuilder};
use crate::error::{OfficeTicketError, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use serde_json::json;
use std::path::PathBuf;

/// Categories offered by the interactive prompt
const CATEGORIES: [&str; 6] = [
    "Hardware",
    "Software",
    "Network",
    "Printer",
    "Access",
    "Other",
];

/// Parameters for creating a ticket
#[derive(Debug, Default)]
pub struct CreateParams {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub description: Option<String>,
    pub attachments: Vec<PathBuf>,
    pub interactive: bool,
}

/// File a ticket, prefilling reporter details from the logged-in user
pub async fn handle_new(
    ctx: &HandlerContext,
    caller: &Caller,
    mut params: CreateParams,
    formatter: &OutputFormatter,
) -> Result<()> {
    if let Caller::User(identity) = caller {
        params.name.get_or_insert_with(|| identity.name.clone());
        params.email.get_or_insert_with(|| identity.email.clone());
        if let Some(department) = &identity.department {
            params.department.get_or_insert_with(|| department.clone());
        }
    }
    if params.interactive {
        prompt_missing(&mut params)?;
    }

    let uploads = read_attachments(&params.attachments).await?;

    let mut builder = NewTicketBuilder::new();
    if let Some(name) = params.name {
        builder = builder.employee_name(name);
    }
    if let Some(email) = params.email {
        builder = builder.employee_email(email);
    }
    if let Some(department) = params.department {
        builder = builder.department(department);
    }
    if let Some(location) = params.location {
        builder = builder.location(location);
    }
    if let Some(category) = params.category {
        builder = builder.category(category);
    }
    if let Some(sub_category) = params.sub_category {
        builder = builder.sub_category(sub_category);
    }
    if let Some(description) = params.description {
        builder = builder.description(description);
    }
    let intake = builder.build()?;

    let ticket = ctx.service.create_ticket(intake, uploads).await?;

    if formatter.is_json() {
        return formatter.print_json(&json!({
            "status": "success",
            "ticket_no": ticket.ticket_no,
            "ticket": ticket,
        }));
    }
    formatter.success(&format!("Created ticket {}", ticket.ticket_no));
    formatter.info(&format!(
        "{} / {} at {}",
        ticket.department, ticket.category, ticket.location
    ));
    Ok(())
}

fn prompt_missing(params: &mut CreateParams) -> Result<()> {
    let theme = ColorfulTheme::default();
    let ask = |label: &str| -> Result<String> {
        Ok(Input::<String>::with_theme(&theme)
            .with_prompt(label)
            .interact_text()?)
    };

    if params.name.is_none() {
        params.name = Some(ask("Your name")?);
    }
    if params.email.is_none() {
        params.email = Some(ask("Your email")?);
    }
    if params.department.is_none() {
        params.department = Some(ask("Department")?);
    }
    if params.location.is_none() {
        params.location = Some(ask("Location")?);
    }
    if params.category.is_none() {
        let selection = Select::with_theme(&theme)
            .with_prompt("Category")
            .items(&CATEGORIES)
            .default(0)
            .interact()?;
        params.category = Some(CATEGORIES[selection].to_string());
    }
    if params.sub_category.is_none() {
        let sub_category: String = Input::with_theme(&theme)
            .with_prompt("Sub-category (optional)")
            .allow_empty(true)
            .interact_text()?;
        params.sub_category = Some(sub_category);
    }
    if params.description.is_none() {
        params.description = Some(ask("Describe the problem")?);
    }
    Ok(())
}

async fn read_attachments(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            OfficeTicketError::InvalidInput(format!(
                "Cannot read attachment {}: {e}",
                path.display()
            ))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        uploads.push(Upload::new(file_name, bytes));
    }
    Ok(uploads)
}
