//! Email templates
//!
//! Bodies are rendered with tera; template names end in `.html` so every
//! interpolated value is HTML-escaped.

use crate::core::{Status, Ticket};
use crate::error::Result;
use tera::{Context, Tera};

const TICKET_CREATED: &str = "ticket_created.html";
const TICKET_UPDATED: &str = "ticket_updated.html";

const TICKET_CREATED_BODY: &str = r"<h2>Ticket Created Successfully</h2>
<p>Dear {{ employee_name }},</p>
<p>Your ticket has been created with the following details:</p>
<ul>
  <li><strong>Ticket No:</strong> {{ ticket_no }}</li>
  <li><strong>Department:</strong> {{ department }}</li>
  <li><strong>Location:</strong> {{ location }}</li>
  <li><strong>Category:</strong> {{ category }}</li>
  <li><strong>Sub-Category:</strong> {% if sub_category %}{{ sub_category }}{% else %}N/A{% endif %}</li>
  <li><strong>Status:</strong> {{ status }}</li>
</ul>
<p><strong>Description:</strong> {{ description }}</p>
<p>You will receive updates as your ticket progresses.</p>
<p>Thank you,<br>IT Support Team</p>
";

const TICKET_UPDATED_BODY: &str = r"<h2>Ticket Status Updated</h2>
<p>Dear {{ employee_name }},</p>
<p>Your ticket <strong>{{ ticket_no }}</strong> status has been updated to: <strong>{{ status }}</strong></p>
{% if comment %}<p><strong>Comment:</strong> {{ comment }}</p>
{% endif %}<p>Thank you,<br>IT Support Team</p>
";

/// A rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

/// Renders notification emails
#[derive(Debug)]
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (TICKET_CREATED, TICKET_CREATED_BODY),
            (TICKET_UPDATED, TICKET_UPDATED_BODY),
        ])?;
        Ok(Self { tera })
    }

    /// Confirmation sent to the submitter after creation
    pub fn ticket_created(&self, ticket: &Ticket) -> Result<RenderedEmail> {
        let mut context = Context::new();
        context.insert("employee_name", &ticket.employee_name);
        context.insert("ticket_no", &ticket.ticket_no.to_string());
        context.insert("department", &ticket.department);
        context.insert("location", &ticket.location);
        context.insert("category", &ticket.category);
        if let Some(sub_category) = &ticket.sub_category {
            context.insert("sub_category", sub_category);
        }
        context.insert("status", ticket.status.as_str());
        context.insert("description", &ticket.description);

        Ok(RenderedEmail {
            subject: format!("Ticket Created: {}", ticket.ticket_no),
            html: self.tera.render(TICKET_CREATED, &context)?,
        })
    }

    /// Notice sent to the submitter after a status change
    pub fn ticket_updated(
        &self,
        ticket: &Ticket,
        status: Status,
        comment: Option<&str>,
    ) -> Result<RenderedEmail> {
        let mut context = Context::new();
        context.insert("employee_name", &ticket.employee_name);
        context.insert("ticket_no", &ticket.ticket_no.to_string());
        context.insert("status", status.as_str());
        context.insert("comment", &comment.filter(|c| !c.trim().is_empty()));

        Ok(RenderedEmail {
            subject: format!("Ticket Updated: {}", ticket.ticket_no),
            html: self.tera.render(TICKET_UPDATED, &context)?,
        })
    }
}
