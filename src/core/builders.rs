use super::{NewTicket, Status, Ticket, TicketNo};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Builder for ticket intake data
#[derive(Default)]
pub struct NewTicketBuilder {
    employee_name: Option<String>,
    employee_email: Option<String>,
    department: Option<String>,
    location: Option<String>,
    category: Option<String>,
    sub_category: Option<String>,
    description: Option<String>,
}

impl NewTicketBuilder {
    /// Create a new intake builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reporter's name
    #[must_use]
    pub fn employee_name(mut self, name: impl Into<String>) -> Self {
        self.employee_name = Some(name.into());
        self
    }

    /// Set the reporter's email
    #[must_use]
    pub fn employee_email(mut self, email: impl Into<String>) -> Self {
        self.employee_email = Some(email.into());
        self
    }

    /// Set the department
    #[must_use]
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Set the location
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the category
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the sub-category
    #[must_use]
    pub fn sub_category(mut self, sub_category: impl Into<String>) -> Self {
        self.sub_category = Some(sub_category.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build and validate the intake data
    pub fn build(self) -> Result<NewTicket> {
        NewTicket {
            employee_name: self.employee_name.unwrap_or_default(),
            employee_email: self.employee_email.unwrap_or_default(),
            department: self.department.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            sub_category: self.sub_category,
            description: self.description.unwrap_or_default(),
        }
        .validate()
    }
}

/// Builder for fully-populated ticket rows
///
/// Mostly useful for seeding stores in tests and for imports, where the
/// lifecycle fields are already known.
pub struct TicketBuilder {
    ticket: Ticket,
}

impl TicketBuilder {
    /// Start from a freshly opened ticket
    #[must_use]
    pub fn new(ticket_no: TicketNo, intake: NewTicket) -> Self {
        Self {
            ticket: Ticket::open(ticket_no, intake, Utc::now()),
        }
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.ticket.status = status;
        self
    }

    /// Set the assignee
    #[must_use]
    pub fn assigned_to(mut self, assigned_to: impl Into<String>) -> Self {
        self.ticket.assigned_to = Some(assigned_to.into());
        self
    }

    /// Set `created_at` and `updated_at`
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.ticket.created_at = created_at;
        self.ticket.updated_at = created_at;
        self
    }

    /// Mark as resolved at the given time
    #[must_use]
    pub const fn resolved_at(mut self, resolved_at: DateTime<Utc>) -> Self {
        self.ticket.status = Status::Resolved;
        self.ticket.resolved_at = Some(resolved_at);
        self
    }

    /// Set the frozen flag
    #[must_use]
    pub const fn frozen(mut self, frozen: bool) -> Self {
        self.ticket.frozen = frozen;
        self
    }

    /// Build the ticket
    pub fn build(self) -> Ticket {
        self.ticket
    }
}
