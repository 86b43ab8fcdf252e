use super::numbering::TicketNo;
use crate::error::{OfficeTicketError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket status
///
/// Any status may follow any other; the lifecycle guards in
/// [`crate::core::lifecycle`] are the only restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "Work In Progress")]
    WorkInProgress,
    #[serde(rename = "Resolved")]
    Resolved,
    #[serde(rename = "Closed")]
    Closed,
    #[serde(rename = "Reopened")]
    Reopened,
}

impl Status {
    /// All statuses in display order
    pub const ALL: [Self; 5] = [
        Self::Open,
        Self::WorkInProgress,
        Self::Resolved,
        Self::Closed,
        Self::Reopened,
    ];

    /// Stored and displayed name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::WorkInProgress => "Work In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Reopened => "Reopened",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = OfficeTicketError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "workinprogress" | "inprogress" | "wip" => Ok(Self::WorkInProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            "reopened" => Ok(Self::Reopened),
            _ => Err(OfficeTicketError::InvalidStatus(s.to_string())),
        }
    }
}

/// A support ticket as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_no: TicketNo,
    pub employee_name: String,
    pub employee_email: String,
    pub department: String,
    pub location: String,
    pub category: String,
    pub sub_category: Option<String>,
    pub description: String,
    pub status: Status,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub frozen: bool,
}

impl Ticket {
    /// Open a new ticket from validated intake data
    pub fn open(ticket_no: TicketNo, intake: NewTicket, now: DateTime<Utc>) -> Self {
        Self {
            ticket_no,
            employee_name: intake.employee_name,
            employee_email: intake.employee_email,
            department: intake.department,
            location: intake.location,
            category: intake.category,
            sub_category: intake.sub_category,
            description: intake.description,
            status: Status::Open,
            assigned_to: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
            frozen: false,
        }
    }
}

/// Intake data for a new ticket
///
/// Construct through [`crate::core::NewTicketBuilder`] or call
/// [`NewTicket::validate`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub employee_name: String,
    pub employee_email: String,
    pub department: String,
    pub location: String,
    pub category: String,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub description: String,
}

impl NewTicket {
    /// Trim every field, drop an empty sub-category and reject missing data
    pub fn validate(self) -> Result<Self> {
        let employee_name = required("employee_name", &self.employee_name)?;
        let employee_email = required("employee_email", &self.employee_email)?.to_lowercase();
        if !employee_email.contains('@') {
            return Err(OfficeTicketError::InvalidInput(format!(
                "Invalid email address: {employee_email}"
            )));
        }

        Ok(Self {
            employee_name,
            employee_email,
            department: required("department", &self.department)?,
            location: required("location", &self.location)?,
            category: required("category", &self.category)?,
            sub_category: self
                .sub_category
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            description: required("description", &self.description)?,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OfficeTicketError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
