//! Raw row shapes and their conversion into domain types

use crate::core::{Attachment, StatusLogEntry, Ticket, User};
use crate::error::{OfficeTicketError, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

fn corrupt(table: &str, detail: impl std::fmt::Display) -> OfficeTicketError {
    OfficeTicketError::Custom(format!("Corrupt {table} row: {detail}"))
}

#[derive(Debug, FromRow)]
pub(super) struct TicketRow {
    ticket_no: String,
    employee_name: String,
    employee_email: String,
    department: String,
    location: String,
    category: String,
    sub_category: Option<String>,
    description: String,
    status: String,
    assigned_to: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    frozen: bool,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = OfficeTicketError;

    fn try_from(row: TicketRow) -> Result<Self> {
        Ok(Self {
            ticket_no: row.ticket_no.parse().map_err(|e| corrupt("tickets", e))?,
            employee_name: row.employee_name,
            employee_email: row.employee_email,
            department: row.department,
            location: row.location,
            category: row.category,
            sub_category: row.sub_category,
            description: row.description,
            status: row.status.parse().map_err(|e| corrupt("tickets", e))?,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
            resolved_at: row.resolved_at,
            frozen: row.frozen,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct StatusLogRow {
    log_id: i64,
    ticket_no: String,
    status: String,
    updated_by: String,
    comment: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StatusLogRow> for StatusLogEntry {
    type Error = OfficeTicketError;

    fn try_from(row: StatusLogRow) -> Result<Self> {
        Ok(Self {
            log_id: row.log_id,
            ticket_no: row.ticket_no.parse().map_err(|e| corrupt("status_logs", e))?,
            status: row.status.parse().map_err(|e| corrupt("status_logs", e))?,
            updated_by: row.updated_by,
            comment: row.comment,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct AttachmentRow {
    attachment_id: i64,
    ticket_no: String,
    file_name: String,
    file_path: String,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<AttachmentRow> for Attachment {
    type Error = OfficeTicketError;

    fn try_from(row: AttachmentRow) -> Result<Self> {
        Ok(Self {
            attachment_id: row.attachment_id,
            ticket_no: row.ticket_no.parse().map_err(|e| corrupt("attachments", e))?,
            file_name: row.file_name,
            file_path: row.file_path,
            uploaded_at: row.uploaded_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    user_id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    department: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = OfficeTicketError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            password_hash: row.password,
            role: row.role.parse().map_err(|e| corrupt("users", e))?,
            department: row.department,
            created_at: row.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one
pub(super) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = OfficeTicketError>,
{
    rows.into_iter().map(T::try_from).collect()
}
