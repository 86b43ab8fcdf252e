use super::{Status, TicketNo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a ticket's audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub log_id: i64,
    pub ticket_no: TicketNo,
    /// Status after the change, or the unchanged status for comments and assignments
    pub status: Status,
    pub updated_by: String,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Audit entry waiting to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStatusLog {
    pub ticket_no: TicketNo,
    pub status: Status,
    pub updated_by: String,
    pub comment: String,
    pub updated_at: DateTime<Utc>,
}

/// File attached to a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: i64,
    pub ticket_no: TicketNo,
    pub file_name: String,
    /// Stored name relative to the uploads directory
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A file already written to blob storage, not yet linked to a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub file_name: String,
    pub file_path: String,
}

/// Ticket together with its attachments and audit trail (newest first)
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: super::Ticket,
    pub attachments: Vec<Attachment>,
    pub logs: Vec<StatusLogEntry>,
}
