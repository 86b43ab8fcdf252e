use crate::core::{
    Attachment, GroupBy, GroupCount, NewStatusLog, NewUser, StatusLogEntry, StoredFile, Ticket,
    TicketFilter, TicketNo, Transition, User,
};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository trait for ticket storage operations
///
/// Implementations must make every write durable before returning `Ok`, and
/// must report unique-key collisions as conflict errors rather than generic
/// database errors.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Greatest ticket number issued for `year`, if any
    async fn latest_ticket_no(&self, year: i32) -> Result<Option<TicketNo>>;

    /// Inserts a ticket with its attachments and creation log entry
    ///
    /// Fails with `DuplicateTicketNo` if the number is already taken; nothing
    /// is written in that case.
    async fn create_ticket(
        &self,
        ticket: &Ticket,
        attachments: &[StoredFile],
        log: &NewStatusLog,
    ) -> Result<()>;

    /// Loads a ticket by number
    async fn load_ticket(&self, ticket_no: &TicketNo) -> Result<Ticket>;

    /// Lists tickets matching every populated filter field, newest first
    async fn find_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>>;

    /// Most recently created tickets, optionally within one department
    async fn recent_tickets(&self, department: Option<&str>, limit: u32) -> Result<Vec<Ticket>>;

    /// Applies a row update and appends its audit entry atomically
    ///
    /// The update only applies to unfrozen rows whose status still equals
    /// `update.expected_status`. A frozen row yields `TicketFrozen`, a row
    /// whose status moved on yields `TicketModified`; either way both the
    /// row and the log are left untouched.
    async fn apply_transition(&self, transition: &Transition) -> Result<()>;

    /// Appends an audit entry without touching the ticket row
    async fn append_log(&self, log: &NewStatusLog) -> Result<()>;

    /// Audit trail of a ticket, newest first
    async fn logs(&self, ticket_no: &TicketNo) -> Result<Vec<StatusLogEntry>>;

    /// Attachments of a ticket in upload order
    async fn attachments(&self, ticket_no: &TicketNo) -> Result<Vec<Attachment>>;

    /// Resolved tickets that are not frozen yet
    async fn resolved_unfrozen(&self) -> Result<Vec<Ticket>>;

    /// Sets `frozen` on the given tickets in one pass, returning how many changed
    ///
    /// A ticket is only frozen if it is still resolved and its `resolved_at`
    /// is before `resolved_before`.
    async fn mark_frozen(&self, ticket_nos: &[TicketNo], resolved_before: DateTime<Utc>)
    -> Result<u64>;

    /// Number of tickets, optionally within one department
    async fn count_tickets(&self, department: Option<&str>) -> Result<i64>;

    /// Ticket counts grouped by a column, optionally within one department
    async fn count_grouped(&self, group: GroupBy, department: Option<&str>)
    -> Result<Vec<GroupCount>>;
}

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; fails with `DuplicateEmail` if the email is taken
    async fn insert_user(&self, user: &NewUser) -> Result<User>;

    /// Looks up a user by (lowercased) email
    async fn find_user(&self, email: &str) -> Result<Option<User>>;

    /// All users ordered by id
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Combined repository trait
pub trait Store: TicketRepository + UserRepository {}

/// Implementation of Store for types that implement both traits
impl<T> Store for T where T: TicketRepository + UserRepository {}
