//! Ticket lifecycle rules
//!
//! Status changes are permissive: any status may be set from any other.
//! Two guards apply regardless of who is asking:
//!
//! - a frozen ticket rejects every status change and assignment
//! - `Reopened` is only accepted for a `Resolved` ticket whose resolution is
//!   at most [`REOPEN_WINDOW_DAYS`] old
//!
//! The functions here are pure. They take the current row and the request
//! and return the write the store has to perform together with the audit
//! entry that goes with it. The write carries the status the plan was made
//! against; the store refuses it once the row has moved on.

use super::{NewStatusLog, Status, Ticket};
use crate::error::{OfficeTicketError, Result};
use chrono::{DateTime, Duration, Utc};

/// Days after resolution during which a ticket may be reopened
///
/// Tickets resolved longer ago than this are frozen by the sweep.
pub const REOPEN_WINDOW_DAYS: f64 = 5.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional number of days from `from` to `to`
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Requested status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: Status,
    pub comment: Option<String>,
    pub assigned_to: Option<String>,
}

impl StatusChange {
    pub const fn to(status: Status) -> Self {
        Self {
            status,
            comment: None,
            assigned_to: None,
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assigned_to: impl Into<String>) -> Self {
        self.assigned_to = Some(assigned_to.into());
        self
    }
}

/// What happens to `resolved_at` on a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedAt {
    Keep,
    Set(DateTime<Utc>),
    Clear,
}

/// Field updates for one ticket row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdate {
    /// Status the row must still have for the write to apply
    pub expected_status: Status,
    pub status: Status,
    /// `None` leaves the current assignee untouched
    pub assigned_to: Option<String>,
    pub resolved_at: ResolvedAt,
    pub updated_at: DateTime<Utc>,
}

/// A row update and the audit entry that must be written with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub update: TicketUpdate,
    pub log: NewStatusLog,
}

/// Reject any mutation of a frozen ticket
pub fn ensure_not_frozen(ticket: &Ticket) -> Result<()> {
    if ticket.frozen {
        return Err(OfficeTicketError::TicketFrozen {
            ticket_no: ticket.ticket_no.to_string(),
        });
    }
    Ok(())
}

/// Reject a reopen outside the window
///
/// The ticket must currently be `Resolved` with a known resolution time no
/// more than [`REOPEN_WINDOW_DAYS`] before `now`. Exactly five days is still
/// inside the window.
pub fn ensure_reopenable(ticket: &Ticket, now: DateTime<Utc>) -> Result<()> {
    let within_window = ticket.status == Status::Resolved
        && ticket
            .resolved_at
            .is_some_and(|resolved| elapsed_days(resolved, now) <= REOPEN_WINDOW_DAYS);

    if !within_window {
        return Err(OfficeTicketError::ReopenWindowExpired {
            ticket_no: ticket.ticket_no.to_string(),
        });
    }
    Ok(())
}

/// Validate a status change and compute its write
pub fn plan_status_change(
    ticket: &Ticket,
    change: StatusChange,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Transition> {
    ensure_not_frozen(ticket)?;
    if change.status == Status::Reopened {
        ensure_reopenable(ticket, now)?;
    }

    let resolved_at = match change.status {
        Status::Resolved => ResolvedAt::Set(now),
        Status::Reopened => ResolvedAt::Clear,
        _ => ResolvedAt::Keep,
    };
    let assigned_to = change
        .assigned_to
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    Ok(Transition {
        update: TicketUpdate {
            expected_status: ticket.status,
            status: change.status,
            assigned_to,
            resolved_at,
            updated_at: now,
        },
        log: NewStatusLog {
            ticket_no: ticket.ticket_no.clone(),
            status: change.status,
            updated_by: actor.to_string(),
            comment: change.comment.unwrap_or_default(),
            updated_at: now,
        },
    })
}

/// Validate an assignment and compute its write
///
/// The status is left as it is and repeated in the audit entry.
pub fn plan_assignment(
    ticket: &Ticket,
    assigned_to: &str,
    comment: Option<&str>,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<Transition> {
    ensure_not_frozen(ticket)?;
    let assigned_to = assigned_to.trim();
    if assigned_to.is_empty() {
        return Err(OfficeTicketError::MissingField("assigned_to"));
    }

    let note = comment.map(str::trim).unwrap_or_default();
    let comment = if note.is_empty() {
        format!("Assigned to {assigned_to}.")
    } else {
        format!("Assigned to {assigned_to}. {note}")
    };

    Ok(Transition {
        update: TicketUpdate {
            expected_status: ticket.status,
            status: ticket.status,
            assigned_to: Some(assigned_to.to_string()),
            resolved_at: ResolvedAt::Keep,
            updated_at: now,
        },
        log: NewStatusLog {
            ticket_no: ticket.ticket_no.clone(),
            status: ticket.status,
            updated_by: actor.to_string(),
            comment,
            updated_at: now,
        },
    })
}

/// Audit entry for a plain comment; the ticket row is not touched
pub fn plan_comment(
    ticket: &Ticket,
    comment: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<NewStatusLog> {
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(OfficeTicketError::MissingField("comment"));
    }
    Ok(NewStatusLog {
        ticket_no: ticket.ticket_no.clone(),
        status: ticket.status,
        updated_by: actor.to_string(),
        comment: comment.to_string(),
        updated_at: now,
    })
}

/// Latest resolution time that is freeze-eligible at `now`
///
/// A ticket qualifies when its `resolved_at` is strictly before this.
#[allow(clippy::cast_possible_truncation)]
pub fn freeze_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::milliseconds((REOPEN_WINDOW_DAYS * MILLIS_PER_DAY) as i64)
}

/// Whether the freeze sweep should freeze `ticket` at `now`
pub fn is_freeze_eligible(ticket: &Ticket, now: DateTime<Utc>) -> bool {
    ticket.status == Status::Resolved
        && !ticket.frozen
        && ticket
            .resolved_at
            .is_some_and(|resolved| elapsed_days(resolved, now) > REOPEN_WINDOW_DAYS)
}
