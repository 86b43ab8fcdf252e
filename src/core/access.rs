//! Role-based access scoping
//!
//! | role            | reads                 | may mutate                         |
//! |-----------------|-----------------------|------------------------------------|
//! | admin / it      | every ticket          | status of any ticket               |
//! | manager         | own department        | assignment within own department   |
//! | employee        | own tickets           | comments on own tickets            |
//! | anonymous       | single ticket by no.  | create tickets                     |
//!
//! Every check here runs before the store is written to.

use super::{Identity, Role, Ticket, TicketFilter};
use crate::error::{OfficeTicketError, Result};

/// Set of tickets a caller may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Department(String),
    Owner(String),
}

impl Scope {
    /// Scope implied by the caller's role
    ///
    /// Managers without a department on record see nothing rather than
    /// everything.
    pub fn for_identity(identity: &Identity) -> Result<Self> {
        match identity.role {
            Role::Admin | Role::It => Ok(Self::All),
            Role::Manager => identity
                .department
                .clone()
                .map(Self::Department)
                .ok_or_else(|| OfficeTicketError::forbidden("manager has no department on record")),
            Role::Employee => Ok(Self::Owner(identity.email.clone())),
        }
    }

    /// Restrict a request filter to this scope
    ///
    /// The scope always wins over whatever the request asked for.
    pub fn restrict(&self, filter: TicketFilter) -> TicketFilter {
        let filter = filter.normalized();
        match self {
            Self::All => TicketFilter {
                employee_email: None,
                ..filter
            },
            Self::Department(department) => TicketFilter {
                department: Some(department.clone()),
                employee_email: None,
                ..filter
            },
            Self::Owner(email) => TicketFilter {
                employee_email: Some(email.clone()),
                ..filter
            },
        }
    }

    /// Whether a single ticket is inside this scope
    pub fn covers(&self, ticket: &Ticket) -> bool {
        match self {
            Self::All => true,
            Self::Department(department) => ticket.department == *department,
            Self::Owner(email) => ticket.employee_email == *email,
        }
    }

    /// Department the scope pins aggregates to, if any
    pub fn department(&self) -> Option<&str> {
        match self {
            Self::Department(department) => Some(department),
            _ => None,
        }
    }
}

/// Only admin and IT staff may set a status
pub fn authorize_status_change(identity: &Identity) -> Result<()> {
    if identity.role.is_staff() {
        Ok(())
    } else {
        Err(OfficeTicketError::forbidden("change ticket status"))
    }
}

/// Only a manager of the ticket's department may assign it
pub fn authorize_assignment(identity: &Identity, ticket: &Ticket) -> Result<()> {
    if identity.role != Role::Manager {
        return Err(OfficeTicketError::forbidden("assign tickets"));
    }
    if !Scope::for_identity(identity)?.covers(ticket) {
        return Err(OfficeTicketError::forbidden(format!(
            "assign ticket {} outside your department",
            ticket.ticket_no
        )));
    }
    Ok(())
}

/// Only the person who filed a ticket may comment on it
pub fn authorize_comment(identity: &Identity, ticket: &Ticket) -> Result<()> {
    if ticket.employee_email == identity.email {
        Ok(())
    } else {
        Err(OfficeTicketError::forbidden(format!(
            "comment on ticket {}",
            ticket.ticket_no
        )))
    }
}

/// Dashboard scope: global for staff, departmental for managers
pub fn authorize_dashboard(identity: &Identity) -> Result<Scope> {
    match identity.role {
        Role::Admin | Role::It | Role::Manager => Scope::for_identity(identity),
        Role::Employee => Err(OfficeTicketError::forbidden("view dashboard statistics")),
    }
}

/// Manager-only endpoints
pub fn authorize_manager(identity: &Identity) -> Result<()> {
    if identity.role == Role::Manager {
        Ok(())
    } else {
        Err(OfficeTicketError::forbidden("manager access required"))
    }
}

/// Administrative actions: freeze sweep, user management
pub fn authorize_staff(identity: &Identity, action: &str) -> Result<()> {
    if identity.role.is_staff() {
        Ok(())
    } else {
        Err(OfficeTicketError::forbidden(action))
    }
}
