//! Domain types and rules
//!
//! Nothing in this module touches storage or the network; the service layer
//! loads rows, asks these functions what to do, and writes the result.

pub mod access;
mod builders;
pub mod lifecycle;
mod log;
pub mod numbering;
mod query;
mod ticket;
mod user;

pub use access::Scope;
pub use builders::{NewTicketBuilder, TicketBuilder};
pub use lifecycle::{StatusChange, Transition};
pub use log::{Attachment, NewStatusLog, StatusLogEntry, StoredFile, TicketDetail};
pub use numbering::TicketNo;
pub use query::{DashboardStats, GroupBy, GroupCount, TicketFilter};
pub use ticket::{NewTicket, Status, Ticket};
pub use user::{Caller, Identity, NewUser, Registration, Role, User};
