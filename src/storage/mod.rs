//! Persistence for tickets, attachments, audit logs and users

mod repository;
mod rows;
mod schema;
mod sqlite;

pub use repository::{Store, TicketRepository, UserRepository};
pub use sqlite::SqliteStore;
