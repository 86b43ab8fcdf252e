//! office-ticket - Office IT helpdesk ticketing
//!
//! Employees file tickets with optional attachments and receive a
//! year-scoped ticket number (`OFF-2025-0001`). IT staff move tickets through
//! their lifecycle, managers assign work inside their department, and
//! resolved tickets freeze once their reopen window has passed.
//!
//! The crate is layered:
//! - [`core`]: domain types and the pure lifecycle and access rules
//! - [`storage`]: the SQLite-backed store
//! - [`service`]: request orchestration over a store, a clock and notifiers
//! - [`api`]: the HTTP surface (feature `api`)
//! - [`cli`]: the operator's command-line tool
//!
//! # Example
//!
//! ```rust,ignore
//! use office_ticket::config::Settings;
//! use office_ticket::core::NewTicketBuilder;
//! use office_ticket::service::TicketService;
//! use office_ticket::storage::SqliteStore;
//! use std::sync::Arc;
//!
//! let settings = Settings::load(None)?;
//! let store = SqliteStore::open(&settings.database.path).await?;
//! let service = TicketService::new(Arc::new(store), &settings)?;
//!
//! let intake = NewTicketBuilder::new()
//!     .employee_name("Dana Reyes")
//!     .employee_email("dana@office.com")
//!     .department("Accounts")
//!     .location("HQ")
//!     .category("Printer")
//!     .description("Printer shows offline")
//!     .build()?;
//! let ticket = service.create_ticket(intake, vec![]).await?;
//! println!("Filed {}", ticket.ticket_no);
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]

pub mod attachments;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod notify;
pub mod service;
pub mod storage;
pub mod templates;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

pub use error::{OfficeTicketError, Result};
