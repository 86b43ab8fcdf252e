//! Command-line interface
//!
//! The binary is an operator's tool: it initializes the database, runs the
//! HTTP server and drives the same [`crate::service::TicketService`]
//! operations the API exposes.

pub mod handlers;
mod output;

pub use output::{OutputFormatter, paint_status};

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Office IT helpdesk ticketing
#[derive(Parser, Debug)]
#[command(name = "office-ticket", version, about, long_about = None)]
pub struct Cli {
    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML settings file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bearer token from `office-ticket login`
    #[arg(long, global = true, env = "OFFICE_TICKET_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database, the uploads directory and the default accounts
    Init,

    /// Run the HTTP API
    #[cfg(feature = "api")]
    Serve {
        /// Address to listen on, overriding the configured one
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Log in and print a bearer token
    Login {
        #[arg(short, long)]
        email: String,

        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// File a new ticket
    New {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        sub_category: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Files to attach
        #[arg(short, long = "attach", value_name = "FILE")]
        attachments: Vec<PathBuf>,

        /// Prompt for every missing field
        #[arg(short, long)]
        interactive: bool,
    },

    /// List tickets visible to the logged-in user
    List {
        #[arg(short, long)]
        status: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// Only tickets you filed
        #[arg(long, conflicts_with_all = ["status", "department", "location", "category"])]
        mine: bool,
    },

    /// Show a ticket with its history and attachments
    Show {
        /// Ticket number, e.g. OFF-2025-0001
        ticket: String,
    },

    /// Change a ticket's status
    Status {
        ticket: String,

        /// Open, "Work In Progress", Resolved, Closed or Reopened
        status: String,

        #[arg(short, long)]
        comment: Option<String>,

        /// Also assign the ticket
        #[arg(short, long)]
        assign: Option<String>,
    },

    /// Assign a ticket within your department
    Assign {
        ticket: String,

        assignee: String,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Comment on a ticket
    Comment { ticket: String, message: String },

    /// Freeze tickets resolved more than five days ago
    Freeze,

    /// Dashboard counts for your scope
    Stats,

    /// Manage accounts
    #[command(subcommand)]
    User(UserCommands),

    /// Export visible tickets
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create an account (admin and IT only)
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,

        #[arg(long, default_value = "employee")]
        role: String,

        #[arg(long)]
        department: Option<String>,
    },

    /// List every account (admin and IT only)
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}
