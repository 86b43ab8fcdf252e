//! Error types for office-ticket
//!
//! Every failure the service can report is a variant of [`OfficeTicketError`].
//! Variants are grouped into the coarse [`ErrorKind`] classes that callers
//! (the HTTP layer, the CLI) use to decide how to react.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, OfficeTicketError>;

/// Coarse classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input, rejected before touching the store
    Validation,
    /// No identity was supplied for an operation that needs one
    Unauthenticated,
    /// The caller's scope does not cover the ticket or action
    Forbidden,
    /// A unique key already exists
    Conflict,
    /// A lifecycle guard rejected the transition
    StateGuard,
    /// The referenced row does not exist
    NotFound,
    /// Persistence, I/O or other infrastructure failure
    Infrastructure,
}

/// Main error type for office-ticket
#[derive(Error, Debug)]
pub enum OfficeTicketError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid ticket number: {0}")]
    InvalidTicketNo(String),

    #[error("Attachment rejected: {0}")]
    AttachmentRejected(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Permission denied: {action}")]
    Forbidden { action: String },

    #[error("Ticket number already taken: {ticket_no}")]
    DuplicateTicketNo { ticket_no: String },

    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    #[error("Ticket {ticket_no} was changed by someone else; reload and try again")]
    TicketModified { ticket_no: String },

    #[error("Ticket {ticket_no} is frozen and cannot be updated")]
    TicketFrozen { ticket_no: String },

    #[error("Ticket {ticket_no} cannot be reopened after 5 days of resolution")]
    ReopenWindowExpired { ticket_no: String },

    #[error("Ticket not found: {ticket_no}")]
    TicketNotFound { ticket_no: String },

    #[error("User not found: {email}")]
    UserNotFound { email: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    Custom(String),
}

impl OfficeTicketError {
    /// Classify the error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidInput(_)
            | Self::InvalidStatus(_)
            | Self::InvalidRole(_)
            | Self::InvalidTicketNo(_)
            | Self::AttachmentRejected(_) => ErrorKind::Validation,
            Self::Unauthenticated | Self::InvalidCredentials | Self::InvalidToken => {
                ErrorKind::Unauthenticated
            },
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::DuplicateTicketNo { .. }
            | Self::DuplicateEmail { .. }
            | Self::TicketModified { .. } => ErrorKind::Conflict,
            Self::TicketFrozen { .. } | Self::ReopenWindowExpired { .. } => ErrorKind::StateGuard,
            Self::TicketNotFound { .. } | Self::UserNotFound { .. } => ErrorKind::NotFound,
            Self::Database(_)
            | Self::Io(_)
            | Self::Config(_)
            | Self::Template(_)
            | Self::Prompt(_)
            | Self::SerializationError(_)
            | Self::Custom(_) => ErrorKind::Infrastructure,
        }
    }

    /// Shorthand for an authorization failure
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    /// Whether the operation should be retried from the allocation step
    ///
    /// Only ticket-number collisions qualify. Registration conflicts and
    /// infrastructure failures are never retried.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DuplicateTicketNo { .. })
    }

    /// Whether the user can fix the problem and try again
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Infrastructure)
    }

    /// Whether the error comes from loading settings
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Message suitable for showing to an end user
    ///
    /// Infrastructure details are not leaked.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Infrastructure => match self {
                Self::Config(e) => format!("Failed to load configuration: {e}"),
                Self::Prompt(e) => format!("Interactive prompt failed: {e}"),
                _ => "Internal server error".to_string(),
            },
            _ => self.to_string(),
        }
    }

    /// Hints for resolving the error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Unauthenticated | Self::InvalidToken => vec![
                "Run 'office-ticket login' and pass the token with --token".to_string(),
                "Or export OFFICE_TICKET_TOKEN".to_string(),
            ],
            Self::InvalidStatus(_) => vec![
                "Valid statuses: Open, Work In Progress, Resolved, Closed, Reopened".to_string(),
            ],
            Self::InvalidRole(_) => vec!["Valid roles: admin, it, manager, employee".to_string()],
            Self::TicketFrozen { .. } => {
                vec!["Frozen tickets are read-only; file a new ticket instead".to_string()]
            },
            Self::ReopenWindowExpired { .. } => vec![
                "Only resolved tickets can be reopened, within 5 days of resolution".to_string(),
            ],
            Self::TicketNotFound { .. } => {
                vec!["Ticket numbers look like OFF-2025-0001".to_string()]
            },
            Self::Database(_) => vec!["Run 'office-ticket init' to create the database".to_string()],
            Self::Config(_) => vec!["Check the configuration file and OFFICE_TICKET__* variables".to_string()],
            _ => vec![],
        }
    }
}

/// Map a database error raised by an insert to a conflict when it is a unique violation
pub(crate) fn map_unique_violation(
    error: sqlx::Error,
    conflict: impl FnOnce() -> OfficeTicketError,
) -> OfficeTicketError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict(),
        _ => OfficeTicketError::Database(error),
    }
}
