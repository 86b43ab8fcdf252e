use crate::error::{OfficeTicketError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// IT staff, treated like `Admin` by every access check
    It,
    Manager,
    #[default]
    Employee,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::It => "it",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Admin or IT
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::It)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = OfficeTicketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "it" => Ok(Self::It),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            _ => Err(OfficeTicketError::InvalidRole(s.to_string())),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Account data ready to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registration request before the password is hashed
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub department: Option<String>,
}

impl Registration {
    /// Trim fields, lowercase the email and reject missing data
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(OfficeTicketError::MissingField("name"));
        }
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            return Err(OfficeTicketError::MissingField("email"));
        }
        if !email.contains('@') {
            return Err(OfficeTicketError::InvalidInput(format!(
                "Invalid email address: {email}"
            )));
        }
        if self.password.is_empty() {
            return Err(OfficeTicketError::MissingField("password"));
        }

        Ok(Self {
            name,
            email,
            password: self.password,
            role: self.role,
            department: self
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}

/// Verified caller identity
///
/// Built once per request from a verified token plus the caller's current
/// user record, then passed by value to the access checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            department: user.department.clone(),
        }
    }
}

/// Who is making a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    User(Identity),
}

impl Caller {
    /// The identity, or an authentication error for anonymous callers
    pub fn identity(&self) -> Result<&Identity> {
        match self {
            Self::User(identity) => Ok(identity),
            Self::Anonymous => Err(OfficeTicketError::Unauthenticated),
        }
    }
}

impl From<Identity> for Caller {
    fn from(identity: Identity) -> Self {
        Self::User(identity)
    }
}
