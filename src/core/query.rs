use super::{Status, Ticket};
use serde::{Deserialize, Serialize};

/// Exact-match filters for listing tickets
///
/// Every populated field is ANDed; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilter {
    pub status: Option<Status>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    /// Restricts to tickets filed by this email; set by access scoping only
    #[serde(skip)]
    pub employee_email: Option<String>,
}

impl TicketFilter {
    /// Drop empty strings so that `?department=` behaves like an absent filter
    pub fn normalized(self) -> Self {
        let clean = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            status: self.status,
            department: clean(self.department),
            location: clean(self.location),
            category: clean(self.category),
            employee_email: clean(self.employee_email),
        }
    }
}

/// Column a count can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Status,
    Department,
    Location,
}

impl GroupBy {
    pub(crate) const fn column(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Department => "department",
            Self::Location => "location",
        }
    }
}

/// One bucket of a grouped count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

/// Aggregates shown on the admin and manager dashboards
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Department the numbers are restricted to; `None` for the global view
    pub department: Option<String>,
    pub total: i64,
    pub by_status: Vec<GroupCount>,
    pub by_department: Vec<GroupCount>,
    pub by_location: Vec<GroupCount>,
    pub recent_tickets: Vec<Ticket>,
}
