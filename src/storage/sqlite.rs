use super::repository::{TicketRepository, UserRepository};
use super::rows::{AttachmentRow, StatusLogRow, TicketRow, UserRow, convert_all};
use super::schema::SCHEMA;
use crate::core::lifecycle::ResolvedAt;
use crate::core::{
    Attachment, GroupBy, GroupCount, NewStatusLog, NewUser, Status, StatusLogEntry, StoredFile,
    Ticket, TicketFilter, TicketNo, Transition, User,
};
use crate::error::{OfficeTicketError, Result, map_unique_violation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// SQLite-backed store
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path` and applies the schema
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened ticket database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // A single connection that never expires keeps the memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        Ok(Self { pool })
    }

    /// Closes the pool, waiting for connections to be returned
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

async fn insert_log(conn: &mut SqliteConnection, log: &NewStatusLog) -> Result<()> {
    sqlx::query(
        "INSERT INTO status_logs (ticket_no, status, updated_by, comment, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(log.ticket_no.to_string())
    .bind(log.status.as_str())
    .bind(&log.updated_by)
    .bind(&log.comment)
    .bind(log.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

fn push_department(builder: &mut QueryBuilder<'_, Sqlite>, department: Option<&str>) {
    if let Some(department) = department {
        builder
            .push(" WHERE department = ")
            .push_bind(department.to_string());
    }
}

#[async_trait]
impl TicketRepository for SqliteStore {
    async fn latest_ticket_no(&self, year: i32) -> Result<Option<TicketNo>> {
        // Longer suffixes sort first so OFF-2025-10000 beats OFF-2025-9999.
        let latest: Option<String> = sqlx::query_scalar(
            "SELECT ticket_no FROM tickets WHERE ticket_no LIKE ?
             ORDER BY LENGTH(ticket_no) DESC, ticket_no DESC LIMIT 1",
        )
        .bind(format!("{}%", TicketNo::year_prefix(year)))
        .fetch_optional(&self.pool)
        .await?;

        latest.map(|no| no.parse()).transpose()
    }

    async fn create_ticket(
        &self,
        ticket: &Ticket,
        attachments: &[StoredFile],
        log: &NewStatusLog,
    ) -> Result<()> {
        let ticket_no = ticket.ticket_no.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tickets (ticket_no, employee_name, employee_email, department, location,
                category, sub_category, description, status, assigned_to, created_at, updated_at,
                resolved_at, frozen)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ticket_no)
        .bind(&ticket.employee_name)
        .bind(&ticket.employee_email)
        .bind(&ticket.department)
        .bind(&ticket.location)
        .bind(&ticket.category)
        .bind(&ticket.sub_category)
        .bind(&ticket.description)
        .bind(ticket.status.as_str())
        .bind(&ticket.assigned_to)
        .bind(ticket.created_at)
        .bind(ticket.updated_at)
        .bind(ticket.resolved_at)
        .bind(ticket.frozen)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || OfficeTicketError::DuplicateTicketNo {
                ticket_no: ticket_no.clone(),
            })
        })?;

        for file in attachments {
            sqlx::query(
                "INSERT INTO attachments (ticket_no, file_name, file_path, uploaded_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&ticket_no)
            .bind(&file.file_name)
            .bind(&file.file_path)
            .bind(ticket.created_at)
            .execute(&mut *tx)
            .await?;
        }

        insert_log(&mut tx, log).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn load_ticket(&self, ticket_no: &TicketNo) -> Result<Ticket> {
        let row: Option<TicketRow> = sqlx::query_as("SELECT * FROM tickets WHERE ticket_no = ?")
            .bind(ticket_no.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Ticket::try_from)
            .transpose()?
            .ok_or_else(|| OfficeTicketError::TicketNotFound {
                ticket_no: ticket_no.to_string(),
            })
    }

    async fn find_tickets(&self, filter: &TicketFilter) -> Result<Vec<Ticket>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM tickets WHERE 1=1");
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        let text_filters = [
            ("department", &filter.department),
            ("location", &filter.location),
            ("category", &filter.category),
            ("employee_email", &filter.employee_email),
        ];
        for (column, value) in text_filters {
            if let Some(value) = value {
                builder
                    .push(format!(" AND {column} = "))
                    .push_bind(value.clone());
            }
        }
        builder.push(" ORDER BY created_at DESC, ticket_no DESC");

        let rows: Vec<TicketRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn recent_tickets(&self, department: Option<&str>, limit: u32) -> Result<Vec<Ticket>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM tickets");
        push_department(&mut builder, department);
        builder
            .push(" ORDER BY created_at DESC, ticket_no DESC LIMIT ")
            .push_bind(i64::from(limit));

        let rows: Vec<TicketRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        convert_all(rows)
    }

    async fn apply_transition(&self, transition: &Transition) -> Result<()> {
        let update = &transition.update;
        let ticket_no = transition.log.ticket_no.to_string();
        let mut tx = self.pool.begin().await?;

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tickets SET status = ");
        builder
            .push_bind(update.status.as_str())
            .push(", updated_at = ")
            .push_bind(update.updated_at);
        match update.resolved_at {
            ResolvedAt::Set(resolved_at) => {
                builder.push(", resolved_at = ").push_bind(resolved_at);
            },
            ResolvedAt::Clear => {
                builder.push(", resolved_at = NULL");
            },
            ResolvedAt::Keep => {},
        }
        if let Some(assigned_to) = &update.assigned_to {
            builder.push(", assigned_to = ").push_bind(assigned_to.clone());
        }
        builder
            .push(" WHERE ticket_no = ")
            .push_bind(ticket_no.clone())
            .push(" AND status = ")
            .push_bind(update.expected_status.as_str())
            .push(" AND frozen = 0");

        let result = builder.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            let current: Option<(bool,)> =
                sqlx::query_as("SELECT frozen FROM tickets WHERE ticket_no = ?")
                    .bind(&ticket_no)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            return Err(match current {
                Some((true,)) => OfficeTicketError::TicketFrozen { ticket_no },
                Some((false,)) => OfficeTicketError::TicketModified { ticket_no },
                None => OfficeTicketError::TicketNotFound { ticket_no },
            });
        }

        insert_log(&mut tx, &transition.log).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn append_log(&self, log: &NewStatusLog) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        insert_log(&mut conn, log).await
    }

    async fn logs(&self, ticket_no: &TicketNo) -> Result<Vec<StatusLogEntry>> {
        let rows: Vec<StatusLogRow> = sqlx::query_as(
            "SELECT * FROM status_logs WHERE ticket_no = ?
             ORDER BY updated_at DESC, log_id DESC",
        )
        .bind(ticket_no.to_string())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn attachments(&self, ticket_no: &TicketNo) -> Result<Vec<Attachment>> {
        let rows: Vec<AttachmentRow> = sqlx::query_as(
            "SELECT * FROM attachments WHERE ticket_no = ? ORDER BY attachment_id",
        )
        .bind(ticket_no.to_string())
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn resolved_unfrozen(&self) -> Result<Vec<Ticket>> {
        let rows: Vec<TicketRow> =
            sqlx::query_as("SELECT * FROM tickets WHERE status = ? AND frozen = 0")
                .bind(Status::Resolved.as_str())
                .fetch_all(&self.pool)
                .await?;
        convert_all(rows)
    }

    async fn mark_frozen(
        &self,
        ticket_nos: &[TicketNo],
        resolved_before: DateTime<Utc>,
    ) -> Result<u64> {
        if ticket_nos.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut frozen = 0;
        for ticket_no in ticket_nos {
            // Re-checked here so a ticket reopened or re-resolved since the
            // scan stays unfrozen.
            frozen += sqlx::query(
                "UPDATE tickets SET frozen = 1
                 WHERE ticket_no = ? AND status = ? AND frozen = 0
                   AND resolved_at IS NOT NULL AND resolved_at < ?",
            )
            .bind(ticket_no.to_string())
            .bind(Status::Resolved.as_str())
            .bind(resolved_before)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        Ok(frozen)
    }

    async fn count_tickets(&self, department: Option<&str>) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tickets");
        push_department(&mut builder, department);
        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_grouped(
        &self,
        group: GroupBy,
        department: Option<&str>,
    ) -> Result<Vec<GroupCount>> {
        let column = group.column();
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {column} AS key, COUNT(*) AS count FROM tickets"
        ));
        push_department(&mut builder, department);
        builder.push(format!(
            " GROUP BY {column} ORDER BY count DESC, {column}"
        ));

        let counts: Vec<GroupCount> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(counts)
    }
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, role, department, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.department)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || OfficeTicketError::DuplicateEmail {
                email: user.email.clone(),
            })
        })?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            department: user.department.clone(),
            created_at: user.created_at,
        })
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lifecycle::{TicketUpdate, freeze_cutoff, plan_assignment, plan_status_change};
    use crate::core::{NewTicketBuilder, Role, StatusChange, TicketBuilder};
    use crate::test_utils::fixture_time;
    use chrono::Duration;

    async fn store() -> SqliteStore {
        SqliteStore::in_memory().await.expect("Failed to open store")
    }

    fn ticket(sequence: u32, department: &str, location: &str) -> Ticket {
        let intake = NewTicketBuilder::new()
            .employee_name("Dana Reyes")
            .employee_email("dana@office.com")
            .department(department)
            .location(location)
            .category("Printer")
            .sub_category("Offline")
            .description("Printer shows offline")
            .build()
            .unwrap();
        TicketBuilder::new(TicketNo::new(2025, sequence), intake)
            .created_at(fixture_time() + Duration::seconds(i64::from(sequence)))
            .build()
    }

    fn creation_log(ticket: &Ticket) -> NewStatusLog {
        NewStatusLog {
            ticket_no: ticket.ticket_no.clone(),
            status: Status::Open,
            updated_by: ticket.employee_name.clone(),
            comment: "Ticket created".to_string(),
            updated_at: ticket.created_at,
        }
    }

    async fn insert(store: &SqliteStore, ticket: &Ticket) {
        store
            .create_ticket(ticket, &[], &creation_log(ticket))
            .await
            .expect("Failed to create ticket");
    }

    #[tokio::test]
    async fn test_create_and_load_ticket() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        let files = vec![StoredFile {
            file_name: "screen.png".to_string(),
            file_path: "1-screen.png".to_string(),
        }];
        store
            .create_ticket(&t, &files, &creation_log(&t))
            .await
            .unwrap();

        let loaded = store.load_ticket(&t.ticket_no).await.unwrap();
        assert_eq!(loaded.category, "Printer");
        assert_eq!(loaded.sub_category.as_deref(), Some("Offline"));
        assert_eq!(loaded.status, Status::Open);
        assert_eq!(loaded.assigned_to, None);
        assert_eq!(loaded.created_at, t.created_at);

        let attachments = store.attachments(&t.ticket_no).await.unwrap();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].file_name, "screen.png");

        let logs = store.logs(&t.ticket_no).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].comment.as_deref(), Some("Ticket created"));
    }

    #[tokio::test]
    async fn test_duplicate_ticket_no_is_a_conflict_and_writes_nothing() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        insert(&store, &t).await;

        let mut dup = ticket(1, "Sales", "Branch");
        dup.description = "Different".to_string();
        let err = store
            .create_ticket(&dup, &[], &creation_log(&dup))
            .await
            .unwrap_err();
        assert!(matches!(err, OfficeTicketError::DuplicateTicketNo { .. }));
        assert!(err.is_retryable());

        assert_eq!(store.logs(&t.ticket_no).await.unwrap().len(), 1);
        assert_eq!(
            store.load_ticket(&t.ticket_no).await.unwrap().department,
            "Accounts"
        );
    }

    #[tokio::test]
    async fn test_missing_ticket() {
        let store = store().await;
        let err = store
            .load_ticket(&TicketNo::new(2025, 99))
            .await
            .unwrap_err();
        assert!(matches!(err, OfficeTicketError::TicketNotFound { .. }));
    }

    #[tokio::test]
    async fn test_latest_ticket_no_is_year_scoped_and_numeric() {
        let store = store().await;
        assert_eq!(store.latest_ticket_no(2025).await.unwrap(), None);

        insert(&store, &ticket(9999, "Accounts", "HQ")).await;
        insert(&store, &ticket(10000, "Accounts", "HQ")).await;
        let mut old = ticket(37, "Accounts", "HQ");
        old.ticket_no = TicketNo::new(2024, 37);
        insert(&store, &old).await;

        assert_eq!(
            store.latest_ticket_no(2025).await.unwrap(),
            Some(TicketNo::new(2025, 10000))
        );
        assert_eq!(
            store.latest_ticket_no(2024).await.unwrap(),
            Some(TicketNo::new(2024, 37))
        );
        assert_eq!(store.latest_ticket_no(2026).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_tickets_filters_are_anded() {
        let store = store().await;
        insert(&store, &ticket(1, "Accounts", "HQ")).await;
        insert(&store, &ticket(2, "Accounts", "Branch")).await;
        insert(&store, &ticket(3, "Sales", "HQ")).await;

        let all = store.find_tickets(&TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].ticket_no, TicketNo::new(2025, 3), "newest first");

        let filter = TicketFilter {
            department: Some("Accounts".to_string()),
            location: Some("HQ".to_string()),
            ..TicketFilter::default()
        };
        let found = store.find_tickets(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ticket_no, TicketNo::new(2025, 1));

        let none = store
            .find_tickets(&TicketFilter {
                status: Some(Status::Closed),
                ..TicketFilter::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_apply_transition_updates_row_and_log() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        insert(&store, &t).await;

        let now = fixture_time() + Duration::hours(1);
        let plan = plan_status_change(
            &t,
            StatusChange::to(Status::Resolved)
                .with_comment("Fixed")
                .with_assignee("Alex"),
            "it@office.com",
            now,
        )
        .unwrap();
        store.apply_transition(&plan).await.unwrap();

        let loaded = store.load_ticket(&t.ticket_no).await.unwrap();
        assert_eq!(loaded.status, Status::Resolved);
        assert_eq!(loaded.resolved_at, Some(now));
        assert_eq!(loaded.assigned_to.as_deref(), Some("Alex"));
        assert_eq!(loaded.updated_at, now);

        let logs = store.logs(&t.ticket_no).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, Status::Resolved);
        assert_eq!(logs[0].updated_by, "it@office.com");
    }

    fn resolve_at(ticket: &Ticket, resolved: DateTime<Utc>) -> Transition {
        Transition {
            update: TicketUpdate {
                expected_status: ticket.status,
                status: Status::Resolved,
                assigned_to: None,
                resolved_at: ResolvedAt::Set(resolved),
                updated_at: resolved,
            },
            log: NewStatusLog {
                ticket_no: ticket.ticket_no.clone(),
                status: Status::Resolved,
                updated_by: "it@office.com".to_string(),
                comment: String::new(),
                updated_at: resolved,
            },
        }
    }

    #[tokio::test]
    async fn test_apply_transition_refuses_frozen_row() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        insert(&store, &t).await;
        let now = fixture_time() + Duration::days(7);
        store
            .apply_transition(&resolve_at(&t, fixture_time() + Duration::hours(1)))
            .await
            .unwrap();
        assert_eq!(
            store
                .mark_frozen(&[t.ticket_no.clone()], freeze_cutoff(now))
                .await
                .unwrap(),
            1
        );

        let before = store.load_ticket(&t.ticket_no).await.unwrap();
        let logs_before = store.logs(&t.ticket_no).await.unwrap().len();

        // Built against a stale, unfrozen copy to exercise the store-level guard.
        let plan = plan_status_change(&t, StatusChange::to(Status::Closed), "it@office.com", now)
            .unwrap();
        let err = store.apply_transition(&plan).await.unwrap_err();
        assert!(matches!(err, OfficeTicketError::TicketFrozen { .. }));

        assert_eq!(store.load_ticket(&t.ticket_no).await.unwrap(), before);
        assert_eq!(store.logs(&t.ticket_no).await.unwrap().len(), logs_before);
    }

    #[tokio::test]
    async fn test_stale_assignment_cannot_revert_status() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        insert(&store, &t).await;

        // Planned while the ticket was still Open.
        let now = fixture_time() + Duration::hours(1);
        let stale = plan_assignment(&t, "Alex", None, "manager@office.com", now).unwrap();

        let close = plan_status_change(&t, StatusChange::to(Status::Closed), "it@office.com", now)
            .unwrap();
        store.apply_transition(&close).await.unwrap();

        let err = store.apply_transition(&stale).await.unwrap_err();
        assert!(matches!(err, OfficeTicketError::TicketModified { .. }));

        let loaded = store.load_ticket(&t.ticket_no).await.unwrap();
        assert_eq!(loaded.status, Status::Closed);
        assert_eq!(loaded.assigned_to, None);
        let logs = store.logs(&t.ticket_no).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, Status::Closed);

        // Re-planned from the current row it goes through and keeps Closed.
        let fresh = plan_assignment(&loaded, "Alex", None, "manager@office.com", now).unwrap();
        store.apply_transition(&fresh).await.unwrap();
        let loaded = store.load_ticket(&t.ticket_no).await.unwrap();
        assert_eq!(loaded.status, Status::Closed);
        assert_eq!(loaded.assigned_to.as_deref(), Some("Alex"));
    }

    #[tokio::test]
    async fn test_mark_frozen_only_touches_resolved_rows() {
        let store = store().await;
        let open = ticket(1, "Accounts", "HQ");
        insert(&store, &open).await;
        let cutoff = freeze_cutoff(fixture_time() + Duration::days(30));

        assert_eq!(store.mark_frozen(&[open.ticket_no.clone()], cutoff).await.unwrap(), 0);
        assert_eq!(store.mark_frozen(&[], cutoff).await.unwrap(), 0);
        assert!(store.resolved_unfrozen().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_frozen_skips_ticket_re_resolved_after_scan() {
        let store = store().await;
        let t = ticket(1, "Accounts", "HQ");
        insert(&store, &t).await;
        store
            .apply_transition(&resolve_at(&t, fixture_time() + Duration::hours(1)))
            .await
            .unwrap();

        let now = fixture_time() + Duration::days(7);
        let scanned = store.resolved_unfrozen().await.unwrap();
        assert_eq!(scanned.len(), 1);

        // Reopened and resolved again between the scan and the freeze.
        let reopened = Transition {
            update: TicketUpdate {
                expected_status: Status::Resolved,
                status: Status::Reopened,
                assigned_to: None,
                resolved_at: ResolvedAt::Clear,
                updated_at: now,
            },
            log: NewStatusLog {
                ticket_no: t.ticket_no.clone(),
                status: Status::Reopened,
                updated_by: "dana@office.com".to_string(),
                comment: String::new(),
                updated_at: now,
            },
        };
        store.apply_transition(&reopened).await.unwrap();
        let current = store.load_ticket(&t.ticket_no).await.unwrap();
        store.apply_transition(&resolve_at(&current, now)).await.unwrap();

        let frozen = store
            .mark_frozen(&[scanned[0].ticket_no.clone()], freeze_cutoff(now))
            .await
            .unwrap();
        assert_eq!(frozen, 0);
        let loaded = store.load_ticket(&t.ticket_no).await.unwrap();
        assert!(!loaded.frozen);
        assert_eq!(loaded.resolved_at, Some(now));
    }

    #[tokio::test]
    async fn test_counts() {
        let store = store().await;
        insert(&store, &ticket(1, "Accounts", "HQ")).await;
        insert(&store, &ticket(2, "Accounts", "Branch")).await;
        insert(&store, &ticket(3, "Sales", "HQ")).await;

        assert_eq!(store.count_tickets(None).await.unwrap(), 3);
        assert_eq!(store.count_tickets(Some("Accounts")).await.unwrap(), 2);

        let by_department = store.count_grouped(GroupBy::Department, None).await.unwrap();
        assert_eq!(
            by_department,
            vec![
                GroupCount {
                    key: "Accounts".to_string(),
                    count: 2
                },
                GroupCount {
                    key: "Sales".to_string(),
                    count: 1
                },
            ]
        );

        let by_location = store
            .count_grouped(GroupBy::Location, Some("Accounts"))
            .await
            .unwrap();
        assert_eq!(by_location.len(), 2);

        let by_status = store.count_grouped(GroupBy::Status, None).await.unwrap();
        assert_eq!(by_status[0].key, "Open");
        assert_eq!(by_status[0].count, 3);

        let recent = store.recent_tickets(Some("Accounts"), 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].ticket_no, TicketNo::new(2025, 2));
    }

    #[tokio::test]
    async fn test_users() {
        let store = store().await;
        let new_user = NewUser {
            name: "Mia".to_string(),
            email: "mia@office.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Manager,
            department: Some("Accounts".to_string()),
            created_at: fixture_time(),
        };
        let user = store.insert_user(&new_user).await.unwrap();
        assert!(user.user_id > 0);

        let err = store.insert_user(&new_user).await.unwrap_err();
        assert!(matches!(err, OfficeTicketError::DuplicateEmail { .. }));
        assert!(!err.is_retryable());

        let found = store.find_user("mia@office.com").await.unwrap().unwrap();
        assert_eq!(found.role, Role::Manager);
        assert_eq!(found.department.as_deref(), Some("Accounts"));
        assert!(store.find_user("nobody@office.com").await.unwrap().is_none());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }
}
