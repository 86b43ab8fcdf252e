//! Table definitions
//!
//! Applied on every open; each statement is idempotent.

pub(super) const SCHEMA: &[&str] = &[
    r"CREATE TABLE IF NOT EXISTS users (
        user_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'employee',
        department TEXT,
        created_at TEXT NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS tickets (
        ticket_no TEXT PRIMARY KEY,
        employee_name TEXT NOT NULL,
        employee_email TEXT NOT NULL,
        department TEXT NOT NULL,
        location TEXT NOT NULL,
        category TEXT NOT NULL,
        sub_category TEXT,
        description TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Open',
        assigned_to TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        resolved_at TEXT,
        frozen INTEGER NOT NULL DEFAULT 0
    )",
    r"CREATE TABLE IF NOT EXISTS attachments (
        attachment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_no TEXT NOT NULL REFERENCES tickets(ticket_no),
        file_name TEXT NOT NULL,
        file_path TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS status_logs (
        log_id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_no TEXT NOT NULL REFERENCES tickets(ticket_no),
        status TEXT NOT NULL,
        updated_by TEXT NOT NULL,
        comment TEXT,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_tickets_department ON tickets(department)",
    "CREATE INDEX IF NOT EXISTS idx_tickets_employee_email ON tickets(employee_email)",
    "CREATE INDEX IF NOT EXISTS idx_attachments_ticket_no ON attachments(ticket_no)",
    "CREATE INDEX IF NOT EXISTS idx_status_logs_ticket_no ON status_logs(ticket_no)",
];
