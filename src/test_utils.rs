//! Test utilities for office-ticket
//!
//! Shared fixtures: a service over an in-memory store, a settable clock and a
//! notifier that records instead of sending.

#![cfg(test)]

use crate::config::Settings;
use crate::core::{Caller, Identity, NewTicket, NewTicketBuilder, Role};
use crate::error::Result;
use crate::notify::{Notification, NotificationDispatcher, Notifier};
use crate::service::TicketService;
use crate::storage::SqliteStore;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::TempDir;

/// Clock whose time only moves when a test says so
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock_clock();
        *now += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Notifier that keeps every message it is asked to send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }
}

/// 2025-03-10 09:00 UTC, the default fixture time
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

/// Valid intake for `email` in `department`
pub fn sample_intake(email: &str, department: &str) -> NewTicket {
    NewTicketBuilder::new()
        .employee_name("Dana Reyes")
        .employee_email(email)
        .department(department)
        .location("HQ")
        .category("Hardware")
        .sub_category("Printer")
        .description("Printer on floor 2 is jammed")
        .build()
        .expect("Sample intake should be valid")
}

/// Caller with the given role, skipping the token round trip
pub fn caller(email: &str, role: Role, department: Option<&str>) -> Caller {
    Caller::User(Identity {
        email: email.to_string(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        role,
        department: department.map(String::from),
    })
}

pub fn admin() -> Caller {
    caller("admin@office.com", Role::Admin, Some("IT"))
}

pub fn manager(department: &str) -> Caller {
    caller("manager@office.com", Role::Manager, Some(department))
}

pub fn employee(email: &str) -> Caller {
    caller(email, Role::Employee, Some("General"))
}

/// Service over an in-memory store with a fixed clock and recorded notifications
pub struct TestService {
    pub service: TicketService,
    pub clock: Arc<MutableClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: SqliteStore,
    pub uploads: TempDir,
}

impl TestService {
    pub async fn new() -> Self {
        Self::with_settings(Settings::default()).await
    }

    pub async fn with_settings(mut settings: Settings) -> Self {
        let uploads = TempDir::new().expect("Failed to create temp dir");
        settings.uploads.dir = uploads.path().join("uploads");

        let store = SqliteStore::in_memory()
            .await
            .expect("Failed to open in-memory store");
        let clock = Arc::new(MutableClock::new(fixture_time()));
        let notifier = Arc::new(RecordingNotifier::default());

        let service = TicketService::new(Arc::new(store.clone()), &settings)
            .expect("Failed to build service")
            .with_clock(clock.clone())
            .with_notifications(NotificationDispatcher::new(notifier.clone()));

        Self {
            service,
            clock,
            notifier,
            store,
            uploads,
        }
    }

    /// Wait until `count` notifications were recorded, or give up after ~1s
    pub async fn wait_for_notifications(&self, count: usize) -> Vec<Notification> {
        for _ in 0..100 {
            let sent = self.notifier.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.notifier.sent()
    }
}
