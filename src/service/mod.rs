//! Request orchestration
//!
//! [`TicketService`] owns every collaborator a request needs: the store, the
//! clock, the notification dispatcher, the blob store and the token issuer.
//! Each operation resolves the caller's scope, asks the lifecycle rules what
//! to write, writes it, and hands notifications off without waiting.

mod accounts;
mod tickets;

pub use accounts::LoginResponse;

use crate::attachments::BlobStore;
use crate::auth::TokenIssuer;
use crate::config::Settings;
use crate::error::Result;
use crate::notify::{Notification, NotificationDispatcher};
use crate::storage::Store;
use crate::templates::{EmailTemplates, RenderedEmail};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// Number of tickets shown under "recent" on the dashboard
pub const RECENT_TICKETS: u32 = 10;

/// Entry point for every ticket and account operation
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    notifications: NotificationDispatcher,
    templates: Arc<EmailTemplates>,
    blobs: BlobStore,
    tokens: TokenIssuer,
    allocation_retries: u32,
}

impl TicketService {
    /// Build a service from settings, using the system clock
    pub fn new(store: Arc<dyn Store>, settings: &Settings) -> Result<Self> {
        Ok(Self {
            store,
            clock: Arc::new(DefaultClock),
            notifications: NotificationDispatcher::from_settings(&settings.notifications)?,
            templates: Arc::new(EmailTemplates::new()?),
            blobs: BlobStore::new(&settings.uploads)?,
            tokens: TokenIssuer::new(&settings.auth),
            allocation_retries: settings.tickets.allocation_retries.max(1),
        })
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the notification dispatcher
    #[must_use]
    pub fn with_notifications(mut self, notifications: NotificationDispatcher) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    fn notify(&self, recipient: &str, email: Result<RenderedEmail>) {
        match email {
            Ok(email) => {
                self.notifications.dispatch(Notification {
                    recipient: recipient.to_string(),
                    subject: email.subject,
                    html: email.html,
                });
            },
            Err(e) => tracing::warn!("Failed to render notification for {recipient}: {e}"),
        }
    }
}

impl std::fmt::Debug for TicketService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketService")
            .field("notifications", &self.notifications)
            .field("blobs", &self.blobs)
            .field("allocation_retries", &self.allocation_retries)
            .finish_non_exhaustive()
    }
}
