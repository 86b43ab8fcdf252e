//! Outbound email notifications
//!
//! Delivery is best effort. The dispatcher hands every message to its own
//! Tokio task; failures are logged there and never reach the caller.

use crate::config::NotificationSettings;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// One email to deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub html: String,
}

/// Delivers notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}

/// Writes notifications to the log instead of sending them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            recipient = %notification.recipient,
            subject = %notification.subject,
            "Email notification (not sent, no SMTP relay configured)"
        );
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::SmtpNotifier;

#[cfg(feature = "smtp")]
mod smtp {
    use super::{Notification, Notifier};
    use crate::config::SmtpSettings;
    use crate::error::{OfficeTicketError, Result};
    use async_trait::async_trait;
    use lettre::message::header::ContentType;
    use lettre::message::{Mailbox, Message};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::{SmtpTransport, Transport};

    /// Sends notifications through an SMTP relay
    pub struct SmtpNotifier {
        from: Mailbox,
        mailer: SmtpTransport,
    }

    impl SmtpNotifier {
        pub fn new(from: &str, settings: &SmtpSettings) -> Result<Self> {
            let from = from
                .parse()
                .map_err(|e| OfficeTicketError::Custom(format!("Invalid from address: {e}")))?;
            let mailer = SmtpTransport::relay(&settings.host)
                .map_err(|e| OfficeTicketError::Custom(format!("SMTP relay error: {e}")))?
                .credentials(Credentials::new(
                    settings.username.clone(),
                    settings.password.clone(),
                ))
                .build();
            Ok(Self { from, mailer })
        }
    }

    #[async_trait]
    impl Notifier for SmtpNotifier {
        async fn send(&self, notification: &Notification) -> Result<()> {
            let to = notification
                .recipient
                .parse()
                .map_err(|e| OfficeTicketError::Custom(format!("Invalid to address: {e}")))?;
            let email = Message::builder()
                .from(self.from.clone())
                .to(to)
                .subject(notification.subject.clone())
                .header(ContentType::TEXT_HTML)
                .body(notification.html.clone())
                .map_err(|e| OfficeTicketError::Custom(format!("Failed to build email: {e}")))?;

            let mailer = self.mailer.clone();
            tokio::task::spawn_blocking(move || mailer.send(&email))
                .await
                .map_err(|e| OfficeTicketError::Custom(format!("Mail task failed: {e}")))?
                .map_err(|e| OfficeTicketError::Custom(format!("Failed to send email: {e}")))?;
            Ok(())
        }
    }
}

/// Spawn-and-forget front of a [`Notifier`]
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Option<Arc<dyn Notifier>>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
        }
    }

    /// Dispatcher that drops every message
    pub fn disabled() -> Self {
        Self { notifier: None }
    }

    /// Pick the notifier the settings ask for
    pub fn from_settings(settings: &NotificationSettings) -> Result<Self> {
        if !settings.enabled {
            return Ok(Self::disabled());
        }

        #[cfg(feature = "smtp")]
        if let Some(smtp) = &settings.smtp {
            let notifier = SmtpNotifier::new(&settings.from, smtp)?;
            return Ok(Self::new(Arc::new(notifier)));
        }
        #[cfg(not(feature = "smtp"))]
        if settings.smtp.is_some() {
            tracing::warn!("SMTP settings ignored: built without the `smtp` feature");
        }

        Ok(Self::new(Arc::new(LogNotifier)))
    }

    /// Deliver in the background
    ///
    /// The handle is only useful to tests; callers normally drop it.
    pub fn dispatch(&self, notification: Notification) -> Option<JoinHandle<()>> {
        let notifier = Arc::clone(self.notifier.as_ref()?);
        Some(tokio::spawn(async move {
            if let Err(e) = notifier.send(&notification).await {
                tracing::warn!(
                    recipient = %notification.recipient,
                    "Failed to send notification: {e}"
                );
            }
        }))
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("enabled", &self.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OfficeTicketError;
    use crate::test_utils::RecordingNotifier;

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _notification: &Notification) -> Result<()> {
            Err(OfficeTicketError::Custom("relay down".to_string()))
        }
    }

    fn notification() -> Notification {
        Notification {
            recipient: "dana@office.com".to_string(),
            subject: "Ticket Created: OFF-2025-0001".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_delivers_in_background() {
        let recorder = Arc::new(RecordingNotifier::default());
        let dispatcher = NotificationDispatcher::new(recorder.clone());

        dispatcher.dispatch(notification()).unwrap().await.unwrap();
        assert_eq!(recorder.sent(), vec![notification()]);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let dispatcher = NotificationDispatcher::new(Arc::new(FailingNotifier));
        let handle = dispatcher.dispatch(notification()).unwrap();
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_dispatcher_drops_messages() {
        let settings = NotificationSettings {
            enabled: false,
            ..NotificationSettings::default()
        };
        let dispatcher = NotificationDispatcher::from_settings(&settings).unwrap();
        assert!(dispatcher.dispatch(notification()).is_none());
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        assert!(LogNotifier.send(&notification()).await.is_ok());
    }
}
