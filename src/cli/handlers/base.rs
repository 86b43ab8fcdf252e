//! Shared setup for command handlers

use crate::config::Settings;
use crate::core::{Caller, TicketNo};
use crate::error::Result;
use crate::service::TicketService;
use crate::storage::SqliteStore;
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;
use std::path::Path;
use std::sync::Arc;

/// Resources every handler works with
///
/// Opening the context creates the database file and schema if they are
/// missing, so `init` is only needed for the seed accounts.
pub struct HandlerContext {
    pub settings: Settings,
    pub store: SqliteStore,
    pub service: TicketService,
}

impl HandlerContext {
    /// Load settings from `config` (plus environment) and open the store
    pub async fn new(config: Option<&Path>) -> Result<Self> {
        Self::from_settings(Settings::load(config)?).await
    }

    pub async fn from_settings(settings: Settings) -> Result<Self> {
        let store = SqliteStore::open(&settings.database.path).await?;
        let service = TicketService::new(Arc::new(store.clone()), &settings)?;
        Ok(Self {
            settings,
            store,
            service,
        })
    }

    /// Resolve `--token` into a caller
    pub async fn caller(&self, token: Option<&str>) -> Result<Caller> {
        self.service.caller(token).await
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.store.close().await;
    }
}

/// Parse a ticket number given on the command line
pub fn parse_ticket_no(raw: &str) -> Result<TicketNo> {
    raw.trim().parse()
}

/// Use the given password or prompt for one without echo
pub fn password_or_prompt(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(prompt.interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.database.path = dir.path().join("data").join("tickets.db");
        settings.uploads.dir = dir.path().join("uploads");
        settings.notifications.enabled = false;
        settings
    }

    #[tokio::test]
    async fn test_context_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let settings = settings_in(&temp_dir);
        let db_path = settings.database.path.clone();

        let context = HandlerContext::from_settings(settings).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(context.caller(None).await.unwrap(), Caller::Anonymous);
        context.close().await;
    }

    #[test]
    fn test_parse_ticket_no_trims() {
        let no = parse_ticket_no(" OFF-2025-0007 ").unwrap();
        assert_eq!(no.sequence(), 7);
        assert!(parse_ticket_no("TICKET-7").is_err());
    }

    #[test]
    fn test_explicit_password_skips_prompt() {
        assert_eq!(
            password_or_prompt(Some("admin123".to_string()), true).unwrap(),
            "admin123"
        );
    }
}
