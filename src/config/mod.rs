//! Runtime settings
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `OFFICE_TICKET__<SECTION>__<KEY>` environment variables.

use crate::error::Result;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "OFFICE_TICKET";

/// Secret used when none is configured; `serve` warns about it
pub const DEV_JWT_SECRET: &str = "office-ticket-dev-secret";

/// Top-level settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub uploads: UploadSettings,
    pub tickets: TicketSettings,
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tickets.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
        }
    }
}

impl AuthSettings {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Limits applied to ticket attachments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub max_files: usize,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: 10 * 1024 * 1024,
            max_files: 3,
            allowed_extensions: ["jpeg", "jpg", "png", "pdf", "doc", "docx", "txt"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketSettings {
    /// How many times creation retries after losing a numbering race
    pub allocation_retries: u32,
}

impl Default for TicketSettings {
    fn default() -> Self {
        Self {
            allocation_retries: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub from: String,
    /// SMTP relay; when unset, notifications are only logged
    pub smtp: Option<SmtpSettings>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            from: "helpdesk@office.com".to_string(),
            smtp: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
}

impl Settings {
    /// Load settings
    ///
    /// An explicit `path` must exist. Without one, the platform config file
    /// is read if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            },
            None => {
                if let Some(default_path) = Self::default_config_path() {
                    builder = builder.add_source(File::from(default_path).required(false));
                }
            },
        }

        let settings: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!(
            "Loaded settings: database={}, uploads={}",
            settings.database.path.display(),
            settings.uploads.dir.display()
        );
        Ok(settings)
    }

    /// `config.toml` in the platform configuration directory
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "office-ticket", "office-ticket")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
