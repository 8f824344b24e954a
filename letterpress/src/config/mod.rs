//! Service configuration
//!
//! Loaded with `figment` from several sources, later ones winning:
//!
//! 1. Built-in defaults
//! 2. `/etc/letterpress/config.toml`
//! 3. `~/.config/letterpress/config.toml`
//! 4. `./letterpress.toml`
//! 5. Environment variables prefixed `LETTERPRESS_`, `__` for nesting
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [admin]
//! prefix = "/admin/letterpress/templates"
//! static_url = "/static/"
//!
//! [mail]
//! backend = "smtp"
//! from_address = "Acme <noreply@acme.test>"
//!
//! [mail.smtp]
//! host = "smtp.acme.test"
//! port = 587
//! username = "mailer"
//! password = "secret"
//!
//! [store]
//! backend = "file"
//! path = "/var/lib/letterpress/templates.json"
//! ```
//!
//! `LETTERPRESS_MAIL__SMTP__PASSWORD=...` overrides a single nested value.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "LETTERPRESS_";

/// HTTP listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// `host:port` for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Admin interface mounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Path prefix for every admin route; a missing leading slash is added
    pub prefix: String,
    /// Base URL of the editor's static assets
    pub static_url: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            prefix: "/admin/letterpress/templates".to_string(),
            static_url: "/static/".to_string(),
        }
    }
}

/// Which email backend delivers messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Log messages instead of sending
    #[default]
    Console,
    /// Relay through SMTP
    Smtp,
}

/// SMTP relay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Server hostname
    pub host: String,
    /// Server port, 587 for STARTTLS
    pub port: u16,
    /// Login, empty for unauthenticated relays
    pub username: String,
    /// Password
    pub password: String,
    /// Require STARTTLS
    pub use_tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

/// Outgoing mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Delivery backend
    pub backend: MailBackend,
    /// From header of every message
    pub from_address: String,
    /// Used when `backend` is `smtp`
    pub smtp: SmtpSettings,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            backend: MailBackend::Console,
            from_address: "noreply@example.com".to_string(),
            smtp: SmtpSettings::default(),
        }
    }
}

/// Where template records live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Lost on restart
    #[default]
    Memory,
    /// JSON file at `store.path`
    File,
}

/// Record storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Storage backend
    pub backend: StoreBackend,
    /// File used by the `file` backend
    pub path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from("./letterpress-templates.json"),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterpressConfig {
    /// HTTP listener
    pub server: ServerSettings,
    /// Admin routes
    pub admin: AdminSettings,
    /// Outgoing mail
    pub mail: MailSettings,
    /// Record storage
    pub store: StoreSettings,
}

impl LetterpressConfig {
    /// Load from the standard locations and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a config file cannot be parsed or a value has the
    /// wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use letterpress::config::LetterpressConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = LetterpressConfig::load()?;
    /// println!("listening on {}", config.server.bind_address());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let candidates = [
            PathBuf::from("/etc/letterpress/config.toml"),
            Self::recommended_path(),
            PathBuf::from("./letterpress.toml"),
        ];
        for path in candidates.iter().filter(|path| path.exists()) {
            figment = figment.merge(Toml::file(path));
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;
        Ok(config)
    }

    /// Load from one file plus the environment
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config = Self::defaults()?
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;
        Ok(config)
    }

    /// Per-user config file location
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./letterpress.toml"),
            |dir| dir.join("letterpress").join("config.toml"),
        )
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = LetterpressConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.admin.prefix, "/admin/letterpress/templates");
        assert_eq!(config.mail.backend, MailBackend::Console);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.mail.smtp.use_tls);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [server]
                port = 9100

                [mail]
                backend = "smtp"

                [mail.smtp]
                host = "smtp.acme.test"

                [store]
                backend = "file"
                path = "records.json"
                "#,
            )?;

            let config = LetterpressConfig::load_from("custom.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.mail.backend, MailBackend::Smtp);
            assert_eq!(config.mail.smtp.host, "smtp.acme.test");
            assert_eq!(config.mail.smtp.port, 587);
            assert_eq!(config.store.backend, StoreBackend::File);
            assert_eq!(config.store.path, PathBuf::from("records.json"));
            Ok(())
        });
    }

    #[test]
    fn test_environment_wins() {
        Jail::expect_with(|jail| {
            jail.create_file("letterpress.toml", "[server]\nport = 9100\n")?;
            jail.set_env("LETTERPRESS_SERVER__PORT", "9200");
            jail.set_env("LETTERPRESS_MAIL__SMTP__PASSWORD", "hunter2");

            let config = LetterpressConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.server.port, 9200);
            assert_eq!(config.mail.smtp.password, "hunter2");
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_| {
            let config = LetterpressConfig::load_from("absent.toml").map_err(|e| e.to_string())?;
            assert_eq!(config, LetterpressConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "[mail]\nbackend = \"carrier-pigeon\"\n")?;
            assert!(LetterpressConfig::load_from("bad.toml").is_err());
            Ok(())
        });
    }
}
