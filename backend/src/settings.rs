//! Server settings loaded via OrthoConfig.
//!
//! Values layer from the command line, `TRACKER_*` environment variables and
//! an optional configuration file. Session cookie settings live separately in
//! [`crate::inbound::http::session_config`].

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::outbound::email::{DEFAULT_EMAIL_API_BASE, DEFAULT_SENDER, EmailApiSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_EMAIL_TIMEOUT_SECS: u64 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TRACKER_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("invalid bind address {value}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid email API base {value}: {source}")]
    InvalidEmailApiBase {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Process-level configuration for the tracker service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TRACKER")]
pub struct TrackerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
    /// Insert the default phase catalogue when the catalogue is empty.
    #[ortho_config(default = true)]
    pub seed_phases: bool,
    /// Origin used in links sent to customers.
    pub public_base_url: Option<String>,
    /// Email API key; notifications are only logged when absent.
    pub email_api_key: Option<String>,
    /// Email API root, e.g. `https://api.resend.com`.
    pub email_api_base: Option<String>,
    /// `From` header for customer notifications.
    pub email_sender: Option<String>,
    /// Request timeout for the email API, in seconds.
    pub email_timeout_secs: Option<u64>,
}

impl TrackerSettings {
    /// Parse the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Return the database URL, which has no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Public origin without a trailing slash.
    pub fn public_base_url(&self) -> &str {
        self.public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL)
            .trim_end_matches('/')
    }

    /// Email API connection settings, or `None` when no key is configured.
    pub fn email_api(&self) -> Result<Option<EmailApiSettings>, SettingsError> {
        let Some(api_key) = self
            .email_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        else {
            return Ok(None);
        };
        let raw_base = self.email_api_base.as_deref().unwrap_or(DEFAULT_EMAIL_API_BASE);
        let api_base = Url::parse(raw_base).map_err(|source| SettingsError::InvalidEmailApiBase {
            value: raw_base.to_owned(),
            source,
        })?;
        Ok(Some(EmailApiSettings {
            api_base,
            api_key: api_key.to_owned(),
            sender: self
                .email_sender
                .clone()
                .unwrap_or_else(|| DEFAULT_SENDER.to_owned()),
            timeout: Duration::from_secs(
                self.email_timeout_secs
                    .unwrap_or(DEFAULT_EMAIL_TIMEOUT_SECS),
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    //! Configuration parsing and fallback behaviour.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "TRACKER_BIND_ADDR",
        "TRACKER_DATABASE_URL",
        "TRACKER_DB_MAX_CONNECTIONS",
        "TRACKER_RUN_MIGRATIONS",
        "TRACKER_SEED_PHASES",
        "TRACKER_PUBLIC_BASE_URL",
        "TRACKER_EMAIL_API_KEY",
        "TRACKER_EMAIL_API_BASE",
        "TRACKER_EMAIL_SENDER",
        "TRACKER_EMAIL_TIMEOUT_SECS",
    ];

    fn cleared_except(
        overrides: &[(&'static str, &str)],
    ) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> TrackerSettings {
        TrackerSettings::load_from_iter([OsString::from("tracker-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert!(settings.run_migrations);
        assert!(settings.seed_phases);
        assert_eq!(
            settings.bind_addr().expect("default address parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal parses")
        );
        assert_eq!(settings.public_base_url(), DEFAULT_PUBLIC_BASE_URL);
        assert!(matches!(
            settings.database_url(),
            Err(SettingsError::MissingDatabaseUrl)
        ));
        assert!(settings.email_api().expect("no key is fine").is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("TRACKER_BIND_ADDR", "127.0.0.1:9000"),
            ("TRACKER_DATABASE_URL", "postgres://tracker@db/tracker"),
            ("TRACKER_DB_MAX_CONNECTIONS", "4"),
            ("TRACKER_SEED_PHASES", "false"),
            ("TRACKER_PUBLIC_BASE_URL", "https://track.example.com/"),
            ("TRACKER_EMAIL_API_KEY", "re_test"),
            ("TRACKER_EMAIL_SENDER", "Ops <ops@example.com>"),
            ("TRACKER_EMAIL_TIMEOUT_SECS", "3"),
        ]));

        let settings = load_from_empty_args();
        assert!(!settings.seed_phases);
        assert_eq!(settings.db_max_connections, Some(4));
        assert_eq!(
            settings.database_url().expect("url set"),
            "postgres://tracker@db/tracker"
        );
        assert_eq!(settings.public_base_url(), "https://track.example.com");

        let email = settings
            .email_api()
            .expect("valid email settings")
            .expect("key configured");
        assert_eq!(email.api_key, "re_test");
        assert_eq!(email.sender, "Ops <ops@example.com>");
        assert_eq!(email.timeout, Duration::from_secs(3));
        assert_eq!(email.api_base.as_str(), "https://api.resend.com/");
    }

    #[rstest]
    #[case("TRACKER_BIND_ADDR", "not-an-address")]
    #[case("TRACKER_EMAIL_API_BASE", "::nope")]
    fn malformed_values_are_reported(#[case] name: &'static str, #[case] value: &str) {
        let _guard = lock_env(cleared_except(&[
            (name, value),
            ("TRACKER_EMAIL_API_KEY", "re_test"),
        ]));

        let settings = load_from_empty_args();
        let failed = settings.bind_addr().is_err() || settings.email_api().is_err();
        assert!(failed, "{name}={value} should be rejected");
    }

    #[rstest]
    fn blank_api_key_disables_email() {
        let _guard = lock_env(cleared_except(&[("TRACKER_EMAIL_API_KEY", "   ")]));

        let settings = load_from_empty_args();
        assert!(settings.email_api().expect("blank key tolerated").is_none());
    }
}
