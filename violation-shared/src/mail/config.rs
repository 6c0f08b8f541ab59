/// SMTP configuration read from the process environment
///
/// # Environment Variables
///
/// - `MAIL_SERVER`: SMTP host
/// - `MAIL_PORT`: SMTP port
/// - `MAIL_USERNAME`: SMTP login
/// - `MAIL_PASSWORD`: SMTP password
/// - `MAIL_USE_TLS`: `true`/`1`/`yes`/`on` enables STARTTLS (default: off)
/// - `MAIL_DEFAULT_SENDER`: From address for every outgoing mail
///
/// None of these have defaults. Blank values count as unset.

use std::env;
use std::fmt;
use tracing::{info, warn};

/// SMTP settings
///
/// `Debug` never prints the password.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MailConfig {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub default_sender: Option<String>,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password_set", &self.password_set())
            .field("use_tls", &self.use_tls)
            .field("default_sender", &self.default_sender)
            .finish()
    }
}

/// Interprets a boolean flag from the environment
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

impl MailConfig {
    /// Loads the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = get("MAIL_PORT").and_then(|raw| match raw.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => {
                warn!(value = %raw, "Ignoring invalid MAIL_PORT");
                None
            }
        });

        Self {
            server: get("MAIL_SERVER"),
            port,
            username: get("MAIL_USERNAME"),
            password: get("MAIL_PASSWORD"),
            use_tls: get("MAIL_USE_TLS").map(|v| parse_flag(&v)).unwrap_or(false),
            default_sender: get("MAIL_DEFAULT_SENDER"),
        }
    }

    pub fn password_set(&self) -> bool {
        self.password.is_some()
    }

    /// Variables the transport cannot work without
    pub fn missing_essentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.server.is_none() {
            missing.push("MAIL_SERVER");
        }
        if self.port.is_none() {
            missing.push("MAIL_PORT");
        }
        if self.default_sender.is_none() {
            missing.push("MAIL_DEFAULT_SENDER");
        }
        missing
    }

    /// Variables the password reset mail requires, including credentials
    pub fn missing_for_password_reset(&self) -> Vec<&'static str> {
        let mut missing = self.missing_essentials();
        if self.username.is_none() {
            missing.push("MAIL_USERNAME");
        }
        if self.password.is_none() {
            missing.push("MAIL_PASSWORD");
        }
        missing
    }

    /// Logs the settings in use, with the password reduced to whether it is set
    pub fn log_settings(&self) {
        info!(
            server = self.server.as_deref().unwrap_or("<unset>"),
            port = ?self.port,
            username = self.username.as_deref().unwrap_or("<unset>"),
            use_tls = self.use_tls,
            password_set = self.password_set(),
            default_sender = self.default_sender.as_deref().unwrap_or("<unset>"),
            "SMTP settings"
        );
    }
}
