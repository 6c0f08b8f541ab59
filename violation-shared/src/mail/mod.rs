/// Outgoing email
///
/// SMTP settings come from `MAIL_*` environment variables only.
///
/// # Modules
///
/// - `config`: `MailConfig` loaded from the environment
/// - `transport`: The `Mailer` trait, the lettre-backed `SmtpMailer` and error classification
/// - `diagnostics`: The admin test email and failure explanations
/// - `password_reset`: Password reset email

pub mod config;
pub mod diagnostics;
pub mod password_reset;
pub mod transport;

pub use config::MailConfig;
pub use transport::{FailureKind, MailError, Mailer, OutgoingEmail, SmtpMailer};
