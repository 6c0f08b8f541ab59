/// Outgoing mail transport
///
/// Handlers and senders depend on the [`Mailer`] trait; [`SmtpMailer`] is the
/// production implementation on top of lettre's async SMTP transport.
///
/// # Example
///
/// ```no_run
/// use violation_shared::mail::{MailConfig, Mailer, OutgoingEmail, SmtpMailer};
///
/// # async fn example() -> Result<(), violation_shared::mail::MailError> {
/// let mailer = SmtpMailer::new(MailConfig::from_env());
///
/// mailer
///     .send(OutgoingEmail {
///         to: "owner@example.com".to_string(),
///         subject: "Hello".to_string(),
///         text_body: Some("Plain text".to_string()),
///         html_body: None,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error as StdError;
use std::io;
use thiserror::Error;
use tracing::{debug, info};

use super::config::MailConfig;

/// SMTP reply codes that mean the server rejected our credentials
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Broad cause of a failed send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Nothing accepted the TCP connection
    ConnectionRefused,

    /// The server rejected the login
    Authentication,

    /// Required MAIL_* settings are absent
    MissingConfiguration,

    /// Anything else
    Other,
}

impl FailureKind {
    /// Classifies an error by its message text
    pub fn from_message(message: &str) -> Self {
        if message.contains("Connection refused") {
            FailureKind::ConnectionRefused
        } else if message.contains("Authentication") || message.to_lowercase().contains("credential")
        {
            FailureKind::Authentication
        } else if message.contains("Missing essential SMTP configuration") {
            FailureKind::MissingConfiguration
        } else {
            FailureKind::Other
        }
    }
}

/// Mail errors
#[derive(Error, Debug)]
pub enum MailError {
    /// Required settings are absent; nothing was sent
    #[error("Missing essential SMTP configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// A sender or recipient address could not be parsed
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The SMTP exchange failed
    #[error("{message}")]
    Transport { kind: FailureKind, message: String },
}

impl MailError {
    /// Broad cause of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            MailError::MissingConfig(_) => FailureKind::MissingConfiguration,
            MailError::Transport { kind, .. } => *kind,
            other => FailureKind::from_message(&other.to_string()),
        }
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::Transport {
            kind: classify_smtp_error(&err),
            message: err.to_string(),
        }
    }
}

/// Classifies an SMTP error
///
/// Reply codes and the I/O error kind are checked first; the message text is the
/// fallback.
pub fn classify_smtp_error(err: &lettre::transport::smtp::Error) -> FailureKind {
    if let Some(code) = err.status() {
        if AUTH_FAILURE_CODES.contains(&code.to_string().as_str()) {
            return FailureKind::Authentication;
        }
    }

    if refused_connection(err) {
        return FailureKind::ConnectionRefused;
    }

    FailureKind::from_message(&err.to_string())
}

/// Whether an `io::Error` of kind `ConnectionRefused` sits anywhere in the source chain
fn refused_connection(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = e.source();
    }
    false
}

/// A message ready to send from the default sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

/// Something that can deliver mail
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// Mailer backed by an SMTP server
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MailConfig {
        &self.config
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let missing = self.config.missing_essentials();
        let (Some(server), Some(port)) = (self.config.server.as_deref(), self.config.port) else {
            return Err(MailError::MissingConfig(missing));
        };
        if !missing.is_empty() {
            return Err(MailError::MissingConfig(missing));
        }

        let builder = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(server)
        };

        let mut builder = builder.port(port);
        if let (Some(username), Some(password)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    fn message(&self, email: OutgoingEmail) -> Result<Message, MailError> {
        let sender = self
            .config
            .default_sender
            .as_deref()
            .ok_or_else(|| MailError::MissingConfig(vec!["MAIL_DEFAULT_SENDER"]))?;

        let builder = Message::builder()
            .from(parse_mailbox(sender)?)
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject);

        let message = match (email.text_body, email.html_body) {
            (Some(text), Some(html)) => {
                builder.multipart(MultiPart::alternative_plain_html(text, html))
            }
            (None, Some(html)) => builder.header(ContentType::TEXT_HTML).body(html),
            (text, None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.unwrap_or_default()),
        };

        message.map_err(|e| MailError::Build(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let transport = self.transport()?;
        let recipient = email.to.clone();
        let message = self.message(email)?;

        debug!(recipient = %recipient, "Sending email");
        transport.send(message).await?;
        info!(recipient = %recipient, "Email sent");

        Ok(())
    }
}
