/// Test email used by the admin settings page to verify SMTP delivery

use super::transport::{FailureKind, MailError, OutgoingEmail};

pub const TEST_EMAIL_SUBJECT: &str = "Test Email from Violation System";

pub const TEST_EMAIL_TEXT: &str =
    "This is a test email from the Violation System to verify that email sending is properly configured.";

/// The fixed diagnostic message addressed to `recipient`
pub fn test_email(recipient: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: recipient.to_string(),
        subject: TEST_EMAIL_SUBJECT.to_string(),
        text_body: Some(TEST_EMAIL_TEXT.to_string()),
        html_body: Some(format!("<p>{}</p>", TEST_EMAIL_TEXT)),
    }
}

/// Human-readable explanation of a failed test email, with likely causes
pub fn explain_failure(err: &MailError) -> String {
    let details = err.to_string();

    match err.kind() {
        FailureKind::ConnectionRefused => format!(
            "Connection refused error. Possible causes:\n\
             1. SMTP server address or port may be incorrect\n\
             2. Firewall may be blocking outgoing connections\n\
             3. SMTP server may be down or not accepting connections\n\
             Error details: {}",
            details
        ),
        FailureKind::Authentication => format!(
            "Authentication error. Possible causes:\n\
             1. Username or password may be incorrect\n\
             2. Account may require specific security settings\n\
             Error details: {}",
            details
        ),
        FailureKind::MissingConfiguration => format!(
            "Email sending failed: {}. Please configure required MAIL_* environment variables.",
            details
        ),
        FailureKind::Other => format!("Failed to send test email: {}", details),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_error(kind: FailureKind, message: &str) -> MailError {
        MailError::Transport {
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_email_content() {
        let email = test_email("admin@example.com");

        assert_eq!(email.to, "admin@example.com");
        assert_eq!(email.subject, "Test Email from Violation System");
        assert_eq!(email.text_body.as_deref(), Some(TEST_EMAIL_TEXT));
        assert!(email.html_body.unwrap().starts_with("<p>This is a test email"));
    }

    #[test]
    fn test_connection_refused_explanation() {
        let msg = explain_failure(&transport_error(
            FailureKind::ConnectionRefused,
            "Connection refused (os error 111)",
        ));

        assert!(msg.starts_with("Connection refused error. Possible causes:\n1. SMTP server"));
        assert!(msg.ends_with("Error details: Connection refused (os error 111)"));
    }

    #[test]
    fn test_authentication_explanation() {
        let msg = explain_failure(&transport_error(
            FailureKind::Authentication,
            "permanent error (535): 5.7.8 Username and Password not accepted",
        ));

        assert!(msg.starts_with("Authentication error."));
        assert!(msg.contains("2. Account may require specific security settings"));
    }

    #[test]
    fn test_missing_configuration_explanation() {
        let msg = explain_failure(&MailError::MissingConfig(vec!["MAIL_SERVER"]));

        assert_eq!(
            msg,
            "Email sending failed: Missing essential SMTP configuration: MAIL_SERVER. \
             Please configure required MAIL_* environment variables."
        );
    }

    #[test]
    fn test_generic_explanation() {
        let msg = explain_failure(&transport_error(FailureKind::Other, "timed out"));
        assert_eq!(msg, "Failed to send test email: timed out");
    }
}
