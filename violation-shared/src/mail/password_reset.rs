/// Password reset email
///
/// # Example
///
/// ```no_run
/// use violation_shared::mail::{password_reset::send_password_reset_email, MailConfig, SmtpMailer};
///
/// # async fn example() {
/// let config = MailConfig::from_env();
/// let mailer = SmtpMailer::new(config.clone());
///
/// let sent = send_password_reset_email(
///     &mailer,
///     &config,
///     "owner@example.com",
///     "https://violations.example.com/reset-password?token=abc",
/// )
/// .await;
/// # }
/// ```

use chrono::{Datelike, Utc};
use tracing::{error, info};

use super::config::MailConfig;
use super::transport::{Mailer, OutgoingEmail};

pub const PASSWORD_RESET_SUBJECT: &str = "Reset Your Password - Spectrum 4 Violation System";

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the HTML body
pub fn render_password_reset_html(reset_link: &str, current_year: i32) -> String {
    let link = escape_html(reset_link);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{
            font-family: Helvetica, Arial, sans-serif;
            line-height: 1.6;
            color: #333333;
            margin: 0;
            padding: 0;
        }}
        .container {{
            max-width: 600px;
            margin: 0 auto;
            padding: 40px 24px;
        }}
        .button {{
            display: inline-block;
            padding: 14px 24px;
            background: #1f4e79;
            color: #ffffff;
            text-decoration: none;
        }}
        .link {{
            word-break: break-all;
            font-size: 13px;
            color: #666666;
        }}
        .footer {{
            margin-top: 40px;
            padding-top: 16px;
            border-top: 1px solid #e5e5e5;
            font-size: 12px;
            color: #666666;
            text-align: center;
        }}
    </style>
</head>
<body>
    <div class="container">
        <h2>Reset Your Password</h2>
        <p>We received a request to reset the password for your Spectrum 4 Violation System account.</p>
        <p><a href="{link}" class="button">Reset Password</a></p>
        <p>If the button does not work, copy this link into your browser:</p>
        <p class="link">{link}</p>
        <p>If you did not request a password reset, you can ignore this email.</p>
        <div class="footer">&copy; {current_year} Spectrum 4 Strata Council</div>
    </div>
</body>
</html>"#
    )
}

/// Sends the password reset link to `email`
///
/// Returns `false` without sending when any of the five required MAIL_* values
/// is missing. Transport failures are logged and reported as `false`.
pub async fn send_password_reset_email(
    mailer: &dyn Mailer,
    config: &MailConfig,
    email: &str,
    reset_link: &str,
) -> bool {
    let missing = config.missing_for_password_reset();
    if !missing.is_empty() {
        error!(
            missing = ?missing,
            "SMTP email system is not configured in environment variables"
        );
        return false;
    }

    let message = OutgoingEmail {
        to: email.to_string(),
        subject: PASSWORD_RESET_SUBJECT.to_string(),
        text_body: None,
        html_body: Some(render_password_reset_html(reset_link, Utc::now().year())),
    };

    match mailer.send(message).await {
        Ok(()) => {
            info!(recipient = %email, "Password reset email sent");
            true
        }
        Err(e) => {
            error!(recipient = %email, error = %e, "Failed to send password reset email");
            false
        }
    }
}
