use std::sync::Arc;

use async_trait::async_trait;
use hallpass_config::EmailConfig;
use hallpass_core::AppError;
use hallpass_models::LeaveRequest;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

/// A rendered email ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

/// Email delivery. Callers treat failures as non-fatal.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError>;
}

/// Picks the SMTP mailer when `SMTP_ENABLED` is set, the log mailer otherwise.
pub fn mailer_from_config(config: &EmailConfig) -> Arc<dyn Mailer> {
    if config.enabled {
        Arc::new(SmtpMailer::new(config.clone()))
    } else {
        Arc::new(LogMailer)
    }
}

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        if self.config.smtp_username.is_empty() {
            return Ok(SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build());
        }

        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        Ok(SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::internal_error(format!("Failed to create SMTP relay: {}", e)))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, email), fields(to = %email.to_email, subject = %email.subject))]
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);
        let to = format!("{} <{}>", email.to_name, email.to_email);

        let message = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(email.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(email.html_body),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let transport = self.transport()?;

        // SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Logs instead of sending. Used when SMTP is disabled.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), AppError> {
        info!(
            to = %email.to_email,
            subject = %email.subject,
            "SMTP disabled, email not sent"
        );
        Ok(())
    }
}

/// Status change email for the student who filed the request.
pub fn leave_status_email(
    to_email: &str,
    to_name: &str,
    message: &str,
    leave: &LeaveRequest,
) -> OutgoingEmail {
    let mut text_body = format!("Hi {},\n\n{}\n\n{}", to_name, message, leave_details(leave));
    if let Some(remarks) = &leave.remarks {
        text_body.push_str(&format!("\nRemarks: {}\n", remarks));
    }
    text_body.push_str("\nBest regards,\nHallpass");

    OutgoingEmail {
        to_email: to_email.to_string(),
        to_name: to_name.to_string(),
        subject: format!("Leave Request {} - Hallpass", leave.status),
        text_body,
        html_body: render_html("Leave Request Update", to_name, message, "#4F46E5"),
    }
}

/// Reminder sent the day before an approved leave begins.
pub fn leave_reminder_email(
    to_email: &str,
    to_name: &str,
    message: &str,
    leave: &LeaveRequest,
) -> OutgoingEmail {
    OutgoingEmail {
        to_email: to_email.to_string(),
        to_name: to_name.to_string(),
        subject: "Leave Starting Tomorrow - Reminder".to_string(),
        text_body: format!(
            "Hi {},\n\n\
             {}\n\n\
             {}\n\
             Please ensure all necessary arrangements are made before your leave begins.\n\n\
             Best regards,\n\
             Hallpass",
            to_name,
            message,
            leave_details(leave)
        ),
        html_body: render_html("Leave Starting Tomorrow", to_name, message, "#10B981"),
    }
}

fn leave_details(leave: &LeaveRequest) -> String {
    format!(
        "Leave Details:\n\
         - Type: {}\n\
         - Reason: {}\n\
         - Start Date: {}\n\
         - End Date: {}\n\
         - Days: {}\n",
        leave.leave_type, leave.reason, leave.start_date, leave.end_date, leave.days
    )
}

fn render_html(title: &str, name: &str, message: &str, accent: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="100%" cellpadding="0" cellspacing="0" style="background-color: #f4f4f4; padding: 20px;">
        <tr>
            <td align="center">
                <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
                    <tr>
                        <td style="background-color: {accent}; padding: 30px; text-align: center;">
                            <h1 style="margin: 0; color: #ffffff; font-size: 28px;">Hallpass</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 40px 30px;">
                            <h2 style="margin: 0 0 20px 0; color: #333333; font-size: 24px;">{title}</h2>
                            <p style="margin: 0 0 20px 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                Hi <strong>{name}</strong>,
                            </p>
                            <p style="margin: 0; color: #666666; font-size: 16px; line-height: 1.5;">
                                {message}
                            </p>
                        </td>
                    </tr>
                    <tr>
                        <td style="background-color: #f8f9fa; padding: 20px 30px; text-align: center; border-top: 1px solid #e9ecef;">
                            <p style="margin: 0; color: #999999; font-size: 12px;">
                                This is an automated email from Hallpass. Please do not reply.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use hallpass_models::{LeaveId, LeaveStatus, LeaveType, UserId};

    fn approved_leave(remarks: Option<&str>) -> LeaveRequest {
        LeaveRequest {
            id: LeaveId::new(),
            student_id: UserId::new(),
            leave_type: LeaveType::Medical,
            reason: "Fever and doctor-advised rest".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            status: LeaveStatus::Approved,
            approved_by: Some(UserId::new()),
            remarks: remarks.map(str::to_string),
            department: "CS".to_string(),
            hostel: Some("H1".to_string()),
            days: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_leave_status_email_carries_details() {
        let leave = approved_leave(Some("Get well soon"));
        let email = leave_status_email(
            "asha@campus.edu",
            "Asha",
            "Your leave request for medical (2025-03-10 to 2025-03-12) has been approved",
            &leave,
        );
        assert_eq!(email.subject, "Leave Request approved - Hallpass");
        assert!(email.text_body.starts_with("Hi Asha,"));
        assert!(email.text_body.contains("- Days: 3"));
        assert!(email.text_body.contains("Remarks: Get well soon"));
        assert!(email.html_body.contains("Asha"));
    }

    #[test]
    fn test_reminder_email_subject() {
        let leave = approved_leave(None);
        let email = leave_reminder_email("a@campus.edu", "A", "Starts tomorrow", &leave);
        assert_eq!(email.subject, "Leave Starting Tomorrow - Reminder");
        assert!(email.text_body.contains("- Start Date: 2025-03-10"));
    }

    #[test]
    fn test_disabled_smtp_uses_log_mailer() {
        let config = EmailConfig::default();
        assert!(!config.enabled);
        // Selection only; LogMailer never touches the network.
        let _mailer = mailer_from_config(&config);
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let leave = approved_leave(None);
        let email = leave_reminder_email("a@campus.edu", "A", "Starts tomorrow", &leave);
        assert!(LogMailer.send(email).await.is_ok());
    }
}
