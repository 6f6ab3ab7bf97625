//! Transactional mail: SMTP delivery plus the plain-text messages the portal sends.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::PortalConfig;

/// One outgoing plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Short label used for metrics and logs (`password_reset`, `newsletter`, ...).
    pub kind: &'static str,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()>;
}

/// Build the mailer from configuration: SMTP when a host is set, logging otherwise.
pub fn from_config(config: &PortalConfig) -> anyhow::Result<std::sync::Arc<dyn Mailer>> {
    if config.smtp_host.is_empty() {
        return Ok(std::sync::Arc::new(LogMailer));
    }
    Ok(std::sync::Arc::new(SmtpMailer::new(config)?))
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &PortalConfig) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }
        let from = config
            .mail_from
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("MAIL_FROM is not a valid mailbox: {e}"))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        let to = mail
            .to
            .parse::<Mailbox>()
            .map_err(|e| anyhow::anyhow!("invalid recipient {}: {e}", mail.to))?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())?;

        let result = self.transport.send(message).await;
        crate::metrics::mail_sent(mail.kind, result.is_ok());
        result.map_err(|e| anyhow::anyhow!("SMTP send to {} failed: {e}", mail.to))?;
        tracing::info!(kind = mail.kind, to = %mail.to, "Mail sent");
        Ok(())
    }
}

/// Development mailer: logs instead of sending.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> anyhow::Result<()> {
        crate::metrics::mail_sent(mail.kind, true);
        // Bodies carry reset tokens and unsubscribe links; keep them out of info logs.
        tracing::info!(
            kind = mail.kind,
            to = %mail.to,
            subject = %mail.subject,
            body_len = mail.body.len(),
            "SMTP not configured, mail not sent"
        );
        tracing::debug!(kind = mail.kind, to = %mail.to, "Mail body:\n{}", mail.body);
        Ok(())
    }
}

// ── Messages ──

pub fn password_reset(to: &str, name: &str, link: &str, ttl_minutes: i64) -> OutgoingMail {
    OutgoingMail {
        kind: "password_reset",
        to: to.to_string(),
        subject: "Reset your school portal password".to_string(),
        body: format!(
            "Hello {name},\n\n\
             We received a request to reset your password. Open the link below to choose a new one:\n\n\
             {link}\n\n\
             The link expires in {ttl_minutes} minutes and can be used once. \
             If you did not ask for a reset you can ignore this email.\n"
        ),
    }
}

pub fn password_changed(to: &str, name: &str) -> OutgoingMail {
    OutgoingMail {
        kind: "password_changed",
        to: to.to_string(),
        subject: "Your school portal password was changed".to_string(),
        body: format!(
            "Hello {name},\n\nYour password was just changed. \
             If this was not you, contact the school office immediately.\n"
        ),
    }
}

pub fn newsletter_welcome(to: &str, unsubscribe_link: &str) -> OutgoingMail {
    OutgoingMail {
        kind: "newsletter_welcome",
        to: to.to_string(),
        subject: "Thanks for subscribing to our newsletter".to_string(),
        body: format!(
            "You are now subscribed to school news and announcements.\n\n\
             To unsubscribe at any time, open:\n{unsubscribe_link}\n"
        ),
    }
}

pub fn newsletter_issue(to: &str, subject: &str, body: &str, unsubscribe_link: &str) -> OutgoingMail {
    OutgoingMail {
        kind: "newsletter",
        to: to.to_string(),
        subject: subject.to_string(),
        body: format!("{body}\n\n--\nUnsubscribe: {unsubscribe_link}\n"),
    }
}

pub fn registration_received(to: &str, parent: &str, student: &str, reference: i64) -> OutgoingMail {
    OutgoingMail {
        kind: "registration_received",
        to: to.to_string(),
        subject: format!("Admission application received for {student}"),
        body: format!(
            "Dear {parent},\n\n\
             Thank you for applying for admission for {student}. \
             Your application reference is #{reference}. \
             The admissions office will contact you once it has been reviewed.\n"
        ),
    }
}

pub fn registration_decision(
    to: &str,
    parent: &str,
    student: &str,
    status: &str,
    admission_number: Option<&str>,
) -> OutgoingMail {
    let detail = match (status, admission_number) {
        ("approved", Some(adm)) => format!(
            "We are pleased to offer {student} a place. The admission number is {adm}."
        ),
        ("enrolled", Some(adm)) => format!("{student} is now enrolled under admission number {adm}."),
        ("rejected", _) => format!(
            "After careful review we are unable to offer {student} a place at this time."
        ),
        _ => format!("The application for {student} is now {status}."),
    };
    OutgoingMail {
        kind: "registration_decision",
        to: to.to_string(),
        subject: format!("Admission update for {student}"),
        body: format!("Dear {parent},\n\n{detail}\n"),
    }
}

pub fn application_received(to: &str, applicant: &str, job_title: &str) -> OutgoingMail {
    OutgoingMail {
        kind: "application_received",
        to: to.to_string(),
        subject: format!("Application received: {job_title}"),
        body: format!(
            "Dear {applicant},\n\n\
             Thank you for applying for the {job_title} position. \
             We will be in touch if your application is shortlisted.\n"
        ),
    }
}

pub fn office_notification(to: &str, subject: String, body: String) -> OutgoingMail {
    OutgoingMail {
        kind: "office_notification",
        to: to.to_string(),
        subject,
        body,
    }
}
