use crate::config::{MailCredentials, MailSettings};
use crate::domain::model::{EmailMessage, MailAttachment};
use crate::domain::ports::Mailer;
use crate::utils::error::{ReportError, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Authenticated STARTTLS submission through a mail relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings, credentials: &MailCredentials) -> Result<Self> {
        let sender: Mailbox = credentials.sender.parse()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                credentials.sender.clone(),
                credentials.app_password.clone(),
            ))
            .build();

        tracing::debug!(
            "SMTP relay configured: {}:{} as {}",
            settings.host,
            settings.port,
            credentials.sender
        );

        Ok(Self { transport, sender })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage, attachments: Vec<MailAttachment>) -> Result<()> {
        let email = build_message(&self.sender, message, attachments)?;
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Plain text body followed by one part per attachment.
pub fn build_message(
    sender: &Mailbox,
    message: &EmailMessage,
    attachments: Vec<MailAttachment>,
) -> Result<Message> {
    let recipient: Mailbox = message.recipient.parse()?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(message.body.clone()));
    for attachment in attachments {
        let content_type =
            ContentType::parse(attachment.content_type).map_err(|e| ReportError::MailError {
                message: format!(
                    "Invalid content type '{}' for {}: {}",
                    attachment.content_type, attachment.filename, e
                ),
            })?;
        parts = parts.singlepart(Attachment::new(attachment.filename).body(attachment.data, content_type));
    }

    let email = Message::builder()
        .from(sender.clone())
        .to(recipient)
        .subject(message.subject.clone())
        .multipart(parts)?;

    Ok(email)
}
