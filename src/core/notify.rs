use crate::domain::model::{EmailMessage, MailAttachment, ReportArtifacts};
use crate::domain::ports::Mailer;
use crate::utils::error::{ReportError, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub struct Notifier<M: Mailer> {
    mailer: M,
    recipient: String,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M, recipient: String) -> Self {
        Self { mailer, recipient }
    }

    pub fn compose(&self, artifacts: &ReportArtifacts, collected_at: DateTime<Local>) -> EmailMessage {
        EmailMessage {
            recipient: self.recipient.clone(),
            subject: format!(
                "Most Active Stocks from Yahoo Finance - {}",
                collected_at.format("%d/%m/%Y")
            ),
            body: format!(
                "Hello,\n\n\
                 Attached are the most active stocks from Yahoo Finance, collected on {}.\n\n\
                 This email was sent automatically by the most active stocks report job.\n",
                collected_at.format("%d/%m/%Y at %H:%M:%S")
            ),
            attachments: artifacts.attachment_paths(),
        }
    }

    pub async fn notify(&self, artifacts: &ReportArtifacts, collected_at: DateTime<Local>) -> Result<()> {
        let message = self.compose(artifacts, collected_at);
        let attachments = load_attachments(&message.attachments).await?;

        tracing::info!(
            "📧 Sending report to {} with {} attachment(s)",
            message.recipient,
            attachments.len()
        );
        self.mailer.send(&message, attachments).await?;
        tracing::info!("✅ Email sent to {}", message.recipient);
        Ok(())
    }
}

/// Reads each file fully; paths that no longer exist are skipped.
pub async fn load_attachments(paths: &[PathBuf]) -> Result<Vec<MailAttachment>> {
    let mut attachments = Vec::with_capacity(paths.len());

    for path in paths {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ReportError::AttachmentError {
                path: path.display().to_string(),
                source,
            })?;
        if !exists {
            tracing::warn!("⚠️ Attachment not found, skipping: {}", path.display());
            continue;
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| ReportError::AttachmentError {
                path: path.display().to_string(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!("Attached {} ({} bytes)", filename, data.len());
        attachments.push(MailAttachment {
            content_type: content_type_for(path),
            filename,
            data,
        });
    }

    Ok(attachments)
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => "text/csv",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}
