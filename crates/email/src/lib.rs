use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;
use thiserror::Error;

use tillscan_core::ReceiptRecord;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid mailbox address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub relay: String,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

/// Raw text is cut to this many characters in the summary body.
const RAW_TEXT_PREVIEW_CHARS: usize = 200;

fn or_not_found(value: &str) -> &str {
    if value.is_empty() { "Not found" } else { value }
}

/// Build the human-readable summary for a processed receipt.
/// Returns `(subject, body)`.
pub fn format_summary(receipt_id: &str, record: &ReceiptRecord) -> (String, String) {
    let subject = format!("Receipt Processed - ID: {receipt_id}");

    let items_summary = if record.items.is_empty() {
        String::new()
    } else {
        format!("\nFound {} items", record.items.len())
    };

    let raw_preview: String = record.raw_text.chars().take(RAW_TEXT_PREVIEW_CHARS).collect();

    let body = format!(
        "Receipt Processing Complete!\n\
         \n\
         Receipt ID: {receipt_id}\n\
         Vendor: {vendor}\n\
         Date: {date}\n\
         Time: {time}\n\
         Address: {address}\n\
         Total: {total}\n\
         Subtotal: {subtotal}\n\
         Tax: {tax}\n\
         {items_summary}\n\
         Filtered raw text: {raw_preview}...\n\
         \n\
         Data stored successfully in database.\n",
        vendor = or_not_found(&record.vendor_name),
        date = or_not_found(&record.date),
        time = or_not_found(&record.time),
        address = or_not_found(&record.address),
        total = record.total_amount.as_deref().unwrap_or("Not found"),
        subtotal = record.subtotal.as_deref().unwrap_or("N/A"),
        tax = record.tax_amount.as_deref().unwrap_or("N/A"),
    );

    (subject, body)
}

/// SMTP dispatcher for receipt summaries. Notification is best-effort:
/// callers log a send failure and move on, it never fails the operation.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl Mailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.relay)?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            from: settings.from.parse()?,
            to: settings.to.parse()?,
        })
    }

    pub async fn send_receipt_summary(
        &self,
        receipt_id: &str,
        record: &ReceiptRecord,
    ) -> Result<(), NotifyError> {
        let (subject, body) = format_summary(receipt_id, record);
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .body(body)?;
        self.transport.send(message).await?;
        tracing::info!("Notification sent for receipt {receipt_id}");
        Ok(())
    }
}
