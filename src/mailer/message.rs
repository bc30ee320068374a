use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use once_cell::sync::Lazy;

use crate::error::MailError;

static CSV_CONTENT_TYPE: Lazy<ContentType> =
    Lazy::new(|| ContentType::parse("text/csv").expect("Invalid CSV content type"));

pub fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Plain-text body followed by the export file as an attachment.
pub fn build_message(
    from: Mailbox,
    to: Mailbox,
    subject: &str,
    body: &str,
    attachment_name: &str,
    attachment: Vec<u8>,
) -> Result<Message, MailError> {
    let attachment =
        Attachment::new(attachment_name.to_string()).body(attachment, CSV_CONTENT_TYPE.clone());

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(attachment),
        )?;

    Ok(message)
}
