//! Read-only messages decoded from raw RFC 5322 bytes.

use chrono::{DateTime, Utc};

use crate::model::address::EmailAddress;
use crate::model::capability::{Capabilities, Operation};
use crate::model::message::{Message, Preview, ReadBody, ReadRecipients};

/// A fully downloaded message: headers and body are available, but nothing
/// can be changed and there is no web link.
///
/// Built by [`crate::parser::mime::parse_message`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParsedMessage {
    pub(crate) subject: String,
    pub(crate) from: EmailAddress,
    pub(crate) send_date: DateTime<Utc>,
    pub(crate) to: Vec<EmailAddress>,
    pub(crate) cc: Vec<EmailAddress>,
    pub(crate) content_text: String,
    pub(crate) preview: Option<String>,
    pub(crate) message_id: Option<String>,
}

impl ParsedMessage {
    /// Operations every parsed message supports.
    pub const CAPABILITIES: Capabilities = Capabilities::NONE
        .with(Operation::GetTo)
        .with(Operation::GetCc)
        .with(Operation::GetPreview)
        .with(Operation::GetContentText);

    /// The `Message-ID` header, without angle brackets.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }
}

impl Message for ParsedMessage {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn send_date(&self) -> DateTime<Utc> {
        self.send_date
    }

    fn from(&self) -> &EmailAddress {
        &self.from
    }

    fn capabilities(&self) -> Capabilities {
        Self::CAPABILITIES
    }

    fn as_read_recipients(&self) -> Option<&dyn ReadRecipients> {
        Some(self)
    }

    fn as_read_body(&self) -> Option<&dyn ReadBody> {
        Some(self)
    }

    fn as_preview(&self) -> Option<&dyn Preview> {
        Some(self)
    }
}

impl ReadRecipients for ParsedMessage {
    fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }
}

impl ReadBody for ParsedMessage {
    fn content_text(&self) -> &str {
        &self.content_text
    }
}

impl Preview for ParsedMessage {
    fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }
}
