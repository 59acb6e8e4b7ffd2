//! Writable compose buffers for outgoing mail.
//!
//! A [`ComposeMessage`] accepts every write operation and reads back what was
//! written, except Bcc recipients, which only surface once the buffer is
//! turned into an [`Outgoing`] envelope for delivery.

use chrono::{DateTime, Utc};

use crate::error::{MailError, Result};
use crate::model::address::EmailAddress;
use crate::model::capability::{Capabilities, Operation};
use crate::model::message::{
    Message, ReadBody, ReadRecipients, WriteBody, WriteHeaders, WriteRecipients,
};

/// A message being composed.
#[derive(Debug, Clone)]
pub struct ComposeMessage {
    subject: String,
    from: EmailAddress,
    send_date: DateTime<Utc>,
    to: Vec<EmailAddress>,
    cc: Vec<EmailAddress>,
    bcc: Vec<EmailAddress>,
    content_text: String,
}

impl ComposeMessage {
    /// Operations every compose buffer supports.
    pub const CAPABILITIES: Capabilities = Capabilities::NONE
        .with(Operation::GetTo)
        .with(Operation::GetCc)
        .with(Operation::GetContentText)
        .with(Operation::SetSubject)
        .with(Operation::SetFrom)
        .with(Operation::AddTo)
        .with(Operation::AddCc)
        .with(Operation::AddBcc)
        .with(Operation::SetContentText);

    /// An empty buffer from `from`, dated now.
    pub fn new(from: EmailAddress) -> Self {
        Self::at(from, Utc::now())
    }

    /// An empty buffer from `from` with an explicit send date.
    pub fn at(from: EmailAddress, send_date: DateTime<Utc>) -> Self {
        Self {
            subject: String::new(),
            from,
            send_date,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            content_text: String::new(),
        }
    }

    /// Hand the buffer over for delivery.
    pub fn into_outgoing(self) -> Outgoing {
        Outgoing {
            subject: self.subject,
            from: self.from,
            date: self.send_date,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            content_text: self.content_text,
        }
    }
}

impl Message for ComposeMessage {
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

    fn as_write_recipients(&mut self) -> Option<&mut dyn WriteRecipients> {
        Some(self)
    }

    fn as_read_body(&self) -> Option<&dyn ReadBody> {
        Some(self)
    }

    fn as_write_body(&mut self) -> Option<&mut dyn WriteBody> {
        Some(self)
    }

    fn as_write_headers(&mut self) -> Option<&mut dyn WriteHeaders> {
        Some(self)
    }
}

impl ReadRecipients for ComposeMessage {
    fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    fn cc(&self) -> &[EmailAddress] {
        &self.cc
    }
}

impl WriteRecipients for ComposeMessage {
    fn add_to(&mut self, to: EmailAddress) {
        self.to.push(to);
    }

    fn add_cc(&mut self, cc: EmailAddress) {
        self.cc.push(cc);
    }

    fn add_bcc(&mut self, bcc: EmailAddress) {
        self.bcc.push(bcc);
    }
}

impl ReadBody for ComposeMessage {
    fn content_text(&self) -> &str {
        &self.content_text
    }
}

impl WriteBody for ComposeMessage {
    fn set_content_text(&mut self, content_text: String) {
        self.content_text = content_text;
    }
}

impl WriteHeaders for ComposeMessage {
    fn set_subject(&mut self, subject: String) {
        self.subject = subject;
    }

    fn set_from(&mut self, from: EmailAddress) {
        self.from = from;
    }
}

/// A composed message handed to a sender: the complete delivery envelope,
/// Bcc recipients included.
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub subject: String,
    pub from: EmailAddress,
    pub date: DateTime<Utc>,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub content_text: String,
}

impl Outgoing {
    /// All envelope recipients: To, then Cc, then Bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &EmailAddress> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }

    /// Check the fields every sender requires: a subject, a body, at least one
    /// recipient, and well-formed addresses throughout.
    pub fn validate(&self) -> Result<()> {
        if self.subject.trim().is_empty() {
            return Err(MailError::Incomplete("subject is empty".into()));
        }
        if self.content_text.is_empty() {
            return Err(MailError::Incomplete("content text is empty".into()));
        }
        if self.recipients().next().is_none() {
            return Err(MailError::Incomplete("no To, Cc or Bcc recipient".into()));
        }
        if let Some(bad) = std::iter::once(&self.from)
            .chain(self.recipients())
            .find(|a| !a.is_well_formed())
        {
            return Err(MailError::Incomplete(format!(
                "malformed address '{}'",
                bad.address()
            )));
        }
        Ok(())
    }

    /// Render as an RFC 5322 message with CRLF line endings.
    ///
    /// Bcc recipients are never written to the headers. Header values are
    /// UTF-8 (RFC 6532) with line breaks folded into spaces.
    pub fn render(&self) -> String {
        let mut out = String::new();
        push_header(&mut out, "Date", &self.date.to_rfc2822());
        push_header(&mut out, "From", &self.from.to_string());
        if !self.to.is_empty() {
            push_header(&mut out, "To", &join_addresses(&self.to));
        }
        if !self.cc.is_empty() {
            push_header(&mut out, "Cc", &join_addresses(&self.cc));
        }
        push_header(&mut out, "Subject", &self.subject);
        push_header(&mut out, "MIME-Version", "1.0");
        push_header(&mut out, "Content-Type", "text/plain; charset=utf-8");
        push_header(&mut out, "Content-Transfer-Encoding", "8bit");
        out.push_str("\r\n");

        for line in self.content_text.lines() {
            out.push_str(line);
            out.push_str("\r\n");
        }
        out
    }
}

fn push_header(out: &mut String, name: &str, value: &str) {
    let value: String = value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    out.push_str(name);
    out.push_str(": ");
    out.push_str(value.trim());
    out.push_str("\r\n");
}

fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
